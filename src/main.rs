//! Redflag main entry point
//!
//! This is the command-line interface for the redflag moderation tracker.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use redflag::config::{load_config_with_hash, Config};
use redflag::crawler::{run_listing_crawl, run_range_crawl, RunSummary};
use redflag::output::{load_statistics, print_statistics, render_site};
use redflag::storage::{open_storage, Storage};
use redflag::{Category, RedflagError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Redflag: tracks flagged and deleted items on a news site
///
/// Redflag walks the site's item ids or listings, keeps a SQLite copy of each
/// item's score, comment count and moderation status, and renders the
/// flagged and deleted posts into a static mirror.
#[derive(Parser, Debug)]
#[command(name = "redflag")]
#[command(version)]
#[command(about = "Tracks flagged and deleted items on a news site", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan item ids downwards from --from to --to (exclusive)
    Crawl {
        /// Highest id to visit; defaults to the highest id on the site
        #[arg(long = "from")]
        from: Option<i64>,

        /// Lower bound, not visited
        #[arg(long = "to", default_value_t = 0)]
        to: i64,
    },

    /// Follow a listing page by page
    Follow {
        /// Upper bound on the page number (exclusive)
        #[arg(long, default_value_t = 4000)]
        max_pages: u32,

        /// Listing to walk
        #[arg(long, value_enum, default_value_t = ListingArg::Newest)]
        category: ListingArg,
    },

    /// Write flagged and deleted posts as static HTML pages
    Render,

    /// Query the item store
    Db {
        /// Print the id of the oldest stored item
        #[arg(long)]
        min_entry: bool,

        /// Print the id of the newest stored item
        #[arg(long)]
        max_entry: bool,

        /// Print store statistics (default when no other flag is given)
        #[arg(long)]
        stats: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ListingArg {
    Newest,
    Main,
    Ask,
    Show,
}

impl From<ListingArg> for Category {
    fn from(arg: ListingArg) -> Self {
        match arg {
            ListingArg::Newest => Category::Unlabeled,
            ListingArg::Main => Category::Main,
            ListingArg::Ask => Category::Ask,
            ListingArg::Show => Category::Show,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            let code = e
                .downcast_ref::<RedflagError>()
                .map(RedflagError::exit_code)
                .unwrap_or(1);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let mut storage = open_storage(Path::new(&config.database.path))
        .with_context(|| format!("Failed to open database {}", config.database.path))?;

    match cli.command {
        Command::Crawl { from, to } => {
            let summary = run_range_crawl(&config, &mut storage, &config_hash, from, to).await?;
            report(&summary);
        }
        Command::Follow {
            max_pages,
            category,
        } => {
            let summary =
                run_listing_crawl(&config, &mut storage, &config_hash, category.into(), max_pages)
                    .await?;
            report(&summary);
        }
        Command::Render => handle_render(&config, &storage)?,
        Command::Db {
            min_entry,
            max_entry,
            stats,
        } => handle_db(&storage, min_entry, max_entry, stats)?,
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("redflag=info,warn"),
            1 => EnvFilter::new("redflag=debug,info"),
            2 => EnvFilter::new("redflag=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn report(summary: &RunSummary) {
    let c = &summary.counters;
    println!(
        "Run {} ({}): {} inserted, {} updated, {} unchanged, {} skipped{}",
        summary.run_id,
        summary.strategy,
        c.inserted,
        c.updated,
        c.unchanged,
        c.skipped,
        if summary.stopped_early {
            " (stopped after idle pages)"
        } else {
            ""
        }
    );
}

/// Handles the render command: writes the static mirror
fn handle_render(config: &Config, storage: &dyn Storage) -> anyhow::Result<()> {
    let written = render_site(storage, &config.site, &config.render)
        .context("Failed to render static pages")?;

    println!(
        "Wrote {} page(s) to {}",
        written.len(),
        config.render.output_dir
    );
    Ok(())
}

/// Handles the db command: boundary entries and statistics
fn handle_db(
    storage: &dyn Storage,
    min_entry: bool,
    max_entry: bool,
    stats: bool,
) -> anyhow::Result<()> {
    if max_entry {
        match storage.find_boundary_entry(true)? {
            Some(id) => println!("{}", id),
            None => println!("no entries"),
        }
    }

    if min_entry {
        match storage.find_boundary_entry(false)? {
            Some(id) => println!("{}", id),
            None => println!("no entries"),
        }
    }

    if stats || (!min_entry && !max_entry) {
        let statistics = load_statistics(storage)?;
        print_statistics(&statistics);
    }

    Ok(())
}
