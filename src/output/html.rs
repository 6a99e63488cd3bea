//! Static HTML mirror of moderated posts
//!
//! Writes `page_1.html`, `page_2.html`, ... into the output directory, each
//! listing up to `items-per-page` flagged or deleted posts, newest first.
//! The markup mimics the crawled site's own listing so its stylesheet can be
//! reused.

use crate::config::{RenderConfig, SiteConfig};
use crate::item::ItemRecord;
use crate::output::RenderResult;
use crate::storage::Storage;
use std::fs;
use std::path::{Path, PathBuf};

/// Renders every non-active post into paged HTML files
///
/// # Arguments
///
/// * `storage` - Store to read the posts from
/// * `site` - Used to turn site-relative links into absolute ones
/// * `config` - Output directory and page size
///
/// # Returns
///
/// * `Ok(Vec<PathBuf>)` - The files written, in page order
/// * `Err(RenderError)` - Store query or file write failed
pub fn render_site(
    storage: &dyn Storage,
    site: &SiteConfig,
    config: &RenderConfig,
) -> RenderResult<Vec<PathBuf>> {
    let items = storage.find_non_active(Some(true))?;
    tracing::info!("rendering {} moderated posts", items.len());

    let output_dir = Path::new(&config.output_dir);
    fs::create_dir_all(output_dir)?;

    let pages = paginate(&items, config.items_per_page);
    let page_count = pages.len();
    let mut written = Vec::with_capacity(page_count);

    for (index, chunk) in pages.into_iter().enumerate() {
        let number = index + 1;
        let first_rank = index * config.items_per_page + 1;
        let html = render_page(chunk, number, first_rank, number < page_count, site.root());

        let path = output_dir.join(page_file_name(number));
        fs::write(&path, html)?;
        tracing::debug!("wrote {}", path.display());
        written.push(path);
    }

    Ok(written)
}

/// Splits items into pages; always returns at least one (possibly empty) page
fn paginate(items: &[ItemRecord], per_page: usize) -> Vec<&[ItemRecord]> {
    if items.is_empty() || per_page == 0 {
        return vec![&items[..0]];
    }
    items.chunks(per_page).collect()
}

pub fn page_file_name(number: usize) -> String {
    format!("page_{}.html", number)
}

/// Renders one complete page
///
/// Ranks start at `first_rank` so numbering continues across pages.
pub fn render_page(
    items: &[ItemRecord],
    number: usize,
    first_rank: usize,
    has_next: bool,
    root: &str,
) -> String {
    let mut html = page_header(root);

    for (offset, item) in items.iter().enumerate() {
        html.push_str(&render_item(first_rank + offset, item, root));
    }

    html.push_str(&page_footer(has_next.then_some(number + 1)));
    html
}

/// Renders the two table rows describing a single post
pub fn render_item(rank: usize, item: &ItemRecord, root: &str) -> String {
    let id = item.id;
    let title = absolutize_links(&item.title, root);
    let author = escape_html(&item.author);
    let date = item.created_at.format("%d/%m/%y");
    let date_hint = item.created_at.format("%Y-%m-%dT%H:%M:%S");

    format!(
        r#"
<!-- item start //-->
 <tr class='athing' id='{id}'>
    <td align="right" valign="top" class="title"><span class="rank">{rank}.</span></td>
    <td valign="top" class="votelinks"><center><div class='votearrow' title='upvote'></div></center></td>
    <td class="title">{title}</td>
 </tr>
 <tr>
    <td colspan="2"></td>
    <td class="subtext">
       <span class="score" id="score_{id}">{score} points</span> | <span class="score">{comments} comments</span> | by <a href="{root}/user?id={author}" class="hnuser">{author}</a> | <span class="age" title="{date_hint}"><a href="{root}/item?id={id}">{date}</a></span> | <span class="status">{status}</span> | <a href="{root}/item?id={id}">discuss</a>
    </td>
 </tr>
<!-- item end //-->
"#,
        score = item.score,
        comments = item.comment_count,
        status = item.status,
    )
}

/// Rewrites the site's relative "from?site=" links so they work off-site
pub fn absolutize_links(title: &str, root: &str) -> String {
    title.replace(
        r#"href="from?site="#,
        &format!(r#"href="{}/from?site="#, root),
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn page_header(root: &str) -> String {
    format!(
        r##"<html lang="en" op="newest">
   <head>
      <meta name="referrer" content="origin">
      <meta name="viewport" content="width=device-width, initial-scale=1.0">
      <link rel="stylesheet" type="text/css" href="data/news.css">
      <title>Flagged Links</title>
   </head>
<body>
   <center>
      <table id="hnmain" border="0" cellpadding="0" cellspacing="0" width="85%" bgcolor="#f6f6ef">
         <tr>
            <td bgcolor="#ff6600">
               <span class="pagetop"><b class="hnname"><a href="{root}/news">Flagged Links</a></b>
                  | <a href="{root}/newest">new</a> | <a href="{root}/ask">ask</a> | <a href="{root}/show">show</a>
               </span>
            </td>
         </tr>
         <tr id="pagespace" title="Flagged Links" style="height:10px"></tr>
         <tr>
            <td>
               <table border="0" cellpadding="0" cellspacing="0" class="itemlist">
"##
    )
}

/// Closes the page, linking to `next_page` when there is one
fn page_footer(next_page: Option<usize>) -> String {
    let more = match next_page {
        Some(number) => format!(
            r#"
                  <tr class="morespace" style="height:10px"></tr>
                  <tr>
                     <td colspan="2"></td>
                     <td class="title"><a href="{}" class="morelink" rel="next">More</a></td>
                  </tr>"#,
            page_file_name(number)
        ),
        None => String::new(),
    };

    format!(
        r#"
                  <tr class="spacer" style="height:5px"></tr>{more}
               </table>
            </td>
         </tr>
      </table>
   </center>
</body>
</html>
"#
    )
}
