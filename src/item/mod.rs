//! Item model
//!
//! # Components
//!
//! - `ItemRecord`: one catalog entry as stored in the database
//! - `ItemStatus`: moderation status derived from the title
//! - `Category`: listing that first produced the item
//! - `ParseResult`: valid record or the reason an item document was rejected

mod record;
mod status;

pub use record::{InvalidReason, ItemRecord, ParseResult};
pub use status::{Category, ItemStatus};
