//! Content items, parts and fields.
//!
//! Item payloads are `serde_json` documents keyed by part name; typed parts
//! and fields are decoded from them on demand.

mod fields;
mod ids;
mod item;
mod manager;
mod parts;

pub use fields::TaxonomyField;
pub use ids::generate_id;
pub use item::{ContentItem, ContentPart};
pub use manager::{ContentManager, VersionOptions};
pub use parts::{
    AliasPart, AutoroutePart, CommonPart, LinkMenuItemPart, MarkdownBodyPart,
    MenuItemsListPart, TitlePart,
};
