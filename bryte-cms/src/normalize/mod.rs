//! Pure normalizers from loosely typed CMS objects to render-ready data.
//!
//! Nothing here returns an error or panics on malformed input. A field that is
//! missing or of an unexpected type is treated as absent, which either triggers
//! the next fallback or drops the entry. Drops are reported as `debug` events
//! only; the caller decides what an empty result means.
pub mod html;
pub mod image;
pub mod links;
pub mod posts;
pub mod stats;
pub mod title;
mod value;

pub use html::{extract_anchor_text, extract_href};
pub use image::{ImageRef, SectionImageRef, resolve_section_image};
pub use links::{LinkEntry, LinksDictionary, normalize_link_entry, normalize_links};
pub use posts::{PostAuthor, PostCategory, PostSummary, normalize_post};
pub use stats::{HomeStatItem, parse_home_stats};
pub use title::{clean_title, decode_entities, is_valid_title};
