//! Headless CMS access and content normalization for the BRYTE site.
//!
//! The CMS is an editable, loosely typed data source: the same logical field may
//! be a string in one object and an object in the next, links arrive as HTML
//! snippets, and titles carry entities and invisible whitespace. This crate
//! turns that input into the flat structures the pages render.
//!
//! - [`client`]: Cosmic REST client built on `bryte-http`
//! - [`source`]: the [`ContentSource`] seam used by page assembly
//! - [`types`]: lenient raw object model
//! - [`normalize`]: pure normalizers (links, titles, section images, stats, posts)
//! - [`pages`]: per-page assembly with static fallbacks when the CMS is unavailable
pub mod client;
pub mod normalize;
pub mod pages;
pub mod source;
pub mod types;

pub use client::CosmicClient;
pub use source::{ContentSource, ObjectQuery};
pub use types::RawCmsObject;

use bryte_common::BryteError;
use bryte_http::HttpError;

#[derive(thiserror::Error, Debug)]
pub enum CmsError {
    #[error("CMS request failed: {0}")]
    Http(#[from] HttpError),

    #[error("invalid CMS query: {0}")]
    Query(String),
}

impl From<CmsError> for BryteError {
    fn from(err: CmsError) -> Self {
        BryteError::Upstream(err.to_string())
    }
}
