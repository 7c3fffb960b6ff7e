//! Common types and utilities shared across the BRYTE site crates.
//!
//! This crate holds the shared error type and the tracing initialiser used by
//! the binary and integration tests. It stays small so that every crate in
//! the workspace can depend on it.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`BryteError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! ```rust
//! use bryte_common::{BryteError, Result};
//!
//! fn load(slug: &str) -> Result<()> {
//!     Err(BryteError::NotFound(slug.to_string()))
//! }
//!
//! let err = load("home").unwrap_err();
//! assert_eq!(err.to_string(), "Content not found: home");
//! ```
pub mod observability;

/// Error types used across the BRYTE site.
#[derive(thiserror::Error, Debug)]
pub enum BryteError {
    /// The headless CMS could not be reached or answered with an error.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// A requested CMS object does not exist.
    #[error("Content not found: {0}")]
    NotFound(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Outgoing mail could not be built or delivered.
    #[error("Mail error: {0}")]
    Mail(String),

    /// The contact pipeline answered with a non-success status.
    #[error("Contact submission rejected with status {0}")]
    Rejected(u16),

    /// Anything else bubbling up from a lower layer.
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Convenient alias for results that use [`BryteError`].
pub type Result<T> = std::result::Result<T, BryteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anyhow_errors_convert_into_internal() {
        let err: BryteError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, BryteError::Internal(_)));
        assert_eq!(err.to_string(), "Internal error: boom");
    }

    #[test]
    fn messages_name_the_failing_layer() {
        assert_eq!(
            BryteError::Config("cms.read_key must not be empty".into()).to_string(),
            "Configuration error: cms.read_key must not be empty"
        );
        assert_eq!(
            BryteError::Rejected(429).to_string(),
            "Contact submission rejected with status 429"
        );
    }
}
