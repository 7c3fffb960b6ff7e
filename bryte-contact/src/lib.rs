//! Contact-form handling for the BRYTE site.
//!
//! A submission goes through an origin check, a per-client rate limit, field
//! validation and finally an email notification. The handler is framework
//! agnostic: callers translate their HTTP request into a [`ContactRequest`] and
//! the returned [`ContactResponse`] back into a reply.
//!
//! - [`form`]: field extraction, limits, email syntax, client identification
//! - [`rate`]: sliding-window limiter behind the [`RateStore`] seam
//! - [`mail`]: notification rendering and the [`Mailer`] seam (SMTP or no-op)
//! - [`handler`]: the request pipeline
pub mod form;
pub mod handler;
pub mod mail;
pub mod rate;

pub use form::{ContactLimits, ContactSubmission, FormError, client_id};
pub use handler::{ContactHandler, ContactRequest, ContactResponse};
pub use mail::{ContactEmail, Mailer, NoopMailer, SmtpMailer, render_email};
pub use rate::{InMemoryRateStore, RateDecision, RatePolicy, RateStore, spawn_sweeper};

use bryte_common::BryteError;

/// Failures of the notification path. They are logged by the handler and
/// never change the response of an otherwise valid submission.
#[derive(thiserror::Error, Debug)]
pub enum ContactError {
    #[error("invalid mailbox {0:?}: {1}")]
    Address(String, String),

    #[error("could not build message: {0}")]
    Message(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),
}

impl From<ContactError> for BryteError {
    fn from(err: ContactError) -> Self {
        BryteError::Mail(err.to_string())
    }
}
