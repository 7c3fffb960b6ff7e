use crate::form::{ContactLimits, client_id, validate_submission};
use crate::mail::{Mailer, render_email};
use crate::rate::{RateDecision, RateStore};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::time::Instant;
use url::Url;

pub const FORBIDDEN: &str = "Forbidden";
pub const RATE_LIMITED: &str = "Too many submissions. Please try again later.";
pub const INTERNAL_ERROR: &str = "Internal Server Error";

/// The parts of an HTTP request the pipeline looks at.
#[derive(Clone, Debug, Default)]
pub struct ContactRequest {
    /// Absolute request URL; its origin is compared with `origin`.
    pub url: String,
    pub origin: Option<String>,
    pub forwarded_for: Option<String>,
    pub real_ip: Option<String>,
    pub body: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ContactResponse {
    pub status: u16,
    pub body: Value,
}

impl ContactResponse {
    fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": message }),
        }
    }

    fn success() -> Self {
        Self {
            status: 200,
            body: json!({ "success": true }),
        }
    }
}

/// Same-origin check: a present `Origin` header must equal the origin of the
/// request URL. Requests without the header pass.
fn origin_allowed(req: &ContactRequest) -> bool {
    let Some(origin) = req.origin.as_deref() else {
        return true;
    };
    match Url::parse(&req.url) {
        Ok(url) => url.origin().ascii_serialization() == origin,
        Err(_) => false,
    }
}

pub struct ContactHandler {
    limits: ContactLimits,
    rate: Arc<dyn RateStore>,
    mailer: Arc<dyn Mailer>,
}

impl ContactHandler {
    pub fn new(limits: ContactLimits, rate: Arc<dyn RateStore>, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            limits,
            rate,
            mailer,
        }
    }

    pub async fn handle(&self, req: &ContactRequest) -> ContactResponse {
        self.handle_at(req, Instant::now()).await
    }

    /// [`handle`](Self::handle) with an explicit clock reading for the rate limiter.
    pub async fn handle_at(&self, req: &ContactRequest, now: Instant) -> ContactResponse {
        if !origin_allowed(req) {
            tracing::warn!(origin=?req.origin, url=%req.url, "contact.origin.rejected");
            return ContactResponse::error(403, FORBIDDEN);
        }

        let client = client_id(req.forwarded_for.as_deref(), req.real_ip.as_deref());
        if let RateDecision::Limited { retry_after } = self.rate.check(&client, now).await {
            tracing::warn!(%client, retry_after_secs = retry_after.as_secs(), "contact.rate_limited");
            return ContactResponse::error(429, RATE_LIMITED);
        }

        let body: Value = match serde_json::from_str(&req.body) {
            Ok(Value::Null) | Err(_) => {
                tracing::warn!(%client, "contact.body.unparsable");
                return ContactResponse::error(500, INTERNAL_ERROR);
            }
            Ok(body) => body,
        };

        let submission = match validate_submission(&body, &self.limits) {
            Ok(submission) => submission,
            Err(err) => {
                tracing::info!(%client, reason=%err, "contact.rejected");
                return ContactResponse::error(400, &err.to_string());
            }
        };

        let email = render_email(&submission);
        if let Err(err) = self.mailer.send(&email).await {
            tracing::error!(%client, error=%err, "contact.mail.failed");
        }
        tracing::info!(%client, "contact.accepted");
        ContactResponse::success()
    }
}
