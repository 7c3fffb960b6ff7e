use bryte_config::ContactConfig;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("EMAIL_RE: hardcoded regex is valid")
});

/// Length caps, counted in characters after trimming.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContactLimits {
    pub max_name_length: usize,
    pub max_message_length: usize,
}

impl Default for ContactLimits {
    fn default() -> Self {
        Self {
            max_name_length: 100,
            max_message_length: 5000,
        }
    }
}

impl From<&ContactConfig> for ContactLimits {
    fn from(cfg: &ContactConfig) -> Self {
        Self {
            max_name_length: cfg.max_name_length,
            max_message_length: cfg.max_message_length,
        }
    }
}

/// A validated, trimmed submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Client-facing validation failures; the display text is the response body.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormError {
    #[error("Missing required fields")]
    MissingFields,
    #[error("Name is too long")]
    NameTooLong,
    #[error("Message is too long")]
    MessageTooLong,
    #[error("Invalid email address")]
    InvalidEmail,
}

/// Text of a submitted field; `None` for absent, null, empty, `false`, `0`
/// and structured values.
fn field(body: &Value, key: &str) -> Option<String> {
    let text = match body.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) if n.as_f64() != Some(0.0) => n.to_string(),
        Value::Bool(true) => "true".to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Validate a parsed JSON body: required fields, then name length, message
/// length and email syntax, in that order.
pub fn validate_submission(body: &Value, limits: &ContactLimits) -> Result<ContactSubmission, FormError> {
    let (Some(name), Some(email), Some(message)) =
        (field(body, "name"), field(body, "email"), field(body, "message"))
    else {
        return Err(FormError::MissingFields);
    };
    if name.chars().count() > limits.max_name_length {
        return Err(FormError::NameTooLong);
    }
    if message.chars().count() > limits.max_message_length {
        return Err(FormError::MessageTooLong);
    }
    if !is_valid_email(&email) {
        return Err(FormError::InvalidEmail);
    }
    Ok(ContactSubmission {
        name,
        email,
        message,
    })
}

/// Rate-limit key: first `X-Forwarded-For` hop, else `X-Real-IP`, else `"unknown"`.
///
/// ```
/// use bryte_contact::client_id;
///
/// assert_eq!(client_id(Some(" 203.0.113.7 , 10.0.0.1"), Some("10.0.0.9")), "203.0.113.7");
/// assert_eq!(client_id(None, Some("10.0.0.9")), "10.0.0.9");
/// assert_eq!(client_id(None, None), "unknown");
/// ```
pub fn client_id(forwarded_for: Option<&str>, real_ip: Option<&str>) -> String {
    let non_empty = |s: &str| -> Option<String> {
        let s = s.trim();
        (!s.is_empty()).then(|| s.to_string())
    };
    forwarded_for
        .filter(|f| !f.is_empty())
        .map(|f| f.split(',').next().unwrap_or_default().trim().to_string())
        .or_else(|| real_ip.and_then(non_empty))
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validate(body: Value) -> Result<ContactSubmission, FormError> {
        validate_submission(&body, &ContactLimits::default())
    }

    #[test]
    fn valid_submission_is_trimmed() {
        let got = validate(json!({ "name": "  Ada ", "email": " ada@example.org ", "message": "Hi\nthere " }));
        assert_eq!(
            got,
            Ok(ContactSubmission {
                name: "Ada".into(),
                email: "ada@example.org".into(),
                message: "Hi\nthere".into(),
            })
        );
    }

    #[test]
    fn missing_or_falsy_fields_are_rejected() {
        let cases = [
            json!({ "email": "a@b.co", "message": "m" }),
            json!({ "name": "", "email": "a@b.co", "message": "m" }),
            json!({ "name": "   ", "email": "a@b.co", "message": "m" }),
            json!({ "name": "n", "email": null, "message": "m" }),
            json!({ "name": "n", "email": "a@b.co", "message": 0 }),
            json!({ "name": "n", "email": "a@b.co", "message": false }),
            json!({ "name": { "first": "n" }, "email": "a@b.co", "message": "m" }),
            json!("just a string"),
        ];
        for body in cases {
            assert_eq!(validate(body.clone()), Err(FormError::MissingFields), "{body}");
        }
    }

    #[test]
    fn scalar_fields_are_stringified() {
        let got = validate(json!({ "name": 42, "email": "a@b.co", "message": true })).unwrap();
        assert_eq!(got.name, "42");
        assert_eq!(got.message, "true");
    }

    #[test]
    fn limits_are_checked_in_order() {
        let long_name = "n".repeat(101);
        let long_message = "m".repeat(5001);
        assert_eq!(
            validate(json!({ "name": long_name, "email": "bad", "message": long_message })),
            Err(FormError::NameTooLong)
        );
        assert_eq!(
            validate(json!({ "name": "n", "email": "bad", "message": long_message })),
            Err(FormError::MessageTooLong)
        );
        assert_eq!(
            validate(json!({ "name": "n", "email": "bad", "message": "m" })),
            Err(FormError::InvalidEmail)
        );
    }

    #[test]
    fn limits_count_characters() {
        let name = "é".repeat(100);
        assert!(validate(json!({ "name": name, "email": "a@b.co", "message": "m" })).is_ok());
    }

    #[test]
    fn email_syntax() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.de"));
        assert!(!is_valid_email("a@@b.co"));
        assert!(!is_valid_email("@b.co"));
    }

    #[test]
    fn client_id_prefers_forwarded_header() {
        assert_eq!(client_id(Some("198.51.100.1"), None), "198.51.100.1");
        assert_eq!(client_id(Some(""), Some(" 10.1.1.1 ")), "10.1.1.1");
        assert_eq!(client_id(None, Some("")), "unknown");
    }
}
