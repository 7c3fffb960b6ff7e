use crate::ContactError;
use crate::form::ContactSubmission;
use async_trait::async_trait;
use bryte_config::SmtpConfig;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

const IMPLICIT_TLS_PORT: u16 = 465;

/// Rendered notification for one submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContactEmail {
    pub subject: String,
    pub html: String,
}

fn escape(text: &str) -> String {
    html_escape::encode_quoted_attribute(text).into_owned()
}

/// Notification body with every submitted value HTML-escaped.
///
/// ```
/// use bryte_contact::{ContactSubmission, render_email};
///
/// let email = render_email(&ContactSubmission {
///     name: "Ada".into(),
///     email: "ada@example.org".into(),
///     message: "<b>hi</b>\nbye".into(),
/// });
/// assert_eq!(email.subject, "New Contact Form Submission from Ada");
/// assert!(email.html.contains("&lt;b&gt;hi&lt;/b&gt;<br>bye"));
/// ```
pub fn render_email(submission: &ContactSubmission) -> ContactEmail {
    let name = escape(&submission.name);
    let email = escape(&submission.email);
    let message = escape(&submission.message).replace('\n', "<br>");
    ContactEmail {
        subject: format!("New Contact Form Submission from {}", submission.name),
        html: format!(
            "<h2>New Contact Form Submission</h2>\n\
             <p><strong>Name:</strong> {name}</p>\n\
             <p><strong>Email:</strong> {email}</p>\n\
             <p><strong>Message:</strong></p>\n\
             <p>{message}</p>\n\
             <hr>\n\
             <p><em>This message was sent from the contact form on your website.</em></p>\n"
        ),
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &ContactEmail) -> Result<(), ContactError>;
}

/// Accepts and discards; used when no SMTP account is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, email: &ContactEmail) -> Result<(), ContactError> {
        tracing::info!(subject=%email.subject, "contact.mail.skipped");
        Ok(())
    }
}

/// SMTP delivery via the configured account; STARTTLS, or implicit TLS on 465.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

fn mailbox(raw: &str) -> Result<Mailbox, ContactError> {
    raw.parse()
        .map_err(|e: lettre::address::AddressError| ContactError::Address(raw.to_string(), e.to_string()))
}

impl SmtpMailer {
    pub fn from_config(cfg: &SmtpConfig) -> Result<Self, ContactError> {
        let from = mailbox(&cfg.username)?;
        let to = mailbox(cfg.recipient())?;
        let builder = if cfg.port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)
        }
        .map_err(|e| ContactError::Transport(e.to_string()))?;

        let transport = builder
            .port(cfg.port)
            .credentials(Credentials::new(cfg.username.clone(), cfg.password.clone()))
            .build();

        Ok(Self { transport, from, to })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &ContactEmail) -> Result<(), ContactError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(email.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(email.html.clone())
            .map_err(|e| ContactError::Message(e.to_string()))?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| ContactError::Transport(e.to_string()))?;
        tracing::info!(code=%response.code(), "contact.mail.sent");
        Ok(())
    }
}
