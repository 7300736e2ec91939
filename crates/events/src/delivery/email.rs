//! Email notification delivery via SMTP.
//!
//! [`EmailDelivery`] wraps the `lettre` async SMTP transport to send
//! plain-text notification emails. Configuration is loaded from environment
//! variables; if `SMTP_HOST` is not set, [`EmailConfig::from_env`] returns
//! `None` and no mailer should be constructed.

use aidlink_core::money::format_php;
use aidlink_core::types::Centavos;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "AidLink <noreply@aidlink.local>";

#[derive(Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// RFC 5322 "From" mailbox.
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("from_address", &self.from_address)
            .field("smtp_user", &self.smtp_user)
            .finish_non_exhaustive()
    }
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// delivery is not configured and should be skipped.
    ///
    /// | Variable        | Required | Default                           |
    /// |-----------------|----------|-----------------------------------|
    /// | `SMTP_HOST`     | yes      | --                                |
    /// | `SMTP_PORT`     | no       | `587`                             |
    /// | `SMTP_FROM`     | no       | `AidLink <noreply@aidlink.local>` |
    /// | `SMTP_USER`     | no       | --                                |
    /// | `SMTP_PASSWORD` | no       | --                                |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok().filter(|h| !h.is_empty())?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// EmailMessage
// ---------------------------------------------------------------------------

/// Subject and plain-text body of a notification email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub subject: String,
    pub body: String,
}

const SIGNATURE: &str = "\n\n-- \nAidLink: student charity crowdfunding";

impl EmailMessage {
    /// A message mirroring an in-app notification.
    pub fn plain(title: &str, message: &str) -> Self {
        Self {
            subject: format!("[AidLink] {title}"),
            body: format!("{message}{SIGNATURE}"),
        }
    }

    pub fn project_submitted(project_title: &str, proposer: &str, link: &str) -> Self {
        Self {
            subject: format!("[AidLink] New project awaiting review: {project_title}"),
            body: format!(
                "{proposer} submitted \"{project_title}\" for approval.\n\nReview it at {link}{SIGNATURE}"
            ),
        }
    }

    pub fn project_approved(project_title: &str, link: &str) -> Self {
        Self {
            subject: format!("[AidLink] Your project \"{project_title}\" was approved"),
            body: format!(
                "Good news! \"{project_title}\" is now live and accepting donations.\n\n\
                 Share it with your friends: {link}{SIGNATURE}"
            ),
        }
    }

    pub fn project_rejected(project_title: &str, reason: &str, link: &str) -> Self {
        Self {
            subject: format!("[AidLink] Your project \"{project_title}\" needs changes"),
            body: format!(
                "\"{project_title}\" was not approved.\n\nReason: {reason}\n\n\
                 You can edit and resubmit it at {link}{SIGNATURE}"
            ),
        }
    }

    pub fn project_completed(project_title: &str, raised: Centavos) -> Self {
        Self {
            subject: format!("[AidLink] \"{project_title}\" is complete"),
            body: format!(
                "\"{project_title}\" has been marked complete after raising {}.\n\n\
                 Thank you for being part of it.{SIGNATURE}",
                format_php(raised)
            ),
        }
    }

    /// Sent to the project owner. `donor` is `None` for anonymous donations.
    pub fn donation_received(project_title: &str, amount: Centavos, donor: Option<&str>) -> Self {
        let donor = donor.unwrap_or("An anonymous donor");
        Self {
            subject: format!("[AidLink] New donation to \"{project_title}\""),
            body: format!(
                "{donor} donated {} to \"{project_title}\".{SIGNATURE}",
                format_php(amount)
            ),
        }
    }

    /// Sent to the donor once a payment settles.
    pub fn donation_confirmed(project_title: &str, amount: Centavos) -> Self {
        Self {
            subject: "[AidLink] Thank you for your donation".to_string(),
            body: format!(
                "Your donation of {} to \"{project_title}\" has been received.{SIGNATURE}",
                format_php(amount)
            ),
        }
    }

    pub fn project_update(project_title: &str, update_title: &str, link: &str) -> Self {
        Self {
            subject: format!("[AidLink] Update from \"{project_title}\": {update_title}"),
            body: format!(
                "A project you supported posted an update: \"{update_title}\".\n\n\
                 Read it at {link}{SIGNATURE}"
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

/// Sends notification emails via SMTP. The transport is built once and
/// reused for every message.
pub struct EmailDelivery {
    from_address: String,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailDelivery {
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (config.smtp_user, config.smtp_password) {
            builder = builder.credentials(Credentials::new(user, pass));
        }

        Ok(Self {
            from_address: config.from_address,
            mailer: builder.build(),
        })
    }

    pub async fn send(&self, to_email: &str, message: &EmailMessage) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(self.from_address.parse()?)
            .to(to_email.parse()?)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| EmailError::Build(e.to_string()))?;

        self.mailer.send(email).await?;

        tracing::info!(to = to_email, subject = %message.subject, "Notification email sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
