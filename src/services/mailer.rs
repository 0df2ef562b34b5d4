use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("resend error: {0}")]
    Resend(String),
}

#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError>;
}

/// Transactional mail over the Resend HTTP API.
#[derive(Clone)]
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    from: String,
}

impl ResendMailer {
    pub fn new(client: reqwest::Client, api_key: &str, from: &str) -> Self {
        Self {
            client,
            api_key: api_key.trim().to_string(),
            from: from.trim().to_string(),
        }
    }
}

#[derive(Serialize)]
struct ResendBody<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), MailError> {
        let resp = self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&ResendBody {
                from: &self.from,
                to: &email.to,
                subject: &email.subject,
                html: &email.html,
            })
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let text = resp.text().await.unwrap_or_default();
        Err(MailError::Resend(format!("{} {}", status, text)))
    }
}

/// The welcome mail sent right after an account is created. The actual
/// confirmation link comes from the identity provider; this mail points the
/// user at it.
pub fn verification_email(to: &str) -> OutboundEmail {
    OutboundEmail {
        to: to.to_string(),
        subject: "Verify your LinkHub email".to_string(),
        html: "<p>Thanks for signing up for LinkHub.<br/>Click the verification link our system sent to your email address.<br/>If it never arrives, check your spam folder or use the resend option on the login page.</p>".to_string(),
    }
}

pub fn verification_reminder_email(to: &str) -> OutboundEmail {
    OutboundEmail {
        to: to.to_string(),
        subject: "Your LinkHub verification link".to_string(),
        html: "<p>Please click the verification link our system sent to your email address.<br/>If it never arrives, check your spam folder or try again in a few minutes.</p>".to_string(),
    }
}
