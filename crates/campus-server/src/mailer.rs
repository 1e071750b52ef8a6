//! Mail transports for event broadcasts.
//!
//! [`EmailJsMailer`] posts each batch to the EmailJS REST API as a single
//! templated message; [`LogMailer`] only logs. [`ConfiguredMailer`] picks one
//! at startup depending on whether `[emailjs]` is configured.

use std::{convert::Infallible, time::Duration};

use campus_core::mailer::{MailBatch, Mailer};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;

use crate::EmailJsConfig;

#[derive(Debug, Error)]
pub enum MailError {
  #[error("mail request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("mail service returned {status}: {body}")]
  Rejected { status: StatusCode, body: String },
}

// ─── EmailJS ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
  service_id:      &'a str,
  template_id:     &'a str,
  user_id:         &'a str,
  template_params: TemplateParams,
}

#[derive(Debug, Serialize)]
struct TemplateParams {
  to_emails:   String,
  event_title: String,
  event_url:   String,
}

/// Sends one EmailJS request per batch, addressed to every recipient.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct EmailJsMailer {
  client:     Client,
  config:     EmailJsConfig,
  public_url: String,
}

impl EmailJsMailer {
  pub fn new(config: EmailJsConfig, public_url: impl Into<String>) -> Result<Self, MailError> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, config, public_url: public_url.into() })
  }

  fn event_url(&self, batch: &MailBatch) -> String {
    format!("{}/event/{}", self.public_url.trim_end_matches('/'), batch.event_id)
  }

  fn request<'a>(&'a self, batch: &MailBatch) -> SendRequest<'a> {
    SendRequest {
      service_id:      &self.config.service_id,
      template_id:     &self.config.template_id,
      user_id:         &self.config.user_id,
      template_params: TemplateParams {
        to_emails:   batch.recipients.join(","),
        event_title: batch.message.clone(),
        event_url:   self.event_url(batch),
      },
    }
  }
}

impl Mailer for EmailJsMailer {
  type Error = MailError;

  async fn send_batch(&self, batch: &MailBatch) -> Result<(), MailError> {
    if batch.recipients.is_empty() {
      tracing::debug!(event = %batch.event_id, "no recipients; skipping email");
      return Ok(());
    }

    let resp = self
      .client
      .post(&self.config.endpoint)
      .json(&self.request(batch))
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(MailError::Rejected { status, body });
    }

    tracing::info!(
      event = %batch.event_id,
      recipients = batch.recipients.len(),
      "event email sent"
    );
    Ok(())
  }
}

// ─── Log only ────────────────────────────────────────────────────────────────

/// Logs each batch and reports success.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
  type Error = Infallible;

  async fn send_batch(&self, batch: &MailBatch) -> Result<(), Infallible> {
    tracing::info!(
      event = %batch.event_id,
      recipients = ?batch.recipients,
      message = %batch.message,
      "email not configured; batch logged"
    );
    Ok(())
  }
}

// ─── Selection ───────────────────────────────────────────────────────────────

/// The transport chosen from configuration.
#[derive(Clone)]
pub enum ConfiguredMailer {
  EmailJs(EmailJsMailer),
  Log(LogMailer),
}

impl ConfiguredMailer {
  pub fn from_config(
    emailjs: Option<EmailJsConfig>,
    public_url: &str,
  ) -> Result<Self, MailError> {
    Ok(match emailjs {
      Some(config) => Self::EmailJs(EmailJsMailer::new(config, public_url)?),
      None => Self::Log(LogMailer),
    })
  }

  pub fn name(&self) -> &'static str {
    match self {
      Self::EmailJs(_) => "emailjs",
      Self::Log(_) => "log",
    }
  }
}

impl Mailer for ConfiguredMailer {
  type Error = MailError;

  async fn send_batch(&self, batch: &MailBatch) -> Result<(), MailError> {
    match self {
      Self::EmailJs(mailer) => mailer.send_batch(batch).await,
      Self::Log(mailer) => mailer.send_batch(batch).await.map_err(|never| match never {}),
    }
  }
}
