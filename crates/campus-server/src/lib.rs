//! HTTP server for the campus events application.
//!
//! Wires configuration, the SQLite store, the mail transport and the JSON API
//! together. The binary in `main.rs` is a thin shell around this crate.

pub mod mailer;

use std::path::{Path, PathBuf};

use axum::Router;
use campus_api::SharedCampus;
use campus_core::{mailer::Mailer, storage::KeyValueStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CAMPUS_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// SQLite database file, or `:memory:` for a throwaway store.
  pub store_path: PathBuf,
  /// Base of the event links placed in outgoing email.
  pub public_url: String,
  /// Without this table, mail is only logged.
  pub emailjs:    Option<EmailJsConfig>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".into(),
      port:       8080,
      store_path: PathBuf::from("campus.db"),
      public_url: "http://localhost:8080".into(),
      emailjs:    None,
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn is_in_memory(&self) -> bool { self.store_path.as_os_str() == ":memory:" }
}

/// Credentials for the EmailJS REST endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailJsConfig {
  pub service_id:  String,
  pub template_id: String,
  pub user_id:     String,
  #[serde(default = "default_emailjs_endpoint")]
  pub endpoint:    String,
}

fn default_emailjs_endpoint() -> String {
  "https://api.emailjs.com/api/v1.0/email/send".into()
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The full application: the JSON API under `/api`, with request tracing.
pub fn router<K, M>(campus: SharedCampus<K, M>) -> Router
where
  K: KeyValueStore + 'static,
  M: Mailer + 'static,
{
  Router::new()
    .nest("/api", campus_api::api_router(campus))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use campus_core::{Campus, storage::MemoryStore};
  use config::{Config, File, FileFormat};
  use tokio::sync::Mutex;
  use tower::ServiceExt;

  use super::*;
  use crate::mailer::LogMailer;

  fn parse(toml: &str) -> ServerConfig {
    Config::builder()
      .add_source(File::from_str(toml, FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn empty_config_uses_defaults() {
    let cfg = parse("");
    assert_eq!(cfg.address(), "127.0.0.1:8080");
    assert_eq!(cfg.public_url, "http://localhost:8080");
    assert!(cfg.emailjs.is_none());
    assert!(!cfg.is_in_memory());
  }

  #[test]
  fn emailjs_table_gets_default_endpoint() {
    let cfg = parse(
      r#"
        port = 9000
        store_path = ":memory:"

        [emailjs]
        service_id = "svc"
        template_id = "tpl"
        user_id = "pub"
      "#,
    );
    assert_eq!(cfg.port, 9000);
    assert!(cfg.is_in_memory());
    let emailjs = cfg.emailjs.unwrap();
    assert_eq!(emailjs.service_id, "svc");
    assert_eq!(emailjs.endpoint, "https://api.emailjs.com/api/v1.0/email/send");
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(expand_tilde(Path::new("~/campus.db")), PathBuf::from(home).join("campus.db"));
    assert_eq!(expand_tilde(Path::new("/srv/campus.db")), PathBuf::from("/srv/campus.db"));
  }

  #[tokio::test]
  async fn api_is_mounted_under_prefix() {
    let campus = Campus::open(Arc::new(MemoryStore::default()), LogMailer).unwrap();
    let app = router(Arc::new(Mutex::new(campus)));

    let req = Request::builder().uri("/api/events").body(Body::empty()).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::builder().uri("/events").body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
