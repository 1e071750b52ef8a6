//! campus-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `CAMPUS_*` environment variables, opens the SQLite store and serves the
//! JSON API under `/api`.
//!
//! ```text
//! CAMPUS_PORT=3000 CAMPUS_EMAILJS__SERVICE_ID=... campus-server --config campus.toml
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use campus_core::Campus;
use campus_server::{ServerConfig, expand_tilde, mailer::ConfiguredMailer};
use campus_store_sqlite::SqliteStore;
use clap::Parser;
use tokio::{net::TcpListener, sync::Mutex};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "School events server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("CAMPUS")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()
    .context("failed to read configuration")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store = if server_cfg.is_in_memory() {
    tracing::warn!("using an in-memory store; data is lost on exit");
    SqliteStore::open_in_memory().context("failed to open in-memory store")?
  } else {
    let path = expand_tilde(&server_cfg.store_path);
    SqliteStore::open(&path).with_context(|| format!("failed to open store at {path:?}"))?
  };

  let mailer = ConfiguredMailer::from_config(server_cfg.emailjs.clone(), &server_cfg.public_url)
    .context("failed to build mail transport")?;
  tracing::info!(transport = mailer.name(), "mailer ready");

  let campus = Campus::open(Arc::new(store), mailer).context("failed to load campus data")?;
  let app = campus_server::router(Arc::new(Mutex::new(campus)));

  let address = server_cfg.address();
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
