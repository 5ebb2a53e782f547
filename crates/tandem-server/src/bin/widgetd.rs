//! Tandem widget daemon.
//!
//! Reads `widgetd.toml` (or the path given with `--config`), opens the
//! snapshot cache, wires the repository and scheduler, and serves the
//! loopback trigger surface.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use tandem_gateway::{GatewayConfig, HttpPartnerGateway};
use tandem_server::{
  AppState, FileUserState, Repository, Scheduler, ServerConfig,
};
use tandem_store_sqlite::SqliteSnapshotStore;
use tandem_sync::NoConstraints;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Tandem widget data daemon")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "widgetd.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("TANDEM"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let user_state_path = expand_tilde(&server_cfg.user_state_path);

  // Open the snapshot cache.
  let store = SqliteSnapshotStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open cache at {store_path:?}"))?;

  // Partner gateway.
  let gateway = HttpPartnerGateway::new(GatewayConfig {
    base_url:   server_cfg.partner_api_url.clone(),
    auth_token: server_cfg.partner_api_token.clone(),
    timeout:    std::time::Duration::from_secs(server_cfg.gateway_timeout_secs),
  })
  .context("failed to build partner gateway")?;

  // Repository and scheduler — explicit instances, passed to consumers.
  let repository = Arc::new(
    Repository::open(
      Arc::new(store),
      Arc::new(gateway),
      Arc::new(FileUserState::new(user_state_path)),
      server_cfg.repository_config(),
    )
    .await,
  );
  let scheduler = Arc::new(Scheduler::new(
    repository.clone(),
    Arc::new(NoConstraints),
    server_cfg.scheduler_config(),
  ));

  let app = tandem_server::router(AppState { repository, scheduler });
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
