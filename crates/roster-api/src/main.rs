//! Roster HR directory server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `ROSTER_`-prefixed environment variables, opens the SQLite store, seeds
//! the bootstrap admin, and serves the API and web console over HTTP.
//!
//! # Password hash generation
//!
//! To generate an argon2 PHC string (e.g. for operational tooling):
//!
//! ```text
//! cargo run -p roster-api --bin rosterd -- --hash-password
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use roster_api::{
  AppState, ServerConfig,
  auth::{self, TokenKeys},
  interpreter::Interpreter,
  mailer::Mailer,
  seed,
};
use roster_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Roster HR directory server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
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

  // Helper mode: hash a password and exit.
  if cli.hash_password {
    let password = read_password_line()?;
    let hash = auth::hash_password(&password)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
    println!("{hash}");
    return Ok(());
  }

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("ROSTER").separator("__"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  if server_cfg.token_secret.is_empty() {
    anyhow::bail!("token_secret must be configured");
  }

  // Open the store.
  let store = SqliteStore::open(&server_cfg.store_path)
    .await
    .with_context(|| {
      format!("failed to open store at {:?}", server_cfg.store_path)
    })?;

  // Seed the bootstrap admin.
  if !server_cfg.seed.admin_email.is_empty() {
    let admin_hash = auth::hash_password(&server_cfg.seed.admin_password)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
    seed::ensure_admin(&store, &server_cfg.seed, admin_hash)
      .await
      .context("failed to seed admin")?;
  }

  // Build application state.
  let default_hash = auth::hash_password(&server_cfg.default_worker_password)
    .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
  let tokens = TokenKeys::new(
    &server_cfg.token_secret,
    server_cfg.token_ttl_hours,
    &server_cfg.token_issuer,
    &server_cfg.token_audience,
  );
  let mailer =
    Mailer::from_config(&server_cfg.smtp).context("invalid SMTP config")?;

  let state = AppState {
    store:                 Arc::new(store),
    tokens:                Arc::new(tokens),
    interpreter:           Arc::new(Interpreter::new(server_cfg.ai.clone())),
    mailer:                Arc::new(mailer),
    default_password_hash: Arc::new(default_hash),
    config:                Arc::new(server_cfg.clone()),
  };

  let app = roster_api::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password from stdin.
fn read_password_line() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}
