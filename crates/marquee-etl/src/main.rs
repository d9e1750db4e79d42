//! marquee-etl binary.
//!
//! Reads `marquee.toml` (or the path given with `--config`), opens the
//! relational source read-only, waits for the index endpoint, and runs sync
//! cycles until interrupted.
//!
//! A run guard left behind by a crashed process blocks every later start.
//! Once no other instance is running, clear it with:
//!
//! ```text
//! marquee-etl --release-guard
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use marquee_etl::{EtlConfig, Orchestrator, WatermarkStore, retry::retry};
use marquee_index::ElasticIndex;
use marquee_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Marquee movie index sync")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "marquee.toml")]
  config: PathBuf,

  /// Run a single cycle and exit.
  #[arg(long)]
  once: bool,

  /// Clear a stale run guard and exit.
  #[arg(long, conflicts_with = "once")]
  release_guard: bool,
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

  let cfg = EtlConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let mut state = WatermarkStore::open(&cfg.state_file).await?;

  if cli.release_guard {
    if !state.force_release().await? {
      tracing::info!(path = %cfg.state_file.display(), "no run guard was set");
    }
    return Ok(());
  }

  let source = SqliteStore::open(&cfg.source_path)
    .await
    .with_context(|| format!("failed to open source at {:?}", cfg.source_path))?;

  let index = ElasticIndex::new(cfg.index_config()).context("failed to build index client")?;
  retry("ping index", &cfg.retry, || index.ping())
    .await
    .with_context(|| format!("index at {} is unreachable", cfg.elastic_url))?;
  tracing::info!(url = %cfg.elastic_url, "index reachable");

  let mut orchestrator = Orchestrator::new(
    source,
    index,
    cfg.registry()?,
    cfg.settings(),
    state,
    cfg.upload_interval(),
  );

  if cli.once {
    orchestrator.run_cycle().await?;
    return Ok(());
  }

  let shutdown = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      tracing::error!(%e, "failed to listen for Ctrl-C");
      std::future::pending::<()>().await;
    }
  };
  orchestrator.run_forever(shutdown).await?;

  Ok(())
}
