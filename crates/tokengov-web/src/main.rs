//! Token governor control panel.
//!
//! Serves the governor settings API (and optionally the browser panel) and
//! keeps the agent runtime's config in step with every saved change.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p tokengov-web
//! cargo run -p tokengov-web -- --port 8080 --static-dir public
//! GOVERNOR_PATH=/tmp/governor.json OPENCLAW_CONFIG=/tmp/openclaw.json cargo run -p tokengov-web
//! RUST_LOG=tokengov=debug cargo run -p tokengov-web
//! ```
//!
//! ## Updating settings
//!
//! **REST** (`POST /api/governor`):
//! ```json
//! {"mode": "auto", "knobs": {"reasoning": true, "budgetTokens": 12000}}
//! ```

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;
use tokengov::projector::{DEFAULT_MODEL_ID, DEFAULT_MODEL_KEY, ProjectionTarget};
use tokengov_web::{DEFAULT_PORT, WebConfig, openclaw_dir, spawn_web};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Token governor control panel.
#[derive(Parser)]
#[command(about = "Control panel for an agent runtime's token budget and inference knobs")]
struct Args {
    /// Port for the web server.
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Address to bind to.
    #[arg(long, default_value = "127.0.0.1")]
    bind: IpAddr,

    /// Governor settings document [default: ~/.openclaw/governor.json]
    #[arg(long, env = "GOVERNOR_PATH")]
    governor_path: Option<PathBuf>,

    /// Agent runtime config to project onto [default: ~/.openclaw/openclaw.json]
    #[arg(long, env = "OPENCLAW_CONFIG")]
    runtime_config: Option<PathBuf>,

    /// Directory of static files for the browser panel.
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Model id matched in the runtime's provider groups.
    #[arg(long, default_value = DEFAULT_MODEL_ID)]
    model_id: String,

    /// Key of the model under agents.defaults.models.
    #[arg(long, default_value = DEFAULT_MODEL_KEY)]
    model_key: String,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let dir = openclaw_dir();
    let config = WebConfig {
        bind_addr: SocketAddr::new(args.bind, args.port),
        governor_path: args
            .governor_path
            .unwrap_or_else(|| dir.join("governor.json")),
        runtime_config_path: args
            .runtime_config
            .unwrap_or_else(|| dir.join("openclaw.json")),
        static_dir: args.static_dir,
        target: ProjectionTarget {
            model_id: args.model_id,
            model_key: args.model_key,
        },
    };
    let governor_path = config.governor_path.clone();
    let runtime_path = config.runtime_config_path.clone();

    let addr = spawn_web(config)
        .await
        .map_err(|e| format!("failed to start server: {e}"))?;
    info!("Token governor running on http://{addr}");
    info!("Settings: {}", governor_path.display());
    info!("Runtime config: {}", runtime_path.display());

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("failed to listen for shutdown signal: {e}"))?;
    info!("Shutting down");
    Ok(())
}
