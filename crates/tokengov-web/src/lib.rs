//! HTTP control panel for the `tokengov` token budget governor.
//!
//! `tokengov-web` exposes the governor settings over a small JSON API and can
//! serve the browser panel's static files. Each update saves the settings
//! document and then projects the active token ceiling and knobs onto the
//! agent runtime's config.
//!
//! # Quick start
//!
//! ```ignore
//! use tokengov_web::{WebConfig, spawn_web};
//!
//! let config = WebConfig {
//!     static_dir: Some("public".into()),
//!     ..Default::default()
//! };
//! let addr = spawn_web(config).await?;
//! println!("Governor panel: http://{addr}");
//! ```
//!
//! # Architecture
//!
//! ```text
//! browser ──GET/POST /api/governor──▶ api handlers ──▶ SettingsStore   (governor.json)
//!                                           │
//!                                           └──────▶ RuntimeConfigFile (openclaw.json)
//! ```

mod api;
mod server;
pub mod view;

pub use view::{GovernorView, UpdateResponse};

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokengov::projector::{ProjectionTarget, RuntimeConfigFile};
use tokengov::store::SettingsStore;

/// Default port of the control panel.
pub const DEFAULT_PORT: u16 = 3939;

/// Configuration for the web server.
pub struct WebConfig {
    /// Address to bind to. Default: `127.0.0.1:3939`.
    pub bind_addr: SocketAddr,
    /// Governor settings document. Default: `~/.openclaw/governor.json`.
    pub governor_path: PathBuf,
    /// Agent runtime config. Default: `~/.openclaw/openclaw.json`.
    pub runtime_config_path: PathBuf,
    /// Directory of the browser panel's static files.
    ///
    /// If `None`, only the API is served.
    pub static_dir: Option<PathBuf>,
    /// Model the projector writes to.
    pub target: ProjectionTarget,
}

impl Default for WebConfig {
    fn default() -> Self {
        let dir = openclaw_dir();
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            governor_path: dir.join("governor.json"),
            runtime_config_path: dir.join("openclaw.json"),
            static_dir: None,
            target: ProjectionTarget::default(),
        }
    }
}

/// `~/.openclaw`, or `./.openclaw` when no home directory is known.
pub fn openclaw_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".openclaw")
}

/// Spawn the web server on a Tokio task.
///
/// Returns the bound address. The server runs until the Tokio runtime shuts
/// down.
pub async fn spawn_web(config: WebConfig) -> std::io::Result<SocketAddr> {
    let app_state = api::AppState {
        store: SettingsStore::new(config.governor_path),
        runtime: RuntimeConfigFile::new(config.runtime_config_path),
        target: config.target,
        write_lock: Arc::new(tokio::sync::Mutex::new(())),
    };
    let router = server::build_router(app_state, config.static_dir);
    server::start_server(router, config.bind_addr).await
}
