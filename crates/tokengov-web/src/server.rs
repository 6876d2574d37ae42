//! Axum server setup and router construction.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::api::{self, AppState};

/// Build the full axum router.
///
/// The router serves:
/// - the settings API at `/api/governor` (also mounted at `/settings`)
/// - task presets at `/api/governor/presets/{key}`
/// - schedule consolidation at `/api/governor/schedule/consolidate`
/// - optional static files for the browser panel
pub fn build_router(app_state: AppState, static_dir: Option<PathBuf>) -> Router {
    // CORS layer for development (panel served from a different origin).
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/api/governor",
            get(api::get_governor).post(api::post_governor),
        )
        .route("/settings", get(api::get_governor).post(api::post_governor))
        .route("/api/governor/presets/{key}", post(api::post_preset))
        .route(
            "/api/governor/schedule/consolidate",
            post(api::post_consolidate),
        )
        .with_state(app_state);

    let mut router = api_routes.layer(cors);

    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
}

/// Bind the listener, start serving on a Tokio task, and return the bound
/// address.
pub async fn start_server(router: Router, bind_addr: SocketAddr) -> std::io::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!("Server stopped: {e}");
        }
    });

    Ok(addr)
}
