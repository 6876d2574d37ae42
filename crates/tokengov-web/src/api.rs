//! REST API endpoint handlers.
//!
//! Every update is a synchronous read-modify-write over two files: the
//! governor settings first, then the runtime config. There is no transaction
//! across them, so the response says which one failed.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::Local;
use serde::Deserialize;
use tokengov::projector::{ProjectionTarget, RuntimeConfigFile, RuntimeReadout};
use tokengov::schedule::{active_max_tokens, consolidate};
use tokengov::store::SettingsStore;
use tokengov::{GovernorError, GovernorPatch, Level};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::view::{ConsolidateResponse, GovernorView, UpdateResponse};

/// Shared application state passed to all handlers via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub store: SettingsStore,
    pub runtime: RuntimeConfigFile,
    pub target: ProjectionTarget,
    /// Serializes read-modify-write cycles across concurrent requests.
    pub write_lock: Arc<Mutex<()>>,
}

/// GET /api/governor — Settings plus computed and mirrored fields.
///
/// An unreadable runtime config is logged and leaves the mirrored fields null.
pub async fn get_governor(State(app): State<AppState>) -> Json<GovernorView> {
    let settings = app.store.load();
    let readout = match app.runtime.read() {
        Ok(runtime) => RuntimeReadout::from_config(&runtime, &app.target),
        Err(e) => {
            warn!("Failed to read runtime config: {e}");
            RuntimeReadout::default()
        }
    };
    Json(GovernorView::new(settings, &Local::now(), readout))
}

/// POST /api/governor — Apply a partial settings update.
///
/// Returns 200 `{ok:true, governor}` when both documents were written,
/// 200 `{ok:false, error}` when only the settings were, 500 when the
/// settings write failed and 400 for an invalid or unparseable patch.
pub async fn post_governor(
    State(app): State<AppState>,
    body: Result<Json<GovernorPatch>, JsonRejection>,
) -> (StatusCode, Json<UpdateResponse>) {
    match body {
        Ok(Json(patch)) => update(&app, patch).await,
        Err(rejection) => bad_body(rejection),
    }
}

/// POST /api/governor/presets/{key} — Apply a task preset.
///
/// Returns 404 if the preset is not defined in the settings document.
pub async fn post_preset(
    State(app): State<AppState>,
    Path(key): Path<String>,
) -> (StatusCode, Json<UpdateResponse>) {
    let preset = app.store.load().task_presets.remove(&key);
    match preset {
        Some(preset) => {
            info!("Applying task preset '{key}' ({})", preset.name);
            update(&app, preset.to_patch()).await
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(UpdateResponse::failed(format!("unknown task preset '{key}'"))),
        ),
    }
}

/// Request body for POST /api/governor/schedule/consolidate.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidateRequest {
    #[serde(default)]
    pub hour_levels: Vec<Option<Level>>,
}

/// POST /api/governor/schedule/consolidate — Turn a painted day into slots.
///
/// Nothing is stored; the slots are meant to be sent back in a schedule patch.
pub async fn post_consolidate(
    body: Result<Json<ConsolidateRequest>, JsonRejection>,
) -> Result<Json<ConsolidateResponse>, (StatusCode, Json<UpdateResponse>)> {
    let Json(body) = body.map_err(bad_body)?;
    Ok(Json(ConsolidateResponse {
        slots: consolidate(&body.hour_levels),
    }))
}

/// A body axum could not parse, reported as JSON like every other failure.
fn bad_body(rejection: JsonRejection) -> (StatusCode, Json<UpdateResponse>) {
    let message = rejection.body_text();
    warn!("Rejected request body: {message}");
    (StatusCode::BAD_REQUEST, Json(UpdateResponse::failed(message)))
}

async fn update(app: &AppState, patch: GovernorPatch) -> (StatusCode, Json<UpdateResponse>) {
    if let Err(e) = patch.validate() {
        return (StatusCode::BAD_REQUEST, Json(UpdateResponse::failed(e)));
    }

    let _guard = app.write_lock.lock().await;

    let mut settings = app.store.load();
    settings.apply(patch);
    if let Err(e) = app.store.save(&mut settings) {
        error!("Governor save error: {e}");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(UpdateResponse::failed(e)),
        );
    }

    let now = Local::now();
    let tokens = active_max_tokens(&settings, &now);
    match app.runtime.apply(tokens, &settings.knobs, &app.target) {
        Ok(runtime) => {
            info!(
                "Applied governor settings: mode={:?} level={} maxTokens={tokens}",
                settings.mode, settings.current_level
            );
            let readout = RuntimeReadout::from_config(&runtime, &app.target);
            (
                StatusCode::OK,
                Json(UpdateResponse::applied(GovernorView::new(
                    settings, &now, readout,
                ))),
            )
        }
        Err(e) => {
            error!("Failed to update runtime config: {e}");
            (StatusCode::OK, Json(UpdateResponse::failed(projection_message(&e))))
        }
    }
}

fn projection_message(e: &GovernorError) -> String {
    format!("settings saved, but {e}")
}
