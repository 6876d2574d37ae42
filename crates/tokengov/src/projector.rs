//! Projection of governor settings onto the agent runtime's own config.
//!
//! The runtime config is owned by another program. The governor is a narrow
//! secondary writer: it touches one model entry (`maxTokens`, `reasoning`),
//! that model's default params (`temperature` / `budget_tokens`) and the
//! compaction reserve floor. Every other field passes through unchanged, in
//! its original key order.
//!
//! ```text
//! models.providers.<any>.models[id == model_id]   maxTokens, reasoning
//! agents.defaults.models.<model_key>.params       temperature | budget_tokens
//! agents.defaults.compaction                      reserveTokensFloor
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::GovernorError;
use crate::settings::Knobs;
use crate::store::write_atomically;

/// Model id matched inside the provider groups.
pub const DEFAULT_MODEL_ID: &str = "claude-opus-4-6";
/// Key of the model's entry under `agents.defaults.models`.
pub const DEFAULT_MODEL_KEY: &str = "anthropic/claude-opus-4-6";

/// Which model the projector writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionTarget {
    /// Matched against `id` in `models.providers.*.models[]`.
    pub model_id: String,
    /// Key under `agents.defaults.models`.
    pub model_key: String,
}

impl Default for ProjectionTarget {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            model_key: DEFAULT_MODEL_KEY.to_string(),
        }
    }
}

/// Apply the active ceiling and knobs to `runtime` in place.
///
/// The caller's map is the one mutated; clone it first if the original must
/// be kept. A missing model entry is not an error: the model fields are
/// skipped and the params and compaction sections are still written.
///
/// Fails with [`GovernorError::RuntimeShape`] when a section on the params or
/// compaction path holds something other than an object. The map may then be
/// partly updated, so it must not be written back.
pub fn project(
    runtime: &mut Map<String, Value>,
    active_max_tokens: u32,
    knobs: &Knobs,
    target: &ProjectionTarget,
) -> Result<(), GovernorError> {
    match find_model_mut(runtime, &target.model_id) {
        Some(model) => {
            model.insert("maxTokens".into(), active_max_tokens.into());
            // Temperature belongs in agents.defaults params, not on the model.
            model.remove("temperature");
            if let Some(reasoning) = knobs.reasoning {
                model.insert("reasoning".into(), reasoning.into());
            }
        }
        None => debug!(
            "Model '{}' not found in runtime config, skipping model fields",
            target.model_id
        ),
    }

    let agents = child_object(runtime, "agents", "agents")?;
    let defaults = child_object(agents, "defaults", "agents.defaults")?;

    let models = child_object(defaults, "models", "agents.defaults.models")?;
    let entry_field = format!("agents.defaults.models.{}", target.model_key);
    let model_entry = child_object(models, &target.model_key, &entry_field)?;
    let params = child_object(model_entry, "params", &format!("{entry_field}.params"))?;
    // Some backends reject temperature and a thinking budget together.
    if knobs.reasoning_enabled() {
        params.remove("temperature");
        if let Some(budget) = knobs.budget_tokens {
            params.insert("budget_tokens".into(), budget.into());
        }
    } else {
        if let Some(temperature) = knobs.temperature {
            params.insert("temperature".into(), temperature.into());
        }
        params.remove("budget_tokens");
    }

    let compaction = child_object(defaults, "compaction", "agents.defaults.compaction")?;
    if let Some(floor) = knobs.reserve_tokens_floor {
        compaction.insert("reserveTokensFloor".into(), floor.into());
    }
    Ok(())
}

/// Values currently configured in the runtime config, mirrored back to the
/// panel so the operator can see what the runtime will actually use.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeReadout {
    pub config_max_tokens: Option<u64>,
    pub config_temperature: Option<f64>,
    pub reasoning_enabled: Option<bool>,
    pub config_budget_tokens: Option<u64>,
    pub config_reserve_floor: Option<u64>,
}

impl RuntimeReadout {
    pub fn from_config(runtime: &Map<String, Value>, target: &ProjectionTarget) -> Self {
        let model = find_model(runtime, &target.model_id);
        let params = runtime
            .get("agents")
            .and_then(|a| a.get("defaults"))
            .and_then(|d| d.get("models"))
            .and_then(|m| m.get(&target.model_key))
            .and_then(|m| m.get("params"));
        let floor = runtime
            .get("agents")
            .and_then(|a| a.get("defaults"))
            .and_then(|d| d.get("compaction"))
            .and_then(|c| c.get("reserveTokensFloor"));

        Self {
            config_max_tokens: model
                .and_then(|m| m.get("maxTokens"))
                .and_then(Value::as_u64)
                .filter(|t| *t > 0),
            config_temperature: params
                .and_then(|p| p.get("temperature"))
                .and_then(Value::as_f64),
            reasoning_enabled: Some(
                model
                    .and_then(|m| m.get("reasoning"))
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            ),
            config_budget_tokens: params
                .and_then(|p| p.get("budget_tokens"))
                .and_then(Value::as_u64),
            config_reserve_floor: floor.and_then(Value::as_u64).filter(|f| *f > 0),
        }
    }
}

/// The runtime config document on disk.
#[derive(Debug, Clone)]
pub struct RuntimeConfigFile {
    path: PathBuf,
}

impl RuntimeConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the document. The top level must be a JSON object.
    pub fn read(&self) -> Result<Map<String, Value>, GovernorError> {
        let data = std::fs::read_to_string(&self.path).map_err(|e| self.read_error(e))?;
        match serde_json::from_str::<Value>(&data).map_err(|e| self.read_error(e))? {
            Value::Object(map) => Ok(map),
            _ => Err(self.read_error("top level is not a JSON object")),
        }
    }

    /// Pretty-print and atomically replace the document.
    pub fn write(&self, runtime: &Map<String, Value>) -> Result<(), GovernorError> {
        let data = serde_json::to_string_pretty(runtime).map_err(|e| self.write_error(e))?;
        write_atomically(&self.path, &data).map_err(|e| self.write_error(e))
    }

    /// Read, [`project`], and write back. Returns the written document.
    ///
    /// If projection fails the file is not touched.
    pub fn apply(
        &self,
        active_max_tokens: u32,
        knobs: &Knobs,
        target: &ProjectionTarget,
    ) -> Result<Map<String, Value>, GovernorError> {
        let mut runtime = self.read()?;
        project(&mut runtime, active_max_tokens, knobs, target)?;
        self.write(&runtime)?;
        debug!(
            "Projected maxTokens={active_max_tokens} onto {}",
            self.path.display()
        );
        Ok(runtime)
    }

    fn read_error(&self, e: impl std::fmt::Display) -> GovernorError {
        GovernorError::RuntimeRead {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }

    fn write_error(&self, e: impl std::fmt::Display) -> GovernorError {
        GovernorError::RuntimeWrite {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }
}

fn find_model<'a>(runtime: &'a Map<String, Value>, model_id: &str) -> Option<&'a Value> {
    runtime
        .get("models")?
        .get("providers")?
        .as_object()?
        .values()
        .filter_map(|provider| provider.get("models").and_then(Value::as_array))
        .flatten()
        .find(|model| model.get("id").and_then(Value::as_str) == Some(model_id))
}

fn find_model_mut<'a>(
    runtime: &'a mut Map<String, Value>,
    model_id: &str,
) -> Option<&'a mut Map<String, Value>> {
    runtime
        .get_mut("models")?
        .get_mut("providers")?
        .as_object_mut()?
        .values_mut()
        .filter_map(|provider| provider.get_mut("models").and_then(Value::as_array_mut))
        .flatten()
        .filter_map(Value::as_object_mut)
        .find(|model| model.get("id").and_then(Value::as_str) == Some(model_id))
}

/// The object under `key`, created if missing. `field` names it in errors.
fn child_object<'a>(
    parent: &'a mut Map<String, Value>,
    key: &str,
    field: &str,
) -> Result<&'a mut Map<String, Value>, GovernorError> {
    match parent
        .entry(key)
        .or_insert_with(|| Value::Object(Map::new()))
    {
        Value::Object(map) => Ok(map),
        _ => Err(GovernorError::RuntimeShape {
            field: field.to_string(),
        }),
    }
}
