//! Convenience re-exports for common `tokengov` types.
//!
//! Meant to be glob-imported by servers and tools built on the governor:
//!
//! ```ignore
//! use tokengov::prelude::*;
//! ```
//!
//! Hour painting ([`HourPlan`](crate::schedule::HourPlan)) and the atomic
//! file helpers are left out; import those from their modules directly.

// ── Settings ────────────────────────────────────────────────────────
pub use crate::error::GovernorError;
pub use crate::level::{FALLBACK_MAX_TOKENS, Level, LevelCeilings};
pub use crate::presets::{TaskPreset, TemperatureStyle};
pub use crate::settings::{GovernorPatch, GovernorSettings, Knobs, KnobsPatch, Mode, Schedule, Slot};
pub use crate::store::{SettingsStore, apply_partial_update};

// ── Resolution ──────────────────────────────────────────────────────
pub use crate::schedule::{Resolution, active_level, active_max_tokens, consolidate, expand};

// ── Projection ──────────────────────────────────────────────────────
pub use crate::projector::{ProjectionTarget, RuntimeConfigFile, RuntimeReadout, project};
