//! Token budget governor for LLM agent runtimes.
//!
//! `tokengov` owns a small settings document (mode, current level, manual
//! ceiling, hour-by-hour schedule, inference knobs) and projects the resolved
//! values onto the agent runtime's own JSON config without disturbing the
//! fields it does not own.
//!
//! # Components
//!
//! - [`store::SettingsStore`] loads and saves [`GovernorSettings`], falling
//!   back to a default document when the file is missing or corrupt.
//! - [`schedule`] resolves the active level and token ceiling for a point in
//!   time, and consolidates a painted 24-hour plan into [`Slot`]s.
//! - [`projector`] writes the active ceiling and knobs into the runtime
//!   config, keeping temperature and thinking budget mutually exclusive.
//!
//! # Example
//!
//! ```no_run
//! use tokengov::prelude::*;
//!
//! let store = SettingsStore::new("/home/op/.openclaw/governor.json");
//! let mut settings = store.load();
//! settings.apply(GovernorPatch {
//!     mode: Some(Mode::Auto),
//!     ..Default::default()
//! });
//! store.save(&mut settings)?;
//!
//! let now = chrono::Local::now();
//! let tokens = active_max_tokens(&settings, &now);
//! RuntimeConfigFile::new("/home/op/.openclaw/openclaw.json").apply(
//!     tokens,
//!     &settings.knobs,
//!     &ProjectionTarget::default(),
//! )?;
//! # Ok::<(), tokengov::GovernorError>(())
//! ```

pub mod error;
pub mod level;
pub mod prelude;
pub mod presets;
pub mod projector;
pub mod schedule;
pub mod settings;
pub mod store;

pub use error::GovernorError;
pub use level::{FALLBACK_MAX_TOKENS, Level, LevelCeilings};
pub use presets::{TaskPreset, TemperatureStyle};
pub use settings::{GovernorPatch, GovernorSettings, Knobs, KnobsPatch, Mode, Schedule, Slot};
