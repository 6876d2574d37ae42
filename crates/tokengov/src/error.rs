//! Error taxonomy for the governor.
//!
//! A missing or corrupt settings file is not an error: [`SettingsStore::load`]
//! recovers with the default document. Everything else that can go wrong is a
//! [`GovernorError`], and the variants keep the two persisted documents apart
//! so a caller can report which one failed.
//!
//! [`SettingsStore::load`]: crate::store::SettingsStore::load

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while validating or persisting governor state.
#[derive(Debug, Error)]
pub enum GovernorError {
    /// The governor settings document could not be written.
    #[error("failed to write governor settings to {path}: {message}")]
    StoreWrite { path: PathBuf, message: String },

    /// The agent runtime config could not be read or parsed.
    #[error("failed to read runtime config {path}: {message}")]
    RuntimeRead { path: PathBuf, message: String },

    /// The agent runtime config could not be written.
    #[error("failed to write runtime config {path}: {message}")]
    RuntimeWrite { path: PathBuf, message: String },

    /// A section the projector has to descend into holds a non-object value.
    ///
    /// The runtime config is left as it was rather than overwriting data the
    /// governor does not own.
    #[error("runtime config field `{field}` is not an object")]
    RuntimeShape { field: String },

    /// A patch or schedule was rejected before anything was written.
    #[error("invalid settings: {0}")]
    Invalid(String),
}

impl GovernorError {
    /// Whether this error came from the runtime-config half of an update.
    ///
    /// When true, the governor settings were already committed.
    pub fn is_projection(&self) -> bool {
        matches!(
            self,
            GovernorError::RuntimeRead { .. }
                | GovernorError::RuntimeWrite { .. }
                | GovernorError::RuntimeShape { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_errors_are_distinguished() {
        let read = GovernorError::RuntimeRead {
            path: "/tmp/openclaw.json".into(),
            message: "missing".into(),
        };
        let store = GovernorError::StoreWrite {
            path: "/tmp/governor.json".into(),
            message: "read-only".into(),
        };
        assert!(read.is_projection());
        assert!(
            GovernorError::RuntimeShape {
                field: "agents.defaults".into()
            }
            .is_projection()
        );
        assert!(!store.is_projection());
        assert!(!GovernorError::Invalid("x".into()).is_projection());
    }

    #[test]
    fn messages_name_the_file() {
        let err = GovernorError::RuntimeWrite {
            path: "/etc/openclaw.json".into(),
            message: "permission denied".into(),
        };
        let text = err.to_string();
        assert!(text.contains("/etc/openclaw.json"));
        assert!(text.contains("permission denied"));
    }
}
