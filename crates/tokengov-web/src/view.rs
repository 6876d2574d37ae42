//! Serializable responses for the REST API.
//!
//! [`GovernorView`] is the stored settings document flattened together with
//! values computed at request time (active ceiling and level) and the values
//! mirrored from the runtime config. It is what the panel renders.

use chrono::Timelike;
use serde::Serialize;
use tokengov::projector::RuntimeReadout;
use tokengov::schedule::{active_level, active_max_tokens};
use tokengov::{GovernorSettings, Level, Slot, TemperatureStyle};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernorView {
    #[serde(flatten)]
    pub settings: GovernorSettings,
    pub active_max_tokens: u32,
    pub active_level: Level,
    /// `null` while no temperature is set.
    pub temperature_style: Option<TemperatureStyle>,
    /// Read-through fields; all `null` when the runtime config is unreadable.
    #[serde(flatten)]
    pub runtime: RuntimeReadout,
}

impl GovernorView {
    pub fn new<T: Timelike>(settings: GovernorSettings, now: &T, runtime: RuntimeReadout) -> Self {
        Self {
            active_max_tokens: active_max_tokens(&settings, now),
            active_level: active_level(&settings, now),
            temperature_style: settings.knobs.temperature.map(TemperatureStyle::classify),
            settings,
            runtime,
        }
    }
}

/// Body of every settings update response.
///
/// `ok: false` with HTTP 200 means the settings were saved but the runtime
/// config was not updated.
#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub governor: Option<GovernorView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UpdateResponse {
    pub fn applied(governor: GovernorView) -> Self {
        Self {
            ok: true,
            governor: Some(governor),
            error: None,
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        Self {
            ok: false,
            governor: None,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConsolidateResponse {
    pub slots: Vec<Slot>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use tokengov::Mode;

    #[test]
    fn view_flattens_settings_and_readout() {
        let mut settings = GovernorSettings::default();
        settings.knobs.temperature = Some(0.2);
        let readout = RuntimeReadout {
            config_max_tokens: Some(16384),
            ..Default::default()
        };
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();

        let json = serde_json::to_value(GovernorView::new(settings, &noon, readout)).unwrap();
        assert_eq!(json["mode"], "manual");
        assert_eq!(json["activeMaxTokens"], 16384);
        assert_eq!(json["activeLevel"], "high");
        assert_eq!(json["temperatureStyle"], "focused");
        assert_eq!(json["configMaxTokens"], 16384);
        assert!(json["configTemperature"].is_null());
        assert!(json.get("settings").is_none());
    }

    #[test]
    fn view_reports_scheduled_level() {
        let mut settings = GovernorSettings {
            mode: Mode::Auto,
            ..Default::default()
        };
        settings.schedule.enabled = true;
        let early = NaiveTime::from_hms_opt(3, 0, 0).unwrap();

        let view = GovernorView::new(settings, &early, RuntimeReadout::default());
        assert_eq!(view.active_level, Level::Low);
        assert_eq!(view.active_max_tokens, 4096);
        assert!(view.temperature_style.is_none());
    }

    #[test]
    fn failed_response_omits_governor() {
        let json = serde_json::to_value(UpdateResponse::failed("disk full")).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"], "disk full");
        assert!(json.get("governor").is_none());
    }
}
