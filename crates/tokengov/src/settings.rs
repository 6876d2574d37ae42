//! The governor settings document and its partial-update patch.
//!
//! [`GovernorSettings`] is the canonical document this crate owns. It is
//! serialized with camelCase keys so the file stays readable by the browser
//! panel. [`GovernorPatch`] is the body of a settings update: top-level fields
//! replace wholesale, while [`KnobsPatch`] merges key by key.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::GovernorError;
use crate::level::{Level, LevelCeilings};
use crate::presets::{TaskPreset, default_task_presets};

/// How the active token ceiling is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// The operator's explicit ceiling (or current level) always applies.
    #[default]
    Manual,
    /// The schedule (when enabled) picks the level for the current hour.
    Auto,
}

/// A contiguous hour range `[start, end)` tagged with a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub start: u8,
    pub end: u8,
    pub level: Level,
}

impl Slot {
    pub fn new(start: u8, end: u8, level: Level) -> Self {
        Self { start, end, level }
    }

    /// Whether `hour` falls inside `[start, end)`.
    pub fn contains(&self, hour: u32) -> bool {
        u32::from(self.start) <= hour && hour < u32::from(self.end)
    }
}

/// A day plan: disjoint slots, optionally leaving gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub enabled: bool,
    pub slots: Vec<Slot>,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            enabled: false,
            slots: vec![
                Slot::new(0, 8, Level::Low),
                Slot::new(8, 23, Level::Medium),
                Slot::new(23, 24, Level::Low),
            ],
        }
    }
}

impl Schedule {
    /// Reject inverted, out-of-range, custom-level, or overlapping slots.
    pub fn validate(&self) -> Result<(), GovernorError> {
        for slot in &self.slots {
            if slot.start >= slot.end {
                return Err(GovernorError::Invalid(format!(
                    "slot start {} must be before end {}",
                    slot.start, slot.end
                )));
            }
            if slot.end > 24 {
                return Err(GovernorError::Invalid(format!(
                    "slot end {} is past hour 24",
                    slot.end
                )));
            }
            if !slot.level.is_schedulable() {
                return Err(GovernorError::Invalid(format!(
                    "level '{}' cannot be scheduled",
                    slot.level
                )));
            }
        }

        let mut sorted: Vec<&Slot> = self.slots.iter().collect();
        sorted.sort_by_key(|s| s.start);
        for pair in sorted.windows(2) {
            if pair[1].start < pair[0].end {
                return Err(GovernorError::Invalid(format!(
                    "slots [{}, {}) and [{}, {}) overlap",
                    pair[0].start, pair[0].end, pair[1].start, pair[1].end
                )));
            }
        }
        Ok(())
    }
}

/// Independently tunable inference parameters.
///
/// Missing keys in a stored document load as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Knobs {
    #[serde(default)]
    pub reserve_tokens_floor: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub reasoning: Option<bool>,
    #[serde(default)]
    pub budget_tokens: Option<u32>,
}

impl Default for Knobs {
    fn default() -> Self {
        Self {
            reserve_tokens_floor: Some(20000),
            temperature: None,
            reasoning: Some(false),
            budget_tokens: Some(10000),
        }
    }
}

impl Knobs {
    /// Overlay the keys present in `patch`, keeping the rest.
    pub fn merge(&mut self, patch: KnobsPatch) {
        if let Some(floor) = patch.reserve_tokens_floor {
            self.reserve_tokens_floor = Some(floor);
        }
        if let Some(temperature) = patch.temperature {
            self.temperature = temperature;
        }
        if let Some(reasoning) = patch.reasoning {
            self.reasoning = Some(reasoning);
        }
        if let Some(budget) = patch.budget_tokens {
            self.budget_tokens = Some(budget);
        }
    }

    pub fn reasoning_enabled(&self) -> bool {
        self.reasoning.unwrap_or(false)
    }
}

/// The canonical governor document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GovernorSettings {
    pub mode: Mode,
    pub current_level: Level,
    /// Explicit ceiling for manual mode. Zero counts as unset.
    pub manual_max_tokens: Option<u32>,
    pub levels: LevelCeilings,
    pub schedule: Schedule,
    pub knobs: Knobs,
    pub task_presets: BTreeMap<String, TaskPreset>,
    pub updated_at: DateTime<Utc>,
}

impl Default for GovernorSettings {
    fn default() -> Self {
        Self {
            mode: Mode::Manual,
            current_level: Level::High,
            manual_max_tokens: Some(16384),
            levels: LevelCeilings::default(),
            schedule: Schedule::default(),
            knobs: Knobs::default(),
            task_presets: default_task_presets(),
            updated_at: Utc::now(),
        }
    }
}

impl GovernorSettings {
    /// Apply a partial update in place.
    ///
    /// `mode`, `currentLevel`, `manualMaxTokens` and `schedule` are replaced
    /// wholesale when present; `knobs` is merged key by key. Absent fields are
    /// left untouched.
    pub fn apply(&mut self, patch: GovernorPatch) {
        if let Some(mode) = patch.mode {
            self.mode = mode;
        }
        if let Some(level) = patch.current_level {
            self.current_level = level;
        }
        if let Some(tokens) = patch.manual_max_tokens {
            self.manual_max_tokens = tokens;
        }
        if let Some(schedule) = patch.schedule {
            self.schedule = schedule;
        }
        if let Some(knobs) = patch.knobs {
            self.knobs.merge(knobs);
        }
    }
}

/// Partial update of [`GovernorSettings`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernorPatch {
    pub mode: Option<Mode>,
    pub current_level: Option<Level>,
    /// `Some(None)` clears the manual ceiling so the level governs.
    #[serde(default, deserialize_with = "explicit")]
    pub manual_max_tokens: Option<Option<u32>>,
    pub schedule: Option<Schedule>,
    pub knobs: Option<KnobsPatch>,
}

impl GovernorPatch {
    /// Check the patch before anything is merged or written.
    pub fn validate(&self) -> Result<(), GovernorError> {
        if self.manual_max_tokens == Some(Some(0)) {
            return Err(GovernorError::Invalid(
                "manualMaxTokens must be positive".into(),
            ));
        }
        if let Some(schedule) = &self.schedule {
            schedule.validate()?;
        }
        if let Some(knobs) = &self.knobs {
            knobs.validate()?;
        }
        Ok(())
    }
}

/// Partial update of [`Knobs`]; present keys overwrite, absent keys survive.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnobsPatch {
    pub reserve_tokens_floor: Option<u32>,
    /// `Some(None)` is an explicit `null` and clears the temperature.
    #[serde(default, deserialize_with = "explicit")]
    pub temperature: Option<Option<f64>>,
    pub reasoning: Option<bool>,
    pub budget_tokens: Option<u32>,
}

impl KnobsPatch {
    fn validate(&self) -> Result<(), GovernorError> {
        if let Some(Some(t)) = self.temperature
            && !(0.0..=1.0).contains(&t)
        {
            return Err(GovernorError::Invalid(format!(
                "temperature {t} is outside [0, 1]"
            )));
        }
        if self.budget_tokens == Some(0) {
            return Err(GovernorError::Invalid(
                "budgetTokens must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Deserialize a present field (including `null`) as `Some(..)`, so that a
/// missing field stays `None` through `#[serde(default)]`.
fn explicit<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(json: &str) -> GovernorPatch {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn knob_patch_merges_instead_of_replacing() {
        let mut settings = GovernorSettings::default();
        settings.knobs = Knobs {
            reserve_tokens_floor: Some(20000),
            temperature: None,
            reasoning: Some(false),
            budget_tokens: None,
        };

        settings.apply(patch(r#"{"knobs":{"temperature":0.7}}"#));

        assert_eq!(settings.knobs.reasoning, Some(false));
        assert_eq!(settings.knobs.reserve_tokens_floor, Some(20000));
        assert_eq!(settings.knobs.temperature, Some(0.7));
    }

    #[test]
    fn explicit_null_clears_temperature() {
        let mut settings = GovernorSettings::default();
        settings.knobs.temperature = Some(0.4);

        settings.apply(patch(r#"{"knobs":{"reasoning":true}}"#));
        assert_eq!(settings.knobs.temperature, Some(0.4));

        settings.apply(patch(r#"{"knobs":{"temperature":null}}"#));
        assert_eq!(settings.knobs.temperature, None);
    }

    #[test]
    fn schedule_is_replaced_wholesale() {
        let mut settings = GovernorSettings::default();
        settings.apply(patch(
            r#"{"schedule":{"enabled":true,"slots":[{"start":0,"end":24,"level":"max"}]}}"#,
        ));
        assert!(settings.schedule.enabled);
        assert_eq!(settings.schedule.slots, vec![Slot::new(0, 24, Level::Max)]);
    }

    #[test]
    fn absent_fields_are_untouched() {
        let mut settings = GovernorSettings::default();
        let before = settings.clone();
        settings.apply(patch(r#"{"mode":"auto"}"#));

        assert_eq!(settings.mode, Mode::Auto);
        assert_eq!(settings.current_level, before.current_level);
        assert_eq!(settings.manual_max_tokens, before.manual_max_tokens);
        assert_eq!(settings.schedule, before.schedule);
        assert_eq!(settings.knobs, before.knobs);
    }

    #[test]
    fn default_document_shape() {
        let json = serde_json::to_value(GovernorSettings::default()).unwrap();
        assert_eq!(json["mode"], "manual");
        assert_eq!(json["currentLevel"], "high");
        assert_eq!(json["manualMaxTokens"], 16384);
        assert_eq!(json["levels"]["max"], 128000);
        assert_eq!(json["schedule"]["slots"].as_array().unwrap().len(), 3);
        assert_eq!(json["knobs"]["reserveTokensFloor"], 20000);
        assert!(json["knobs"]["temperature"].is_null());
        assert_eq!(json["knobs"]["reasoning"], false);
        assert_eq!(json["taskPresets"].as_object().unwrap().len(), 6);
        assert!(json["updatedAt"].is_string());
    }

    #[test]
    fn default_schedule_covers_the_day() {
        let schedule = Schedule::default();
        assert!(schedule.validate().is_ok());
        assert_eq!(schedule.slots.first().unwrap().start, 0);
        assert_eq!(schedule.slots.last().unwrap().end, 24);
    }

    #[test]
    fn validate_rejects_bad_slots() {
        let inverted = Schedule {
            enabled: true,
            slots: vec![Slot::new(8, 8, Level::Low)],
        };
        assert!(inverted.validate().is_err());

        let past_midnight = Schedule {
            enabled: true,
            slots: vec![Slot::new(20, 25, Level::Low)],
        };
        assert!(past_midnight.validate().is_err());

        let overlapping = Schedule {
            enabled: true,
            slots: vec![Slot::new(6, 12, Level::Low), Slot::new(0, 7, Level::High)],
        };
        assert!(overlapping.validate().is_err());

        let custom = Schedule {
            enabled: true,
            slots: vec![Slot::new(0, 24, Level::Custom)],
        };
        assert!(custom.validate().is_err());

        let gappy = Schedule {
            enabled: true,
            slots: vec![Slot::new(0, 6, Level::Low), Slot::new(9, 12, Level::High)],
        };
        assert!(gappy.validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_knobs() {
        assert!(patch(r#"{"knobs":{"temperature":1.5}}"#).validate().is_err());
        assert!(patch(r#"{"knobs":{"budgetTokens":0}}"#).validate().is_err());
        assert!(patch(r#"{"manualMaxTokens":0}"#).validate().is_err());
        assert!(patch(r#"{"knobs":{"temperature":null}}"#).validate().is_ok());
        assert!(patch(r#"{"manualMaxTokens":null}"#).validate().is_ok());
    }

    #[test]
    fn patch_rejects_unknown_level() {
        let result = serde_json::from_str::<GovernorPatch>(r#"{"currentLevel":"ultra"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn partial_document_loads_with_defaults() {
        let settings: GovernorSettings =
            serde_json::from_str(r#"{"mode":"auto","knobs":{"reasoning":true}}"#).unwrap();
        assert_eq!(settings.mode, Mode::Auto);
        assert_eq!(settings.knobs.reasoning, Some(true));
        assert_eq!(settings.knobs.reserve_tokens_floor, None);
        assert_eq!(settings.levels, LevelCeilings::default());
    }
}
