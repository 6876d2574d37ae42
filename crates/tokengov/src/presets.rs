//! Task presets: one-click combinations of level, temperature and reasoning.
//!
//! Presets are read-only reference data stored alongside the settings. A
//! preset is applied by turning it into an ordinary [`GovernorPatch`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::level::Level;
use crate::settings::{GovernorPatch, KnobsPatch};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPreset {
    pub level: Level,
    pub temperature: f64,
    pub reasoning: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_tokens: Option<u32>,
    pub name: String,
    pub desc: String,
}

impl TaskPreset {
    fn new(level: Level, temperature: f64, name: &str, desc: &str) -> Self {
        Self {
            level,
            temperature,
            reasoning: false,
            budget_tokens: None,
            name: name.to_string(),
            desc: desc.to_string(),
        }
    }

    fn thinking(level: Level, budget_tokens: u32, name: &str, desc: &str) -> Self {
        Self {
            reasoning: true,
            budget_tokens: Some(budget_tokens),
            ..Self::new(level, 1.0, name, desc)
        }
    }

    /// The settings update that selects this preset.
    ///
    /// The manual ceiling is cleared so the preset's level ceiling governs.
    /// Reasoning presets carry a budget and leave temperature alone (it is
    /// not projected while reasoning is on); the others set the temperature.
    pub fn to_patch(&self) -> GovernorPatch {
        let knobs = if self.reasoning {
            KnobsPatch {
                reasoning: Some(true),
                budget_tokens: self.budget_tokens,
                ..Default::default()
            }
        } else {
            KnobsPatch {
                reasoning: Some(false),
                temperature: Some(Some(self.temperature)),
                ..Default::default()
            }
        };
        GovernorPatch {
            current_level: Some(self.level),
            manual_max_tokens: Some(None),
            knobs: Some(knobs),
            ..Default::default()
        }
    }
}

/// The presets shipped in a fresh settings document.
pub fn default_task_presets() -> BTreeMap<String, TaskPreset> {
    BTreeMap::from([
        (
            "code".to_string(),
            TaskPreset::new(Level::Medium, 0.3, "💻 Code", "Precise coding"),
        ),
        (
            "creativity".to_string(),
            TaskPreset::thinking(
                Level::High,
                12000,
                "🎨 Creative",
                "Writing & content (thinking)",
            ),
        ),
        (
            "pm".to_string(),
            TaskPreset::new(Level::Low, 0.5, "📋 PM", "Project management"),
        ),
        (
            "planning".to_string(),
            TaskPreset::thinking(
                Level::Ssg,
                10000,
                "🏗️ Planning",
                "Architecture design (thinking)",
            ),
        ),
        (
            "brainstorm".to_string(),
            TaskPreset::thinking(
                Level::High,
                15000,
                "💡 Brainstorm",
                "Wild ideation (thinking)",
            ),
        ),
        (
            "debug".to_string(),
            TaskPreset::thinking(Level::Ssb, 20000, "🐛 Debug", "Deep analysis (thinking)"),
        ),
    ])
}

/// Coarse description of a sampling temperature, shown next to the slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureStyle {
    Focused,
    Balanced,
    Creative,
}

impl TemperatureStyle {
    pub fn classify(temperature: f64) -> Self {
        if temperature <= 0.3 {
            TemperatureStyle::Focused
        } else if temperature <= 0.6 {
            TemperatureStyle::Balanced
        } else {
            TemperatureStyle::Creative
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GovernorSettings;

    #[test]
    fn defaults_include_all_presets() {
        let presets = default_task_presets();
        let keys: Vec<&str> = presets.keys().map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            vec!["brainstorm", "code", "creativity", "debug", "planning", "pm"]
        );
        assert_eq!(presets["debug"].budget_tokens, Some(20000));
        assert!(presets["code"].budget_tokens.is_none());
    }

    #[test]
    fn reasoning_preset_sets_budget_and_keeps_temperature() {
        let mut settings = GovernorSettings::default();
        settings.knobs.temperature = Some(0.2);

        let preset = settings.task_presets["planning"].clone();
        settings.apply(preset.to_patch());

        assert_eq!(settings.current_level, Level::Ssg);
        assert_eq!(settings.manual_max_tokens, None);
        assert_eq!(settings.knobs.reasoning, Some(true));
        assert_eq!(settings.knobs.budget_tokens, Some(10000));
        assert_eq!(settings.knobs.temperature, Some(0.2));
    }

    #[test]
    fn plain_preset_sets_temperature_and_disables_reasoning() {
        let mut settings = GovernorSettings::default();
        settings.knobs.reasoning = Some(true);

        let preset = settings.task_presets["pm"].clone();
        settings.apply(preset.to_patch());

        assert_eq!(settings.current_level, Level::Low);
        assert_eq!(settings.knobs.reasoning, Some(false));
        assert_eq!(settings.knobs.temperature, Some(0.5));
    }

    #[test]
    fn preset_serializes_without_absent_budget() {
        let json = serde_json::to_value(&default_task_presets()["code"]).unwrap();
        assert!(json.get("budgetTokens").is_none());
        assert_eq!(json["level"], "medium");
    }

    #[test]
    fn temperature_style_thresholds() {
        assert_eq!(TemperatureStyle::classify(0.0), TemperatureStyle::Focused);
        assert_eq!(TemperatureStyle::classify(0.3), TemperatureStyle::Focused);
        assert_eq!(TemperatureStyle::classify(0.5), TemperatureStyle::Balanced);
        assert_eq!(TemperatureStyle::classify(0.6), TemperatureStyle::Balanced);
        assert_eq!(TemperatureStyle::classify(1.0), TemperatureStyle::Creative);
    }
}
