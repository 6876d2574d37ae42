//! Named power levels and their token ceilings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Token ceiling used when no level or manual value resolves.
pub const FALLBACK_MAX_TOKENS: u32 = 16384;

/// A named tier mapping to a token ceiling.
///
/// The six schedulable levels are ordered from cheapest to most generous.
/// [`Level::Custom`] marks a hand-tuned manual ceiling and has no entry in
/// [`LevelCeilings`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    #[default]
    Medium,
    High,
    Ssg,
    Ssb,
    Max,
    Custom,
}

impl Level {
    /// The schedulable levels in ascending order.
    pub const ORDERED: [Level; 6] = [
        Level::Low,
        Level::Medium,
        Level::High,
        Level::Ssg,
        Level::Ssb,
        Level::Max,
    ];

    /// The level after this one when cycling an hour in the schedule painter.
    ///
    /// `Max` wraps to `Low`; `Custom` is not schedulable and also goes to `Low`.
    pub fn next(self) -> Level {
        match Self::ORDERED.iter().position(|l| *l == self) {
            Some(i) => Self::ORDERED[(i + 1) % Self::ORDERED.len()],
            None => Level::Low,
        }
    }

    /// Whether the level can appear in a schedule slot.
    pub fn is_schedulable(self) -> bool {
        self != Level::Custom
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Low => "low",
            Level::Medium => "medium",
            Level::High => "high",
            Level::Ssg => "ssg",
            Level::Ssb => "ssb",
            Level::Max => "max",
            Level::Custom => "custom",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token ceiling per schedulable level.
///
/// Always carries exactly the six fixed keys; values are user-adjustable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCeilings {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
    pub ssg: u32,
    pub ssb: u32,
    pub max: u32,
}

impl Default for LevelCeilings {
    fn default() -> Self {
        Self {
            low: 4096,
            medium: 8192,
            high: 16384,
            ssg: 32768,
            ssb: 65536,
            max: 128000,
        }
    }
}

impl LevelCeilings {
    /// Ceiling for `level`, or `None` for [`Level::Custom`] and zero entries.
    pub fn get(&self, level: Level) -> Option<u32> {
        let value = match level {
            Level::Low => self.low,
            Level::Medium => self.medium,
            Level::High => self.high,
            Level::Ssg => self.ssg,
            Level::Ssb => self.ssb,
            Level::Max => self.max,
            Level::Custom => return None,
        };
        (value > 0).then_some(value)
    }
}
