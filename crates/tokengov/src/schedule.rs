//! Schedule resolution and consolidation.
//!
//! Resolution answers "which level governs this hour" and "what token ceiling
//! applies right now". Consolidation turns a painted 24-hour plan into the
//! minimal list of contiguous [`Slot`]s that is stored in the settings.

use chrono::Timelike;

use crate::level::{FALLBACK_MAX_TOKENS, Level};
use crate::settings::{GovernorSettings, Mode, Schedule, Slot};

/// Hours in a schedule day.
pub const HOURS_PER_DAY: usize = 24;

/// The three ways the active level can be chosen.
///
/// `Manual` always wins, whatever the schedule's `enabled` flag says.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Manual mode: explicit ceiling, then current level.
    ManualFixed,
    /// Auto mode with the schedule enabled: the slot for the hour decides.
    AutoScheduled,
    /// Auto mode with the schedule disabled: the current level decides.
    AutoFixedLevel,
}

impl Resolution {
    pub fn of(settings: &GovernorSettings) -> Self {
        match (settings.mode, settings.schedule.enabled) {
            (Mode::Manual, _) => Resolution::ManualFixed,
            (Mode::Auto, true) => Resolution::AutoScheduled,
            (Mode::Auto, false) => Resolution::AutoFixedLevel,
        }
    }
}

/// The level governing the hour of `now`.
///
/// In auto-scheduled mode an hour not covered by any slot falls back to
/// `currentLevel`.
pub fn active_level<T: Timelike>(settings: &GovernorSettings, now: &T) -> Level {
    match Resolution::of(settings) {
        Resolution::ManualFixed | Resolution::AutoFixedLevel => settings.current_level,
        Resolution::AutoScheduled => slot_level(&settings.schedule, now.hour())
            .unwrap_or(settings.current_level),
    }
}

/// The token ceiling in force at `now`.
pub fn active_max_tokens<T: Timelike>(settings: &GovernorSettings, now: &T) -> u32 {
    match Resolution::of(settings) {
        Resolution::ManualFixed => settings
            .manual_max_tokens
            .filter(|t| *t > 0)
            .or_else(|| settings.levels.get(settings.current_level))
            .unwrap_or(FALLBACK_MAX_TOKENS),
        Resolution::AutoScheduled | Resolution::AutoFixedLevel => settings
            .levels
            .get(active_level(settings, now))
            .unwrap_or(FALLBACK_MAX_TOKENS),
    }
}

fn slot_level(schedule: &Schedule, hour: u32) -> Option<Level> {
    schedule
        .slots
        .iter()
        .find(|slot| slot.contains(hour))
        .map(|slot| slot.level)
}

/// Group a painted day into the minimal list of contiguous slots.
///
/// Missing entries (and hours past the end of `hour_levels`) count as
/// `medium`. An empty input yields a single whole-day `medium` slot. The
/// result always covers `[0, 24)` in ascending order, and no two adjacent
/// slots share a level.
pub fn consolidate(hour_levels: &[Option<Level>]) -> Vec<Slot> {
    if hour_levels.is_empty() {
        return vec![Slot::new(0, HOURS_PER_DAY as u8, Level::Medium)];
    }

    let level_at = |hour: usize| {
        hour_levels
            .get(hour)
            .copied()
            .flatten()
            .unwrap_or(Level::Medium)
    };

    let mut slots = Vec::new();
    let mut start = 0;
    let mut current = level_at(0);
    for hour in 1..HOURS_PER_DAY {
        let level = level_at(hour);
        if level != current {
            slots.push(Slot::new(start as u8, hour as u8, current));
            start = hour;
            current = level;
        }
    }
    slots.push(Slot::new(start as u8, HOURS_PER_DAY as u8, current));
    slots
}

/// Paint `slots` onto a day that starts out all `medium`.
///
/// Hours past 24 are ignored; later slots overwrite earlier ones.
pub fn expand(slots: &[Slot]) -> [Level; HOURS_PER_DAY] {
    let mut hours = [Level::Medium; HOURS_PER_DAY];
    for slot in slots {
        let span = hours
            .iter_mut()
            .take(usize::from(slot.end))
            .skip(usize::from(slot.start));
        for hour in span {
            *hour = slot.level;
        }
    }
    hours
}

/// An hour-by-hour plan being painted by an operator.
///
/// Owned by whoever is editing; it never touches the stored settings until
/// its consolidated slots are submitted as a schedule patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourPlan {
    hours: [Level; HOURS_PER_DAY],
}

impl Default for HourPlan {
    fn default() -> Self {
        Self {
            hours: [Level::Medium; HOURS_PER_DAY],
        }
    }
}

impl HourPlan {
    pub fn from_schedule(schedule: &Schedule) -> Self {
        Self {
            hours: expand(&schedule.slots),
        }
    }

    pub fn levels(&self) -> &[Level; HOURS_PER_DAY] {
        &self.hours
    }

    /// Level planned for `hour`, or `None` past the end of the day.
    pub fn get(&self, hour: usize) -> Option<Level> {
        self.hours.get(hour).copied()
    }

    /// Advance `hour` to the next level and return it.
    pub fn cycle(&mut self, hour: usize) -> Option<Level> {
        let slot = self.hours.get_mut(hour)?;
        *slot = slot.next();
        Some(*slot)
    }

    /// Set `hour` to `level`. Returns false for out-of-range hours and
    /// unschedulable levels.
    pub fn set(&mut self, hour: usize, level: Level) -> bool {
        match self.hours.get_mut(hour) {
            Some(slot) if level.is_schedulable() => {
                *slot = level;
                true
            }
            _ => false,
        }
    }

    pub fn to_slots(&self) -> Vec<Slot> {
        let hours: Vec<Option<Level>> = self.hours.iter().copied().map(Some).collect();
        consolidate(&hours)
    }
}
