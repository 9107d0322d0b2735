//! Week tracker for the 7-day protocol (v0.1.0).
//!
//! The 7-day protocol is laid out as four steps per day, the last of which
//! captures the day's deliverable. `WeekState` is the durable record that
//! lets the protocol pick up again on a later calendar day.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DAYS_IN_WEEK: u8 = 7;
pub const STEPS_PER_DAY: usize = 4;

/// First step index of a day (1-based day)
pub fn day_start_step(day: u8) -> usize {
    usize::from(day.max(1) - 1) * STEPS_PER_DAY
}

/// Step index of the prompt that captures a day's deliverable
pub fn deliverable_step(day: u8) -> usize {
    day_start_step(day) + STEPS_PER_DAY - 1
}

/// Day whose deliverable is captured at `step_index`, if any
pub fn day_for_deliverable(step_index: usize) -> Option<u8> {
    (1..=DAYS_IN_WEEK).find(|day| deliverable_step(*day) == step_index)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayEntry {
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

/// Durable progress through the 7-day protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekState {
    pub project_title: String,
    pub started_at: DateTime<Utc>,
    /// 1..=7 while in progress
    pub current_day: u8,
    #[serde(default)]
    pub days: BTreeMap<u8, DayEntry>,
}

impl WeekState {
    pub fn start(project_title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            project_title: project_title.into(),
            started_at: now,
            current_day: 1,
            days: BTreeMap::new(),
        }
    }

    /// Mark a day done with its deliverable and move to the next day
    pub fn record_day(&mut self, day: u8, result: impl Into<String>) {
        self.days.insert(
            day,
            DayEntry {
                done: true,
                result: Some(result.into()),
            },
        );
        self.current_day = self.current_day.max(day.saturating_add(1));
    }

    pub fn is_in_progress(&self) -> bool {
        (1..=DAYS_IN_WEEK).contains(&self.current_day)
    }

    pub fn days_done(&self) -> usize {
        self.days.values().filter(|d| d.done).count()
    }

    /// Same calendar day (UTC) as the week's start
    pub fn is_same_day(&self, now: DateTime<Utc>) -> bool {
        self.started_at.date_naive() == now.date_naive()
    }
}

/// How a new session should treat an existing week
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resumption {
    /// Nothing to resume
    None,
    /// Resume without asking
    Silent { day: u8, step_index: usize },
    /// Ask before resuming
    AskConsent { day: u8, step_index: usize },
}

/// Decide how to resume a week at session start.
///
/// Crossing a calendar-day boundary always asks first.
pub fn resumption(week: Option<&WeekState>, now: DateTime<Utc>) -> Resumption {
    let Some(week) = week else {
        return Resumption::None;
    };
    if !week.is_in_progress() {
        return Resumption::None;
    }

    let day = week.current_day;
    let step_index = day_start_step(day);
    if week.is_same_day(now) {
        Resumption::Silent { day, step_index }
    } else {
        Resumption::AskConsent { day, step_index }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_day_layout() {
        assert_eq!(day_start_step(1), 0);
        assert_eq!(day_start_step(3), 8);
        assert_eq!(deliverable_step(1), 3);
        assert_eq!(deliverable_step(7), 27);
        assert_eq!(day_for_deliverable(3), Some(1));
        assert_eq!(day_for_deliverable(27), Some(7));
        assert_eq!(day_for_deliverable(26), None);
        assert_eq!(day_for_deliverable(31), None);
    }

    #[test]
    fn test_record_day_moves_forward() {
        let now = Utc.with_ymd_and_hms(2026, 5, 4, 10, 0, 0).unwrap();
        let mut week = WeekState::start("Fanzine", now);
        week.record_day(1, "un fanzine de gatos");
        assert_eq!(week.current_day, 2);
        assert_eq!(week.days_done(), 1);
        assert_eq!(
            week.days.get(&1).and_then(|d| d.result.as_deref()),
            Some("un fanzine de gatos")
        );

        week.record_day(7, "publicarlo");
        assert_eq!(week.current_day, 8);
        assert!(!week.is_in_progress());
    }

    #[test]
    fn test_resumption_none_when_finished_or_missing() {
        let now = Utc.with_ymd_and_hms(2026, 5, 4, 10, 0, 0).unwrap();
        assert_eq!(resumption(None, now), Resumption::None);

        let mut week = WeekState::start("x", now);
        week.current_day = 8;
        assert_eq!(resumption(Some(&week), now), Resumption::None);
    }

    #[test]
    fn test_resumption_late_same_day_is_silent() {
        let start = Utc.with_ymd_and_hms(2026, 5, 4, 0, 5, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 5, 4, 23, 55, 0).unwrap();
        let week = WeekState::start("x", start);
        assert_eq!(
            resumption(Some(&week), later),
            Resumption::Silent { day: 1, step_index: 0 }
        );
    }

    #[test]
    fn test_resumption_after_midnight_asks() {
        let start = Utc.with_ymd_and_hms(2026, 5, 4, 23, 55, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2026, 5, 5, 0, 5, 0).unwrap();
        let week = WeekState::start("x", start);
        assert_eq!(
            resumption(Some(&week), after),
            Resumption::AskConsent { day: 1, step_index: 0 }
        );
    }
}
