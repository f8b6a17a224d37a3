//! Consecutive-day streak tracking.
//!
//! Continuity is judged on calendar dates in the caller's local time,
//! never on elapsed durations: an action at 23:59 followed by one at
//! 00:01 is two consecutive days, and two actions 30 hours apart on
//! non-adjacent dates break the streak.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// How a [`Streak::record`] call changed the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakChange {
    /// First ever action.
    Started,
    /// Action on the day after the previous one.
    Extended,
    /// Another action on a day already counted.
    SameDay,
    /// A gap of two or more days; counting restarts at 1.
    Reset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Streak {
    pub id: String,
    pub name: String,
    pub description: String,
    pub current_streak: u32,
    /// High-water mark, never decreases.
    pub longest_streak: u32,
    #[serde(default)]
    pub last_action_at: Option<DateTime<Utc>>,
    /// Local calendar date of the last action.
    #[serde(default)]
    pub last_action_date: Option<NaiveDate>,
    pub is_active: bool,
    pub icon_name: String,
    pub color: String,
}

impl Streak {
    pub fn new(id: &str, name: &str, description: &str, icon_name: &str, color: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            current_streak: 0,
            longest_streak: 0,
            last_action_at: None,
            last_action_date: None,
            is_active: false,
            icon_name: icon_name.to_string(),
            color: color.to_string(),
        }
    }

    /// Record an action performed on local date `today` at instant `at`.
    pub fn record(&mut self, today: NaiveDate, at: DateTime<Utc>) -> StreakChange {
        let change = match self.last_action_date {
            None => {
                self.current_streak = 1;
                StreakChange::Started
            }
            Some(last) => match (today - last).num_days() {
                1 => {
                    self.current_streak += 1;
                    StreakChange::Extended
                }
                // Same day, or a last action dated after `today` (clock skew).
                d if d <= 0 => StreakChange::SameDay,
                _ => {
                    self.current_streak = 1;
                    StreakChange::Reset
                }
            },
        };

        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.last_action_at = Some(at);
        // Keep the later date so a skewed clock can't rewind the streak.
        self.last_action_date = Some(self.last_action_date.map_or(today, |d| d.max(today)));
        self.is_active = true;
        change
    }

    /// True while the next action on `today` would still extend the streak.
    pub fn is_alive_on(&self, today: NaiveDate) -> bool {
        self.last_action_date
            .map(|last| (today - last).num_days() <= 1)
            .unwrap_or(false)
    }

    /// Deactivate a lapsed streak. Returns true when the flag flipped.
    ///
    /// The count is left alone; the next [`record`](Self::record) resets it.
    pub fn refresh(&mut self, today: NaiveDate) -> bool {
        if self.is_active && !self.is_alive_on(today) {
            self.is_active = false;
            return true;
        }
        false
    }
}

/// Built-in streaks every session starts with.
pub fn default_streaks() -> Vec<Streak> {
    vec![
        Streak::new(
            DAILY_USAGE,
            "Daily Check-in",
            "Open the app daily",
            "calendar",
            "#2563EB",
        ),
        Streak::new(
            CALCULATION_STREAK,
            "Calculation Streak",
            "Perform calculations daily",
            "calculator",
            "#10B981",
        ),
        Streak::new(
            GOAL_STREAK,
            "Goal Completion",
            "Complete goals consistently",
            "target",
            "#8B5CF6",
        ),
    ]
}

pub const DAILY_USAGE: &str = "daily_usage";
pub const CALCULATION_STREAK: &str = "calculation_streak";
pub const GOAL_STREAK: &str = "goal_streak";
