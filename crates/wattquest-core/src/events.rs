use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::progress::Rank;
use crate::streak::StreakChange;

/// Every state change in the engine produces an Event.
/// Callers drain them after each operation; the CLI persists them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    XpAwarded {
        amount: u32,
        reason: String,
        total_xp: u64,
        at: DateTime<Utc>,
    },
    LeveledUp {
        from_level: u32,
        to_level: u32,
        rank: Rank,
        at: DateTime<Utc>,
    },
    GoalAdded {
        goal_id: String,
        title: String,
        at: DateTime<Utc>,
    },
    GoalProgressed {
        goal_id: String,
        current: f64,
        target: f64,
        at: DateTime<Utc>,
    },
    GoalCompleted {
        goal_id: String,
        xp_reward: u32,
        at: DateTime<Utc>,
    },
    /// Deadline passed before completion.
    GoalExpired {
        goal_id: String,
        at: DateTime<Utc>,
    },
    GoalDeleted {
        goal_id: String,
        at: DateTime<Utc>,
    },
    StreakUpdated {
        streak_id: String,
        change: StreakChange,
        current_streak: u32,
        longest_streak: u32,
        at: DateTime<Utc>,
    },
    /// Streak lapsed and went inactive.
    StreakLapsed {
        streak_id: String,
        at: DateTime<Utc>,
    },
    AchievementUnlocked {
        achievement_id: String,
        xp_reward: u32,
        at: DateTime<Utc>,
    },
    BadgeEarned {
        badge_id: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Short machine name, used as the storage key.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::XpAwarded { .. } => "xp_awarded",
            Event::LeveledUp { .. } => "leveled_up",
            Event::GoalAdded { .. } => "goal_added",
            Event::GoalProgressed { .. } => "goal_progressed",
            Event::GoalCompleted { .. } => "goal_completed",
            Event::GoalExpired { .. } => "goal_expired",
            Event::GoalDeleted { .. } => "goal_deleted",
            Event::StreakUpdated { .. } => "streak_updated",
            Event::StreakLapsed { .. } => "streak_lapsed",
            Event::AchievementUnlocked { .. } => "achievement_unlocked",
            Event::BadgeEarned { .. } => "badge_earned",
        }
    }

    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::XpAwarded { at, .. }
            | Event::LeveledUp { at, .. }
            | Event::GoalAdded { at, .. }
            | Event::GoalProgressed { at, .. }
            | Event::GoalCompleted { at, .. }
            | Event::GoalExpired { at, .. }
            | Event::GoalDeleted { at, .. }
            | Event::StreakUpdated { at, .. }
            | Event::StreakLapsed { at, .. }
            | Event::AchievementUnlocked { at, .. }
            | Event::BadgeEarned { at, .. } => *at,
        }
    }
}
