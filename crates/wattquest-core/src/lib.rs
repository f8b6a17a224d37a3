//! # WattQuest Core Library
//!
//! This library provides the progression engine behind the WattQuest
//! electricity-cost companion: experience points and levels, daily streaks,
//! goals, and achievement/badge unlocks. It follows a CLI-first approach:
//! every operation is reachable from the standalone `wattquest` binary,
//! and any GUI is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Session**: [`GamificationSession`] owns every ledger. Callers hold it
//!   and pass it explicitly; there is no global state.
//! - **Rules**: achievements carry declarative criteria evaluated against
//!   [`ActivityMetrics`] after each metric change.
//! - **Storage**: SQLite snapshot and event history, TOML configuration.
//!
//! ## Key Components
//!
//! - [`UserProgress`]: XP, level and rank
//! - [`Streak`]: consecutive calendar-day tracking
//! - [`Goal`]: targets with deadlines and XP rewards
//! - [`Database`]: session persistence
//! - [`Config`]: application configuration

pub mod achievement;
pub mod error;
pub mod events;
pub mod goal;
pub mod progress;
pub mod session;
pub mod stats;
pub mod storage;
pub mod streak;

pub use achievement::{
    Achievement, AchievementCategory, ActivityMetrics, Badge, BadgeTier, Comparator, Criteria,
    CriteriaKind,
};
pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use events::Event;
pub use goal::{Goal, GoalCategory, GoalTemplate, GoalType, NewGoal};
pub use progress::{xp_threshold, Rank, UserProgress, XpAward};
pub use session::{EngineSettings, GamificationSession, GoalCompletion};
pub use stats::GamificationStats;
pub use storage::{Config, Database};
pub use streak::{Streak, StreakChange};
