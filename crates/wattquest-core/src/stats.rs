//! Aggregate counters projected from the ledgers.

use serde::{Deserialize, Serialize};

use crate::achievement::{Achievement, Badge};
use crate::goal::Goal;
use crate::progress::UserProgress;
use crate::streak::Streak;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamificationStats {
    pub total_achievements: usize,
    pub unlocked_achievements: usize,
    pub total_badges: usize,
    pub earned_badges: usize,
    pub active_streaks: usize,
    pub completed_goals: usize,
    pub total_xp: u64,
    pub current_level: u32,
}

impl GamificationStats {
    /// Recompute every counter; nothing is cached.
    pub fn project(
        achievements: &[Achievement],
        badges: &[Badge],
        streaks: &[Streak],
        goals: &[Goal],
        progress: &UserProgress,
    ) -> Self {
        Self {
            total_achievements: achievements.len(),
            unlocked_achievements: achievements.iter().filter(|a| a.is_unlocked).count(),
            total_badges: badges.len(),
            earned_badges: badges.iter().filter(|b| b.is_earned).count(),
            active_streaks: streaks.iter().filter(|s| s.is_active).count(),
            completed_goals: goals.iter().filter(|g| g.is_completed).count(),
            total_xp: progress.total_xp,
            current_level: progress.level,
        }
    }
}
