//! Progress ledger: experience points, levels and rank.
//!
//! Each level `L` needs `L * 100` XP to clear. Awards roll over across
//! as many levels as they cover, so after every award
//! `0 <= xp < xp_threshold(level)` holds and `total_xp` only grows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// XP needed per level step.
pub const XP_PER_LEVEL: u64 = 100;

/// XP required to clear `level`.
pub fn xp_threshold(level: u32) -> u64 {
    u64::from(level.max(1)) * XP_PER_LEVEL
}

/// Coarse label derived from the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rank {
    Beginner,
    Apprentice,
    Expert,
    Master,
    Grandmaster,
}

impl Rank {
    pub fn for_level(level: u32) -> Self {
        match level {
            0..=4 => Rank::Beginner,
            5..=9 => Rank::Apprentice,
            10..=19 => Rank::Expert,
            20..=29 => Rank::Master,
            _ => Rank::Grandmaster,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Beginner => "Beginner",
            Rank::Apprentice => "Apprentice",
            Rank::Expert => "Expert",
            Rank::Master => "Master",
            Rank::Grandmaster => "Grandmaster",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single XP award.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpAward {
    pub amount: u32,
    pub level_before: u32,
    pub level_after: u32,
    pub rank_before: Rank,
    pub rank_after: Rank,
    pub total_xp: u64,
}

impl XpAward {
    pub fn leveled_up(&self) -> bool {
        self.level_after > self.level_before
    }

    pub fn rank_changed(&self) -> bool {
        self.rank_after != self.rank_before
    }
}

/// The player's level state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
    pub level: u32,
    /// Progress inside the current level.
    pub xp: u64,
    /// Remaining gap to the next level.
    pub xp_to_next_level: u64,
    /// Lifetime counter.
    pub total_xp: u64,
    pub rank: Rank,
    pub join_date: DateTime<Utc>,
}

impl Default for UserProgress {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl UserProgress {
    pub fn new(join_date: DateTime<Utc>) -> Self {
        Self {
            level: 1,
            xp: 0,
            xp_to_next_level: xp_threshold(1),
            total_xp: 0,
            rank: Rank::Beginner,
            join_date,
        }
    }

    /// Apply an XP award and roll over into as many levels as it covers.
    ///
    /// # Errors
    /// Returns [`ValidationError::NonPositiveXp`] for a zero award.
    pub fn add_xp(&mut self, amount: u32) -> Result<XpAward, ValidationError> {
        if amount == 0 {
            return Err(ValidationError::NonPositiveXp);
        }

        let level_before = self.level;
        let rank_before = self.rank;

        self.total_xp = self.total_xp.saturating_add(u64::from(amount));
        let mut xp = self.xp.saturating_add(u64::from(amount));
        let mut level = self.level.max(1);
        let mut threshold = xp_threshold(level);

        while xp >= threshold {
            xp -= threshold;
            level += 1;
            threshold = xp_threshold(level);
        }

        self.xp = xp;
        self.level = level;
        self.xp_to_next_level = threshold - xp;
        self.rank = Rank::for_level(level);

        Ok(XpAward {
            amount,
            level_before,
            level_after: self.level,
            rank_before,
            rank_after: self.rank,
            total_xp: self.total_xp,
        })
    }

    /// Fraction of the current level already cleared, in `0.0..1.0`.
    pub fn level_progress(&self) -> f64 {
        self.xp as f64 / xp_threshold(self.level) as f64
    }
}
