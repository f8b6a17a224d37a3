//! Achievement and badge catalogs, plus the declarative unlock rules.
//!
//! Both kinds of award are one-way flags: once unlocked (or earned) they
//! stay that way. Achievements carry a [`Criteria`] that the evaluator in
//! [`Criteria::evaluate`] checks against an [`ActivityMetrics`] snapshot;
//! badges only carry free-text requirements and are earned explicitly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementCategory {
    Milestone,
    Behavior,
    Time,
    Savings,
}

/// The metric a criteria reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriteriaKind {
    Calculations,
    Savings,
    StreakDays,
    AppliancesTracked,
    GoalsCompleted,
}

/// How the metric is compared with the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    #[default]
    AtLeast,
    Exactly,
}

impl Comparator {
    pub fn holds(&self, value: f64, target: f64) -> bool {
        match self {
            Comparator::AtLeast => value >= target,
            Comparator::Exactly => (value - target).abs() < f64::EPSILON,
        }
    }
}

/// Counters the rule evaluator reads from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityMetrics {
    pub calculations: u64,
    /// Monthly savings in the user's currency.
    pub savings: f64,
    /// Current daily-usage streak; zero once it has lapsed.
    pub streak_days: u32,
    pub appliances_tracked: u32,
    pub goals_completed: u32,
}

impl ActivityMetrics {
    pub fn value_of(&self, kind: CriteriaKind) -> f64 {
        match kind {
            CriteriaKind::Calculations => self.calculations as f64,
            CriteriaKind::Savings => self.savings,
            CriteriaKind::StreakDays => f64::from(self.streak_days),
            CriteriaKind::AppliancesTracked => f64::from(self.appliances_tracked),
            CriteriaKind::GoalsCompleted => f64::from(self.goals_completed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criteria {
    #[serde(rename = "type")]
    pub kind: CriteriaKind,
    #[serde(default)]
    pub comparator: Comparator,
    pub target: f64,
    pub current: f64,
}

impl Criteria {
    pub fn at_least(kind: CriteriaKind, target: f64) -> Self {
        Self {
            kind,
            comparator: Comparator::AtLeast,
            target,
            current: 0.0,
        }
    }

    /// Refresh `current` from the metrics and report whether the rule holds.
    pub fn evaluate(&mut self, metrics: &ActivityMetrics) -> bool {
        self.current = metrics.value_of(self.kind);
        self.comparator.holds(self.current, self.target)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: AchievementCategory,
    pub icon_name: String,
    pub color: String,
    pub is_unlocked: bool,
    #[serde(default)]
    pub unlocked_at: Option<DateTime<Utc>>,
    pub criteria: Criteria,
    pub xp_reward: u32,
}

impl Achievement {
    /// Flip the flag. Returns false when it was already unlocked.
    pub fn unlock(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_unlocked {
            return false;
        }
        self.is_unlocked = true;
        self.unlocked_at = Some(now);
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tier: BadgeTier,
    pub category: String,
    pub icon_name: String,
    pub color: String,
    pub is_earned: bool,
    #[serde(default)]
    pub earned_at: Option<DateTime<Utc>>,
    pub requirements: String,
}

impl Badge {
    /// Flip the flag. Returns false when it was already earned.
    pub fn earn(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_earned {
            return false;
        }
        self.is_earned = true;
        self.earned_at = Some(now);
        true
    }
}

#[allow(clippy::too_many_arguments)]
fn achievement(
    id: &str,
    title: &str,
    description: &str,
    category: AchievementCategory,
    icon_name: &str,
    color: &str,
    criteria: Criteria,
    xp_reward: u32,
) -> Achievement {
    Achievement {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        category,
        icon_name: icon_name.to_string(),
        color: color.to_string(),
        is_unlocked: false,
        unlocked_at: None,
        criteria,
        xp_reward,
    }
}

pub fn default_achievements() -> Vec<Achievement> {
    use AchievementCategory::{Behavior, Milestone, Time};

    vec![
        achievement(
            "first_calculation",
            "First Steps",
            "Complete your first appliance calculation",
            Milestone,
            "zap",
            "#10B981",
            Criteria::at_least(CriteriaKind::Calculations, 1.0),
            50,
        ),
        achievement(
            "energy_saver",
            "Energy Saver",
            "Reduce monthly costs by ₱500",
            AchievementCategory::Savings,
            "leaf",
            "#059669",
            Criteria::at_least(CriteriaKind::Savings, 500.0),
            200,
        ),
        achievement(
            "week_warrior",
            "Week Warrior",
            "Use the app for 7 consecutive days",
            Time,
            "calendar",
            "#8B5CF6",
            Criteria::at_least(CriteriaKind::StreakDays, 7.0),
            150,
        ),
        achievement(
            "appliance_master",
            "Appliance Master",
            "Track 10 different appliances",
            Behavior,
            "settings",
            "#F59E0B",
            Criteria::at_least(CriteriaKind::AppliancesTracked, 10.0),
            300,
        ),
        achievement(
            "goal_achiever",
            "Goal Achiever",
            "Complete 5 goals",
            Milestone,
            "target",
            "#EF4444",
            Criteria::at_least(CriteriaKind::GoalsCompleted, 5.0),
            250,
        ),
    ]
}

fn badge(
    id: &str,
    name: &str,
    description: &str,
    tier: BadgeTier,
    category: &str,
    icon_name: &str,
    requirements: &str,
) -> Badge {
    let color = match tier {
        BadgeTier::Bronze => "#CD7F32",
        BadgeTier::Silver => "#C0C0C0",
        BadgeTier::Gold => "#FFD700",
        BadgeTier::Platinum => "#E5E4E2",
    };
    Badge {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        tier,
        category: category.to_string(),
        icon_name: icon_name.to_string(),
        color: color.to_string(),
        is_earned: false,
        earned_at: None,
        requirements: requirements.to_string(),
    }
}

pub fn default_badges() -> Vec<Badge> {
    use BadgeTier::*;

    vec![
        badge(
            "efficiency_bronze",
            "Efficiency Explorer",
            "Started your energy efficiency journey",
            Bronze,
            "efficiency",
            "award",
            "Complete first calculation",
        ),
        badge(
            "efficiency_silver",
            "Efficiency Enthusiast",
            "Consistently tracking energy usage",
            Silver,
            "efficiency",
            "award",
            "Use app for 14 days",
        ),
        badge(
            "efficiency_gold",
            "Efficiency Expert",
            "Master of energy optimization",
            Gold,
            "efficiency",
            "award",
            "Complete 10 goals and save ₱1000",
        ),
        badge(
            "saver_bronze",
            "Money Saver",
            "Started saving on electricity bills",
            Bronze,
            "savings",
            "coins",
            "Save ₱100 monthly",
        ),
        badge(
            "saver_silver",
            "Smart Spender",
            "Significant savings achieved",
            Silver,
            "savings",
            "coins",
            "Save ₱500 monthly",
        ),
        badge(
            "saver_gold",
            "Savings Champion",
            "Exceptional cost optimization",
            Gold,
            "savings",
            "coins",
            "Save ₱1000 monthly",
        ),
    ]
}
