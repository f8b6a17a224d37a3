//! User-defined goals with a target, a deadline and an XP reward.

use chrono::{DateTime, Months, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Goal cadence; determines the default deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    Daily,
    Weekly,
    Monthly,
}

impl GoalType {
    /// Deadline for a goal of this cadence starting at `start`.
    ///
    /// Falls back to `start` at the end of the representable range, which
    /// [`NewGoal::validate`] then rejects.
    pub fn end_date_from(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        let end = match self {
            GoalType::Daily => start.checked_add_signed(TimeDelta::days(1)),
            GoalType::Weekly => start.checked_add_signed(TimeDelta::days(7)),
            GoalType::Monthly => start.checked_add_months(Months::new(1)),
        };
        end.unwrap_or(start)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalCategory {
    Usage,
    Cost,
    Efficiency,
    Custom,
}

/// Everything needed to create a goal; the ledger fills in the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGoal {
    pub title: String,
    pub description: String,
    pub goal_type: GoalType,
    pub category: GoalCategory,
    pub target: f64,
    pub unit: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub icon_name: String,
    pub color: String,
    pub xp_reward: u32,
}

impl NewGoal {
    /// Custom goal: weekly, category custom, unit defaulting to "units".
    ///
    /// # Errors
    /// Fails when `duration_days` pushes the deadline out of range.
    pub fn custom(
        title: &str,
        description: Option<&str>,
        target: f64,
        unit: Option<&str>,
        duration_days: i64,
        xp_reward: u32,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let end_date = TimeDelta::try_days(duration_days)
            .and_then(|d| now.checked_add_signed(d))
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "duration_days".to_string(),
                message: format!("{duration_days} days is out of range"),
            })?;

        Ok(Self {
            title: title.to_string(),
            description: description
                .filter(|d| !d.is_empty())
                .unwrap_or(title)
                .to_string(),
            goal_type: GoalType::Weekly,
            category: GoalCategory::Custom,
            target,
            unit: unit.filter(|u| !u.is_empty()).unwrap_or("units").to_string(),
            start_date: now,
            end_date,
            is_active: true,
            icon_name: "target".to_string(),
            color: "#6366F1".to_string(),
            xp_reward,
        })
    }

    /// # Errors
    /// Rejects non-finite or non-positive targets and deadlines not after the start.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.target.is_finite() || self.target <= 0.0 {
            return Err(ValidationError::InvalidTarget(self.target));
        }
        if self.end_date <= self.start_date {
            return Err(ValidationError::InvalidTimeRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "title".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub title: String,
    pub description: String,
    pub goal_type: GoalType,
    pub category: GoalCategory,
    pub target: f64,
    pub current: f64,
    pub unit: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub is_completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub icon_name: String,
    pub color: String,
    pub xp_reward: u32,
}

impl Goal {
    pub fn from_new(id: String, spec: NewGoal) -> Self {
        Self {
            id,
            title: spec.title,
            description: spec.description,
            goal_type: spec.goal_type,
            category: spec.category,
            target: spec.target,
            current: 0.0,
            unit: spec.unit,
            start_date: spec.start_date,
            end_date: spec.end_date,
            is_active: spec.is_active,
            is_completed: false,
            completed_at: None,
            icon_name: spec.icon_name,
            color: spec.color,
            xp_reward: spec.xp_reward,
        }
    }

    /// Set progress, clamped to `0..=target`.
    ///
    /// Non-finite values are ignored; returns whether `current` was set.
    pub fn set_progress(&mut self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        self.current = value.min(self.target).max(0.0);
        true
    }

    pub fn mark_completed(&mut self, now: DateTime<Utc>) {
        self.is_completed = true;
        self.completed_at = Some(now);
        self.current = self.target;
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        !self.is_completed && now > self.end_date
    }
}

/// Preset goals offered on the goal screen.
#[derive(Debug, Clone, Serialize)]
pub struct GoalTemplate {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub goal_type: GoalType,
    pub category: GoalCategory,
    pub target: f64,
    pub unit: &'static str,
    pub icon_name: &'static str,
    pub color: &'static str,
    pub xp_reward: u32,
}

impl GoalTemplate {
    pub fn instantiate(&self, now: DateTime<Utc>) -> NewGoal {
        NewGoal {
            title: self.title.to_string(),
            description: self.description.to_string(),
            goal_type: self.goal_type,
            category: self.category,
            target: self.target,
            unit: self.unit.to_string(),
            start_date: now,
            end_date: self.goal_type.end_date_from(now),
            is_active: true,
            icon_name: self.icon_name.to_string(),
            color: self.color.to_string(),
            xp_reward: self.xp_reward,
        }
    }
}

pub fn goal_templates() -> Vec<GoalTemplate> {
    vec![
        GoalTemplate {
            id: "daily_energy_check",
            title: "Daily Energy Check",
            description: "Check your energy usage daily",
            goal_type: GoalType::Daily,
            category: GoalCategory::Usage,
            target: 1.0,
            unit: "check",
            icon_name: "calendar",
            color: "#2563EB",
            xp_reward: 25,
        },
        GoalTemplate {
            id: "weekly_savings",
            title: "Weekly Savings Goal",
            description: "Save ₱50 on electricity this week",
            goal_type: GoalType::Weekly,
            category: GoalCategory::Cost,
            target: 50.0,
            unit: "₱",
            icon_name: "coins",
            color: "#10B981",
            xp_reward: 75,
        },
        GoalTemplate {
            id: "monthly_efficiency",
            title: "Monthly Efficiency",
            description: "Reduce energy consumption by 5%",
            goal_type: GoalType::Monthly,
            category: GoalCategory::Efficiency,
            target: 5.0,
            unit: "%",
            icon_name: "leaf",
            color: "#059669",
            xp_reward: 150,
        },
        GoalTemplate {
            id: "appliance_optimizer",
            title: "Appliance Optimizer",
            description: "Optimize 3 appliances this week",
            goal_type: GoalType::Weekly,
            category: GoalCategory::Usage,
            target: 3.0,
            unit: "appliances",
            icon_name: "settings",
            color: "#8B5CF6",
            xp_reward: 100,
        },
        GoalTemplate {
            id: "quick_learner",
            title: "Quick Learner",
            description: "Complete 5 calculations today",
            goal_type: GoalType::Daily,
            category: GoalCategory::Usage,
            target: 5.0,
            unit: "calculations",
            icon_name: "calculator",
            color: "#F59E0B",
            xp_reward: 50,
        },
    ]
}

pub fn find_template(id: &str) -> Option<GoalTemplate> {
    goal_templates().into_iter().find(|t| t.id == id)
}
