//! Goal management commands.

use chrono::Utc;
use clap::{Subcommand, ValueEnum};
use wattquest_core::goal::goal_templates;
use wattquest_core::{Config, GoalCategory, GoalType, NewGoal};

use super::{not_found, open_session, parse_finite, persist, print_json, CmdResult};

#[derive(Clone, Copy, ValueEnum)]
pub enum GoalTypeArg {
    Daily,
    Weekly,
    Monthly,
}

impl From<GoalTypeArg> for GoalType {
    fn from(arg: GoalTypeArg) -> Self {
        match arg {
            GoalTypeArg::Daily => GoalType::Daily,
            GoalTypeArg::Weekly => GoalType::Weekly,
            GoalTypeArg::Monthly => GoalType::Monthly,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum GoalCategoryArg {
    Usage,
    Cost,
    Efficiency,
    Custom,
}

impl From<GoalCategoryArg> for GoalCategory {
    fn from(arg: GoalCategoryArg) -> Self {
        match arg {
            GoalCategoryArg::Usage => GoalCategory::Usage,
            GoalCategoryArg::Cost => GoalCategory::Cost,
            GoalCategoryArg::Efficiency => GoalCategory::Efficiency,
            GoalCategoryArg::Custom => GoalCategory::Custom,
        }
    }
}

#[derive(Subcommand)]
pub enum GoalAction {
    /// List goals (active ones unless --all)
    List {
        #[arg(long)]
        all: bool,
    },
    /// List goal templates
    Templates,
    /// Create a goal from a template
    AddTemplate {
        /// Template ID (e.g. "weekly_savings")
        id: String,
    },
    /// Create a custom goal
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, value_parser = parse_finite)]
        target: f64,
        #[arg(long)]
        unit: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Goal cadence; sets the deadline unless --days is given
        #[arg(long = "type", value_enum)]
        goal_type: Option<GoalTypeArg>,
        #[arg(long, value_enum, default_value = "custom")]
        category: GoalCategoryArg,
        /// Days until the deadline
        #[arg(long)]
        days: Option<i64>,
        /// XP reward on completion
        #[arg(long)]
        xp: Option<u32>,
    },
    /// Set progress on a goal
    Progress {
        id: String,
        #[arg(value_parser = parse_finite, allow_negative_numbers = true)]
        value: f64,
    },
    /// Mark a goal completed
    Complete {
        id: String,
    },
    /// Delete a goal
    Delete {
        id: String,
    },
}

pub fn run(action: GoalAction) -> CmdResult {
    match action {
        GoalAction::Templates => print_json(&goal_templates()),
        other => run_with_session(other),
    }
}

fn run_with_session(action: GoalAction) -> CmdResult {
    let (db, mut session) = open_session()?;

    match action {
        GoalAction::Templates => print_json(&goal_templates())?,
        GoalAction::List { all } => {
            let goals: Vec<_> = session
                .goals()
                .iter()
                .filter(|g| all || g.is_active)
                .collect();
            print_json(&goals)?;
        }
        GoalAction::AddTemplate { id } => {
            let goal = session.add_goal_from_template(&id, Utc::now())?.clone();
            persist(&db, &mut session)?;
            print_json(&goal)?;
        }
        GoalAction::Add {
            title,
            target,
            unit,
            description,
            goal_type,
            category,
            days,
            xp,
        } => {
            let config = Config::load()?;
            let now = Utc::now();
            let mut spec = NewGoal::custom(
                &title,
                description.as_deref(),
                target,
                unit.as_deref(),
                days.unwrap_or(config.goals.custom_goal_days),
                xp.unwrap_or(config.goals.custom_goal_xp_reward),
                now,
            )?;
            spec.category = category.into();
            if let Some(goal_type) = goal_type {
                spec.goal_type = goal_type.into();
                if days.is_none() {
                    spec.end_date = spec.goal_type.end_date_from(now);
                }
            }

            let goal = session.add_goal(spec)?.clone();
            persist(&db, &mut session)?;
            print_json(&goal)?;
        }
        GoalAction::Progress { id, value } => {
            let goal = session
                .update_goal_progress(&id, value)
                .ok_or_else(|| not_found("goal", &id))?
                .clone();
            persist(&db, &mut session)?;
            print_json(&goal)?;
        }
        GoalAction::Complete { id } => {
            let completion = session
                .complete_goal(&id)
                .ok_or_else(|| not_found("goal", &id))?;
            persist(&db, &mut session)?;
            print_json(&completion)?;
        }
        GoalAction::Delete { id } => {
            let goal = session.delete_goal(&id).ok_or_else(|| not_found("goal", &id))?;
            persist(&db, &mut session)?;
            println!("Goal deleted: {}", goal.id);
        }
    }
    Ok(())
}
