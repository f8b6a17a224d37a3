use clap::Subcommand;
use serde::Serialize;
use wattquest_core::{xp_threshold, UserProgress};

use super::{open_session, persist, print_json, CmdResult};

#[derive(Subcommand)]
pub enum ProgressAction {
    /// Show level, XP and rank
    Show,
    /// Award experience points
    AddXp {
        /// Amount of XP (must be positive)
        amount: u32,
    },
}

#[derive(Serialize)]
struct ProgressView<'a> {
    #[serde(flatten)]
    progress: &'a UserProgress,
    level_threshold: u64,
    level_percent: f64,
}

impl<'a> ProgressView<'a> {
    fn new(progress: &'a UserProgress) -> Self {
        Self {
            progress,
            level_threshold: xp_threshold(progress.level),
            level_percent: (progress.level_progress() * 1000.0).round() / 10.0,
        }
    }
}

pub fn run(action: ProgressAction) -> CmdResult {
    let (db, mut session) = open_session()?;

    match action {
        ProgressAction::Show => {
            print_json(&ProgressView::new(session.user_progress()))?;
        }
        ProgressAction::AddXp { amount } => {
            let award = session.add_xp(amount)?;
            persist(&db, &mut session)?;
            print_json(&award)?;
        }
    }
    Ok(())
}
