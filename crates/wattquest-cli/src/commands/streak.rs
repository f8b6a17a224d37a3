use clap::Subcommand;
use serde_json::json;

use super::{not_found, open_session, persist, print_json, CmdResult};

#[derive(Subcommand)]
pub enum StreakAction {
    /// List all streaks
    List,
    /// Record today's action for a streak
    Update {
        /// Streak ID (e.g. "daily_usage")
        id: String,
    },
}

pub fn run(action: StreakAction) -> CmdResult {
    let (db, mut session) = open_session()?;

    match action {
        StreakAction::List => print_json(&session.streaks())?,
        StreakAction::Update { id } => {
            let change = session
                .update_streak(&id)
                .ok_or_else(|| not_found("streak", &id))?;
            persist(&db, &mut session)?;
            let streak = session.streaks().iter().find(|s| s.id == id);
            print_json(&json!({ "change": change, "streak": streak }))?;
        }
    }
    Ok(())
}
