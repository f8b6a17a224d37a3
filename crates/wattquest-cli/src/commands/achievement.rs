use clap::Subcommand;
use serde_json::json;

use super::{not_found, open_session, persist, print_json, CmdResult};

#[derive(Subcommand)]
pub enum AchievementAction {
    /// List achievements with their criteria progress
    List,
    /// Unlock an achievement by ID
    Unlock { id: String },
    /// Evaluate achievement rules now
    Check,
}

pub fn run(action: AchievementAction) -> CmdResult {
    let (db, mut session) = open_session()?;

    match action {
        AchievementAction::List => print_json(&session.achievements())?,
        AchievementAction::Unlock { id } => {
            let unlocked = session
                .unlock_achievement(&id)
                .ok_or_else(|| not_found("achievement", &id))?;
            persist(&db, &mut session)?;
            print_json(&json!({ "id": id, "newly_unlocked": unlocked }))?;
        }
        AchievementAction::Check => {
            let unlocked = session.check_achievements();
            persist(&db, &mut session)?;
            print_json(&json!({ "unlocked": unlocked }))?;
        }
    }
    Ok(())
}
