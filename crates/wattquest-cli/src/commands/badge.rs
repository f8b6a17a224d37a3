use clap::Subcommand;
use serde_json::json;

use super::{not_found, open_session, persist, print_json, CmdResult};

#[derive(Subcommand)]
pub enum BadgeAction {
    /// List badges
    List,
    /// Mark a badge earned
    Earn { id: String },
}

pub fn run(action: BadgeAction) -> CmdResult {
    let (db, mut session) = open_session()?;

    match action {
        BadgeAction::List => print_json(&session.badges())?,
        BadgeAction::Earn { id } => {
            let earned = session
                .earn_badge(&id)
                .ok_or_else(|| not_found("badge", &id))?;
            persist(&db, &mut session)?;
            print_json(&json!({ "id": id, "newly_earned": earned }))?;
        }
    }
    Ok(())
}
