//! Subcommand handlers.
//!
//! Every handler loads the stored session, applies one operation, then
//! persists the snapshot together with the events it produced.

pub mod achievement;
pub mod activity;
pub mod badge;
pub mod config;
pub mod events;
pub mod goal;
pub mod progress;
pub mod reset;
pub mod stats;
pub mod streak;

use chrono::{Local, Utc};
use tracing::debug;
use wattquest_core::{Config, Database, GamificationSession};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Open storage and restore the session with settings from config.
///
/// Lapsed streaks and overdue goals are refreshed before the caller sees it.
pub fn open_session() -> Result<(Database, GamificationSession), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    let mut session = db.load_or_new_session()?;
    session.set_settings(config.engine_settings());

    let changed = session.refresh(Utc::now(), Local::now().date_naive());
    if changed > 0 {
        debug!(changed, "refreshed stale goals and streaks");
    }
    Ok((db, session))
}

/// Persist the session and its pending events.
///
/// Events are echoed to stderr so stdout stays machine-readable.
pub fn persist(db: &Database, session: &mut GamificationSession) -> CmdResult {
    let events = session.take_events();
    for event in &events {
        eprintln!("{}", serde_json::to_string(event)?);
    }
    db.persist(session, &events)?;
    Ok(())
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Value parser for numeric arguments that end up in the stored snapshot.
pub fn parse_finite(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("{s} is not a finite number"))
    }
}

pub fn not_found(kind: &str, id: &str) -> Box<dyn std::error::Error> {
    format!("{kind} not found: {id}").into()
}
