use wattquest_core::Database;

use super::{print_json, CmdResult};

pub fn run(limit: usize) -> CmdResult {
    let db = Database::open()?;
    print_json(&db.recent_events(limit)?)
}
