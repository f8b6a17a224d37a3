use super::{open_session, print_json, CmdResult};

pub fn run() -> CmdResult {
    let (_db, session) = open_session()?;
    print_json(&session.stats())
}
