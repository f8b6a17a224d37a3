use wattquest_core::Database;

use super::CmdResult;

pub fn run(yes: bool) -> CmdResult {
    if !yes {
        return Err("refusing to wipe progress without --yes".into());
    }
    let db = Database::open()?;
    db.clear_session()?;
    println!("progress reset");
    Ok(())
}
