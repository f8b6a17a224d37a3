//! Activity reports from the calculator side of the app.

use chrono::{Local, Utc};
use clap::Subcommand;

use super::{open_session, parse_finite, persist, print_json, CmdResult};

#[derive(Subcommand)]
pub enum ActivityAction {
    /// Daily app open
    CheckIn,
    /// One appliance cost calculation
    Calculation,
    /// Current monthly savings
    Savings {
        #[arg(value_parser = parse_finite, allow_negative_numbers = true)]
        amount: f64,
    },
    /// Number of appliances being tracked
    Appliances { count: u32 },
}

pub fn run(action: ActivityAction) -> CmdResult {
    let (db, mut session) = open_session()?;
    let today = Local::now().date_naive();
    let now = Utc::now();

    match action {
        ActivityAction::CheckIn => {
            session.check_in(today, now);
        }
        ActivityAction::Calculation => {
            session.record_calculation(today, now);
        }
        ActivityAction::Savings { amount } => {
            session.record_savings(amount);
        }
        ActivityAction::Appliances { count } => session.set_appliances_tracked(count),
    }

    persist(&db, &mut session)?;
    print_json(session.metrics())
}
