use clap::{Parser, Subcommand};
use wattquest_core::Config;

mod commands;

#[derive(Parser)]
#[command(name = "wattquest", version, about = "WattQuest CLI")]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Level, XP and rank
    Progress {
        #[command(subcommand)]
        action: commands::progress::ProgressAction,
    },
    /// Daily streaks
    Streak {
        #[command(subcommand)]
        action: commands::streak::StreakAction,
    },
    /// Goal management
    Goal {
        #[command(subcommand)]
        action: commands::goal::GoalAction,
    },
    /// Achievements
    Achievement {
        #[command(subcommand)]
        action: commands::achievement::AchievementAction,
    },
    /// Badges
    Badge {
        #[command(subcommand)]
        action: commands::badge::BadgeAction,
    },
    /// Report activity that feeds achievements and streaks
    Activity {
        #[command(subcommand)]
        action: commands::activity::ActivityAction,
    },
    /// Aggregate statistics
    Stats,
    /// Event history
    Events {
        /// Number of events to show
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Wipe all stored progress
    Reset {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose {
        "debug".to_string()
    } else {
        Config::load_or_default().logging.level
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Progress { action } => commands::progress::run(action),
        Commands::Streak { action } => commands::streak::run(action),
        Commands::Goal { action } => commands::goal::run(action),
        Commands::Achievement { action } => commands::achievement::run(action),
        Commands::Badge { action } => commands::badge::run(action),
        Commands::Activity { action } => commands::activity::run(action),
        Commands::Stats => commands::stats::run(),
        Commands::Events { limit } => commands::events::run(limit),
        Commands::Config { action } => commands::config::run(action),
        Commands::Reset { yes } => commands::reset::run(yes),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
