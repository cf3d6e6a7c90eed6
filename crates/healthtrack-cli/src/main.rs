use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use healthtrack_core::ErrorCategory;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "healthtrack", version, about = "HealthTrack CLI")]
struct Cli {
    /// Log at debug level (overrides HEALTHTRACK_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record, replay and list runs
    Run {
        #[command(subcommand)]
        action: commands::run::RunAction,
    },
    /// Food logging and lookup
    Food {
        #[command(subcommand)]
        action: commands::food::FoodAction,
    },
    /// User profile
    Profile {
        #[command(subcommand)]
        action: commands::profile::ProfileAction,
    },
    /// Today's nutrition and exercise
    Today {
        /// Day to summarize (default today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Browse past records
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// All-time totals
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Cloud sync
    Sync {
        #[command(subcommand)]
        action: commands::sync::SyncAction,
    },
    /// Backup, restore and clear local data
    Data {
        #[command(subcommand)]
        action: commands::data::DataAction,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("HEALTHTRACK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run { action } => commands::run::run(action),
        Commands::Food { action } => commands::food::run(action),
        Commands::Profile { action } => commands::profile::run(action),
        Commands::Today { date, json } => commands::today::run(date, json),
        Commands::History { action } => commands::history::run(action),
        Commands::Stats { json } => commands::stats::run(json),
        Commands::Config { action } => commands::config::run(action),
        Commands::Sync { action } => commands::sync::run(action),
        Commands::Data { action } => commands::data::run(action),
    };

    if let Err(e) = result {
        let message = e.to_string();
        eprintln!("error: {message}");
        let category = ErrorCategory::classify(&message);
        if category != ErrorCategory::Unknown {
            eprintln!("hint: {}", category.user_message());
        }
        std::process::exit(1);
    }
}
