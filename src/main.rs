mod client;
mod commands;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dita_core::config::DitaConfig;
use tracing_subscriber::EnvFilter;

use crate::commands::{parse_category, parse_date};

#[derive(Parser)]
#[command(name = "dita")]
#[command(about = "Historical, literary and holiday events on this day")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show events for a date (default: today)
    Show {
        /// YYYY-MM-DD, today, yesterday or tomorrow
        #[arg(short, long)]
        date: Option<String>,

        /// all, historical, literary or holiday
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Navigate day by day
    Browse {
        /// YYYY-MM-DD, today, yesterday or tomorrow
        #[arg(short, long)]
        date: Option<String>,

        /// all, historical, literary or holiday
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Manage the daily notification
    Notifications {
        #[command(subcommand)]
        action: NotificationAction,
    },
    /// Ask dita-worker to schedule the daily notification
    Schedule,
    /// Show where dita keeps its files
    Config,
}

#[derive(Subcommand)]
enum NotificationAction {
    /// Allow notifications and schedule the daily one
    Enable {
        /// Also allow the once-a-day periodic wake
        #[arg(long)]
        periodic_wake: bool,
    },
    /// Stop daily notifications
    Disable,
    /// Show permissions and worker state
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let config = DitaConfig::load()?;
    let today = chrono::Local::now().date_naive();

    let command = cli.command.unwrap_or(Commands::Show {
        date: None,
        category: None,
    });

    match command {
        Commands::Show { date, category } => {
            let date = date.as_deref().map(|d| parse_date(d, today)).transpose()?;
            let category = parse_category(category.as_deref(), config.default_category)?;
            commands::show::run(&config, date.unwrap_or(today), category)?;
            commands::schedule::on_load(&config).await;
            Ok(())
        }
        Commands::Browse { date, category } => {
            let date = date.as_deref().map(|d| parse_date(d, today)).transpose()?;
            let category = parse_category(category.as_deref(), config.default_category)?;
            commands::schedule::on_load(&config).await;
            commands::browse::run(&config, date.unwrap_or(today), category)
        }
        Commands::Notifications { action } => match action {
            NotificationAction::Enable { periodic_wake } => {
                commands::notifications::enable(config, periodic_wake).await
            }
            NotificationAction::Disable => commands::notifications::disable(config).await,
            NotificationAction::Status => commands::notifications::status(&config).await,
        },
        Commands::Schedule => commands::schedule::run(&config).await,
        Commands::Config => commands::config::run(&config),
    }
}
