use clap::{Parser, Subcommand};
use xivlog_cli::{commands, logging};
use xivlog_core::{AppConfig, AppConfigExt};

#[derive(Parser)]
#[command(version, about = "Replay ACT network logs into game state")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream a log file through the parser pipeline and print the resulting state.
    Replay {
        /// Log file, relative to the configured log directory unless absolute.
        #[arg(short, long)]
        path: String,
        /// Keep reading as the file grows (Ctrl-C to stop).
        #[arg(short, long)]
        follow: bool,
        /// Print the final state and counters as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Show the effective configuration and where it is stored.
    Config,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let cli = Cli::parse();
    let (config, load_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    logging::init_logging(&config.log_filter);
    if let Some(e) = load_error {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
    }

    match &cli.command {
        Commands::Replay { path, follow, json } => {
            commands::replay(&config, path, *follow, *json).await
        }
        Commands::Config => commands::show_config(&config),
    }
}
