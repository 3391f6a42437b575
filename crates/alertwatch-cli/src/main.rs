use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "alertwatch", version, about = "Feed alert watcher")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (defaults to ~/.config/alertwatch/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the feed and dispatch alerts until interrupted
    Run {
        /// Log alerts instead of posting them to Discord
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the current alert (fetches once)
    Alert,
    /// Print every alert with a start and an expiry (fetches once)
    Alerts,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Run { dry_run } => commands::run::run(config_path, dry_run).await,
        Commands::Alert => commands::query::run(config_path, commands::query::Scope::Current).await,
        Commands::Alerts => commands::query::run(config_path, commands::query::Scope::All).await,
        Commands::Config { action } => commands::config::run(config_path, action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
