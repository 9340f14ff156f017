//! CLI that converts the pre-trained detector to TFLite and installs it
//! into the mobile app's assets.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{check, config, convert};

/// Prepare the on-device object-detection model for the mobile app
#[derive(Parser)]
#[command(name = "modelprep")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Root of the mobile app project (contains assets/)
    #[arg(long, global = true)]
    project_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export the model and copy it into the app assets (default)
    Convert,

    /// Check the Python dependency and the installed artifact
    Check,

    /// Manage configuration
    Config(config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let overrides = config::Overrides {
        config_path: cli.config,
        project_root: cli.project_root,
    };

    match cli.command.unwrap_or(Commands::Convert) {
        Commands::Convert => convert::run(&overrides),
        Commands::Check => check::run(&overrides),
        Commands::Config(args) => config::run(args, &overrides),
    }
}
