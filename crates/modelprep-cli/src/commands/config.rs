//! Config command - manage configuration.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;
use tracing::debug;

use modelprep_core::PrepConfig;

/// Global options that affect which configuration a command sees.
pub struct Overrides {
    /// Explicit config file (`--config`).
    pub config_path: Option<PathBuf>,
    /// Project root override (`--project-root`).
    pub project_root: Option<PathBuf>,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Initialize a new configuration file with the defaults
    Init(InitArgs),

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g., "model.image_size")
        key: String,
    },

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub fn run(args: ConfigArgs, overrides: &Overrides) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(overrides),
        ConfigCommand::Init(init_args) => init_config(init_args),
        ConfigCommand::Get { key } => get_config(&key, overrides),
        ConfigCommand::Path => show_path(overrides),
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("modelprep")
        .join("config.json")
}

/// Resolve the configuration for a run.
///
/// An explicit `--config` must exist. Otherwise the default config file is
/// used when present, and the built-in defaults when not.
pub fn load_config(overrides: &Overrides) -> anyhow::Result<PrepConfig> {
    let mut config = match &overrides.config_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            PrepConfig::from_file(path)?
        }
        None => {
            let path = default_config_path();
            if path.exists() {
                debug!("Using config from {}", path.display());
                PrepConfig::from_file(&path)?
            } else {
                PrepConfig::default()
            }
        }
    };

    if let Some(root) = &overrides.project_root {
        config.output.project_root = root.clone();
    }

    Ok(config)
}

fn show_config(overrides: &Overrides) -> anyhow::Result<()> {
    let config = load_config(overrides)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn init_config(args: InitArgs) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or_else(default_config_path);

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    PrepConfig::default().save(&output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}

fn get_config(key: &str, overrides: &Overrides) -> anyhow::Result<()> {
    let config = load_config(overrides)?;
    let json = serde_json::to_value(&config)?;

    let mut current = &json;
    for part in key.split('.') {
        current = current
            .get(part)
            .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
    }

    println!("{}", serde_json::to_string_pretty(current)?);

    Ok(())
}

fn show_path(overrides: &Overrides) -> anyhow::Result<()> {
    let config_path = overrides
        .config_path
        .clone()
        .unwrap_or_else(default_config_path);

    println!("Configuration file: {}", config_path.display());

    if config_path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'modelprep config init' to create a configuration file.");
    }

    Ok(())
}
