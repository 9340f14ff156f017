//! Check command - report dependency and artifact status.

use std::fs;

use console::style;

use modelprep_core::artifact::mebibytes;
use modelprep_core::{ExportBackend, PrepError, UltralyticsBackend};

use super::config::{Overrides, load_config};

pub fn run(overrides: &Overrides) -> anyhow::Result<()> {
    let config = load_config(overrides)?;
    let backend = UltralyticsBackend::from_settings(&config.python);

    println!("{}", style("modelprep Status").bold());
    println!();

    println!(
        "{} {}",
        style("▸ python").bold(),
        config.python.interpreter.display()
    );
    match backend.ensure_available() {
        Ok(()) => println!("    {} {} installed", style("✓").green(), config.python.package),
        Err(PrepError::MissingDependency { package, hint }) => {
            println!("    {} {} missing", style("✗").red(), package);
            println!("    {} Run '{}' to install", style("⚠").yellow(), hint);
        }
        Err(e) => return Err(e.into()),
    }
    println!();

    let destination = config.destination_path();
    println!("{} {}", style("▸ artifact").bold(), destination.display());
    if destination.is_file() {
        let size = fs::metadata(&destination)?.len();
        println!(
            "    {} present ({})",
            style("✓").green(),
            format_size(size)
        );
    } else {
        println!("    {} missing", style("✗").red());
        println!(
            "    {} Run 'modelprep' to export {}",
            style("⚠").yellow(),
            config.model.model_id
        );
    }

    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.2} MB", mebibytes(bytes))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}
