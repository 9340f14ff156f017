//! Convert command - export the model and install it into the app assets.

use std::path::PathBuf;
use std::time::Duration;

use console::{Term, style};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use modelprep_core::{
    Converter, ExportBackend, ExportRequest, ModelHandle, PrepError, UltralyticsBackend,
};

use super::config::{Overrides, load_config};

/// Exit status when the Python dependency is missing.
const EXIT_MISSING_DEPENDENCY: i32 = 1;

pub fn run(overrides: &Overrides) -> anyhow::Result<()> {
    let config = load_config(overrides)?;
    let backend = WithSpinner::new(
        UltralyticsBackend::from_settings(&config.python),
        Term::stdout().is_term(),
    );
    let converter = Converter::new(backend, config);

    let mut stdout = std::io::stdout();
    match converter.run(&mut stdout) {
        Ok(report) => {
            info!(installed = report.is_installed(), "Conversion finished");
            Ok(())
        }
        Err(PrepError::MissingDependency { package, hint }) => {
            println!("{} {} package not found.", style("Error:").red().bold(), package);
            println!("Please install it with: {}", hint);
            std::process::exit(EXIT_MISSING_DEPENDENCY);
        }
        Err(e) => Err(e.into()),
    }
}

/// Shows a spinner on stderr while the slow backend calls run.
///
/// Only enabled when the step report on stdout goes to a terminal.
struct WithSpinner<B> {
    inner: B,
    enabled: bool,
}

impl<B> WithSpinner<B> {
    fn new(inner: B, enabled: bool) -> Self {
        Self { inner, enabled }
    }

    fn spinner(&self, message: &str) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner:.green} {msg} ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }
}

impl<B: ExportBackend> ExportBackend for WithSpinner<B> {
    fn ensure_available(&self) -> modelprep_core::Result<()> {
        self.inner.ensure_available()
    }

    fn load(&self, model_id: &str) -> modelprep_core::Result<ModelHandle> {
        let pb = self.spinner(&format!("loading {}", model_id));
        let result = self.inner.load(model_id);
        pb.finish_and_clear();
        result
    }

    fn export(
        &self,
        model: &ModelHandle,
        request: &ExportRequest,
    ) -> modelprep_core::Result<Option<PathBuf>> {
        let pb = self.spinner(&format!("exporting {}", request.format));
        let result = self.inner.export(model, request);
        pb.finish_and_clear();
        result
    }
}
