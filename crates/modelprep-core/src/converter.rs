//! The conversion driver.
//!
//! A run is a fixed sequence: check dependencies, load the model, verify
//! the label the app depends on, export, then locate the artifact and copy
//! it into the app's assets. Progress is written to a caller-supplied sink.

use std::io::Write;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::artifact::{InstalledArtifact, LocatedArtifact, install_artifact, locate_artifact};
use crate::backend::{ExportBackend, ExportRequest};
use crate::models::config::PrepConfig;
use crate::models::handle::LabelCheck;
use crate::Result;

const RULE_WIDTH: usize = 60;

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    /// Result of the label sanity check.
    pub label_check: LabelCheck,
    /// Path the exporter reported.
    pub export_path: Option<PathBuf>,
    /// Artifact found after export.
    pub artifact: Option<LocatedArtifact>,
    /// Artifact copied into the app's assets.
    pub installed: Option<InstalledArtifact>,
}

impl ConversionReport {
    /// Whether the artifact made it to its destination.
    pub fn is_installed(&self) -> bool {
        self.installed.is_some()
    }
}

/// Runs a conversion against an [`ExportBackend`].
pub struct Converter<B> {
    backend: B,
    config: PrepConfig,
}

impl<B: ExportBackend> Converter<B> {
    pub fn new(backend: B, config: PrepConfig) -> Self {
        Self { backend, config }
    }

    /// Execute the full conversion, writing progress to `out`.
    ///
    /// A missing dependency is reported before anything is written. A label
    /// mismatch or an artifact that cannot be found is reported in `out` and
    /// in the returned report, not as an error. Load, export and filesystem
    /// failures are returned as errors.
    pub fn run<W: Write>(&self, out: &mut W) -> Result<ConversionReport> {
        self.config.validate()?;
        self.backend.ensure_available()?;

        let model_cfg = &self.config.model;
        let format_name = &model_cfg.format_name;
        let destination = self.config.destination_path();
        let rule = "=".repeat(RULE_WIDTH);

        writeln!(out, "{}", rule)?;
        writeln!(out, "{} to {} Converter", model_cfg.display_name, format_name)?;
        writeln!(out, "{}", rule)?;

        writeln!(out, "\n[1/4] Loading model {}...", model_cfg.model_id)?;
        let model = self.backend.load(&model_cfg.model_id)?;

        writeln!(out, "\n[2/4] Verifying class labels...")?;
        let label_check = model
            .names
            .check(self.config.labels.class_index, &self.config.labels.expected);
        match &label_check {
            LabelCheck::Match { index, label } => {
                writeln!(out, "  Class '{}' found at index {}", label, index)?;
            }
            LabelCheck::Mismatch {
                index,
                expected,
                found,
            } => {
                warn!(index, expected = %expected, found = ?found, "Unexpected label mapping");
                writeln!(
                    out,
                    "  Warning: Expected '{}' at index {}, got {}",
                    expected,
                    index,
                    found
                        .as_deref()
                        .map(|f| format!("'{}'", f))
                        .unwrap_or_else(|| "nothing".to_string())
                )?;
                writeln!(out, "  Available classes:")?;
                for (i, name) in model.names.iter() {
                    writeln!(out, "    {}: {}", i, name)?;
                }
            }
        }

        writeln!(
            out,
            "\n[3/4] Exporting to {} ({}x{})...",
            format_name, model_cfg.image_size, model_cfg.image_size
        )?;
        writeln!(out, "  This may take a few minutes...")?;
        out.flush()?;
        let request = ExportRequest {
            format: model_cfg.format.clone(),
            image_size: model_cfg.image_size,
        };
        let export_path = self.backend.export(&model, &request)?;
        writeln!(out, "  Exported to: {}", display_opt(&export_path))?;

        writeln!(
            out,
            "\n[4/4] Moving {} file to {}/...",
            format_name,
            self.config.output.asset_dir.display()
        )?;
        let artifact = locate_artifact(
            export_path.as_deref(),
            self.config.artifact_extension(),
            &self.config.output.fallback_candidates,
            &self.config.search_base(),
        );

        let installed = match &artifact {
            Some(found) => {
                info!(origin = ?found.origin, "Located artifact {}", found.path.display());
                let installed = install_artifact(&found.path, &destination)?;
                writeln!(out, "  Copied to: {}", installed.path.display())?;
                writeln!(out, "  File size: {:.2} MB", installed.size_mib())?;
                Some(installed)
            }
            None => {
                warn!("No .{} artifact found after export", self.config.artifact_extension());
                writeln!(out, "  Error: Could not find generated {} file.", format_name)?;
                writeln!(
                    out,
                    "  Please manually copy the .{} file to {}",
                    self.config.artifact_extension(),
                    destination.display()
                )?;
                writeln!(out, "  Export path was: {}", display_opt(&export_path))?;
                None
            }
        };

        writeln!(out, "\n{}", rule)?;
        writeln!(out, "Conversion complete!")?;
        writeln!(out, "{}", rule)?;
        writeln!(out, "\nNext steps:")?;
        writeln!(out, "1. Verify the model exists at: {}", destination.display())?;
        writeln!(out, "2. Run 'flutter analyze' to check for errors")?;
        writeln!(out, "3. Test detection on a device")?;

        Ok(ConversionReport {
            label_check,
            export_path,
            artifact,
            installed,
        })
    }
}

fn display_opt(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "None".to_string())
}
