//! Configuration structures for the conversion run.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::PrepError;

/// Main configuration for a modelprep run.
///
/// Every field has a default, so running without a config file behaves as
/// a fixed, hard-coded conversion of `yolov8n.pt` into
/// `assets/ml/yolov8n_coco.tflite`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepConfig {
    /// Source model and export settings.
    pub model: ModelSettings,

    /// Label mapping sanity check.
    pub labels: LabelSettings,

    /// Where the artifact ends up and where to look for it.
    pub output: OutputSettings,

    /// Python environment running the exporter.
    pub python: PythonSettings,
}

/// Source model and export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Model identifier passed to the loader.
    pub model_id: String,

    /// Human-readable model name for console output.
    pub display_name: String,

    /// Export format identifier (also the artifact file extension).
    pub format: String,

    /// Human-readable format name for console output.
    pub format_name: String,

    /// Square input resolution in pixels.
    pub image_size: u32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model_id: "yolov8n.pt".to_string(),
            display_name: "YOLOv8n COCO".to_string(),
            format: "tflite".to_string(),
            format_name: "TFLite".to_string(),
            // Must match inputWidth/inputHeight in the app.
            image_size: 320,
        }
    }
}

/// Label mapping sanity check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelSettings {
    /// Class index the app reads detections from.
    pub class_index: u32,

    /// Label expected at `class_index`.
    pub expected: String,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            class_index: 29,
            expected: "frisbee".to_string(),
        }
    }
}

/// Destination and fallback locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Root of the mobile app project.
    pub project_root: PathBuf,

    /// Asset directory relative to `project_root`.
    pub asset_dir: PathBuf,

    /// File name of the installed artifact.
    pub file_name: String,

    /// Conventional export locations, checked in order when the export
    /// result does not point at the artifact. Relative paths resolve
    /// against the exporter's working directory.
    pub fallback_candidates: Vec<PathBuf>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            asset_dir: PathBuf::from("assets").join("ml"),
            file_name: "yolov8n_coco.tflite".to_string(),
            fallback_candidates: vec![
                PathBuf::from("yolov8n_saved_model/yolov8n_float32.tflite"),
                PathBuf::from("yolov8n_float32.tflite"),
                PathBuf::from("yolov8n.tflite"),
            ],
        }
    }
}

/// Python environment running the exporter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PythonSettings {
    /// Interpreter executable.
    pub interpreter: PathBuf,

    /// Package providing the loader and exporter.
    pub package: String,

    /// Working directory for the exporter (default: current directory).
    pub working_dir: Option<PathBuf>,
}

impl Default for PythonSettings {
    fn default() -> Self {
        Self {
            interpreter: PathBuf::from("python3"),
            package: "ultralytics".to_string(),
            working_dir: None,
        }
    }
}

impl PrepConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Reject settings no export could satisfy.
    pub fn validate(&self) -> crate::Result<()> {
        if self.model.model_id.trim().is_empty() {
            return Err(PrepError::Config("model.model_id is empty".to_string()));
        }
        if self.model.format.trim().is_empty() {
            return Err(PrepError::Config("model.format is empty".to_string()));
        }
        if self.model.image_size == 0 {
            return Err(PrepError::Config("model.image_size must be positive".to_string()));
        }
        if self.output.file_name.trim().is_empty() {
            return Err(PrepError::Config("output.file_name is empty".to_string()));
        }
        Ok(())
    }

    /// Directory the artifact is installed into.
    pub fn destination_dir(&self) -> PathBuf {
        self.output.project_root.join(&self.output.asset_dir)
    }

    /// Full path of the installed artifact.
    pub fn destination_path(&self) -> PathBuf {
        self.destination_dir().join(&self.output.file_name)
    }

    /// Extension of the exported artifact, without the dot.
    pub fn artifact_extension(&self) -> &str {
        &self.model.format
    }

    /// Directory relative fallback candidates resolve against.
    pub fn search_base(&self) -> PathBuf {
        self.python
            .working_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
