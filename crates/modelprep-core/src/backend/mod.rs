//! Export backend implementations.

pub mod ultralytics;

pub use ultralytics::UltralyticsBackend;

use std::path::PathBuf;

use crate::{ModelHandle, Result};

/// Parameters of a single export call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    /// Target format identifier, e.g. `tflite`.
    pub format: String,
    /// Square input resolution in pixels.
    pub image_size: u32,
}

/// Trait for model loading and export backends.
///
/// This trait abstracts over the library that owns the model, so the
/// conversion driver can run against the real exporter or a stub.
pub trait ExportBackend {
    /// Check that the backend's dependencies are installed.
    ///
    /// Returns [`crate::PrepError::MissingDependency`] when they are not.
    fn ensure_available(&self) -> Result<()>;

    /// Load a pre-trained model by identifier.
    fn load(&self, model_id: &str) -> Result<ModelHandle>;

    /// Export a loaded model.
    ///
    /// Implementations must export the model `model` describes, not
    /// whatever `model.model_id` resolves to at export time.
    ///
    /// # Returns
    /// The path the exporter reported, which may be the artifact itself or
    /// a directory containing it. `None` when the exporter reported nothing.
    fn export(&self, model: &ModelHandle, request: &ExportRequest) -> Result<Option<PathBuf>>;
}
