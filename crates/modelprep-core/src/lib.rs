//! Core library for preparing the on-device detection model.
//!
//! This crate provides:
//! - An export backend abstraction with an `ultralytics` implementation
//! - Label mapping verification for the class the app relies on
//! - Artifact discovery after export and installation into app assets
//! - The [`Converter`] driver tying the steps together

pub mod artifact;
pub mod backend;
pub mod converter;
pub mod error;
pub mod models;

pub use artifact::{ArtifactOrigin, InstalledArtifact, LocatedArtifact, install_artifact, locate_artifact};
pub use backend::{ExportBackend, ExportRequest, UltralyticsBackend};
pub use converter::{ConversionReport, Converter};
pub use error::{PrepError, Result};
pub use models::config::PrepConfig;
pub use models::handle::{LabelCheck, LabelMap, ModelHandle};
