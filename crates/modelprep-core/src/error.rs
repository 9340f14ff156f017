//! Error types for the modelprep-core library.

use thiserror::Error;

/// Main error type for the modelprep library.
#[derive(Error, Debug)]
pub enum PrepError {
    /// The Python package doing the actual conversion is not installed.
    #[error("{package} package not found")]
    MissingDependency {
        /// Package that failed to import.
        package: String,
        /// Command the user can run to install it.
        hint: String,
    },

    /// Failed to load the pre-trained model.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The export call failed.
    #[error("export failed: {0}")]
    Export(String),

    /// The backend produced output we could not interpret.
    #[error("invalid backend response: {0}")]
    InvalidResponse(String),

    /// Source and destination of a copy are the same file.
    #[error("{} is already the destination", .0.display())]
    SameFile(std::path::PathBuf),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl PrepError {
    /// Build the missing-dependency error for a pip-installable package.
    pub fn missing_package(package: &str) -> Self {
        PrepError::MissingDependency {
            package: package.to_string(),
            hint: format!("pip install {}", package),
        }
    }
}

/// Result type for the modelprep library.
pub type Result<T> = std::result::Result<T, PrepError>;
