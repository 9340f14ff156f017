//! Copying the artifact into the app's asset directory.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{PrepError, Result};

/// An artifact copied to its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledArtifact {
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl InstalledArtifact {
    /// Size in mebibytes.
    pub fn size_mib(&self) -> f64 {
        mebibytes(self.size_bytes)
    }
}

/// Copy `source` to `destination`, creating parent directories.
///
/// Overwrites an existing destination. Permissions and modification time
/// are carried over from the source. Fails with [`PrepError::SameFile`]
/// when both paths name the same file.
pub fn install_artifact(source: &Path, destination: &Path) -> Result<InstalledArtifact> {
    // fs::copy truncates the destination before reading the source.
    if destination.exists() && fs::canonicalize(source)? == fs::canonicalize(destination)? {
        return Err(PrepError::SameFile(destination.to_path_buf()));
    }

    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating {}", parent.display());
            fs::create_dir_all(parent)?;
        }
    }

    // fs::copy carries permissions but not timestamps.
    let size_bytes = fs::copy(source, destination)?;
    let modified = fs::metadata(source)?.modified()?;
    File::options()
        .write(true)
        .open(destination)?
        .set_modified(modified)?;

    info!(
        "Copied {} -> {} ({} bytes)",
        source.display(),
        destination.display(),
        size_bytes
    );

    Ok(InstalledArtifact {
        path: destination.to_path_buf(),
        size_bytes,
    })
}

/// Convert a byte count to mebibytes.
pub fn mebibytes(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}
