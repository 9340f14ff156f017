//! Locating the exported artifact on disk.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

/// Where a located artifact was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactOrigin {
    /// The export result was the artifact itself.
    ExportResult,
    /// Found inside the directory the export returned.
    ExportDirectory,
    /// Found at one of the conventional fallback paths.
    Fallback,
}

/// An artifact that exists on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedArtifact {
    pub path: PathBuf,
    pub origin: ArtifactOrigin,
}

/// Find the artifact produced by an export.
///
/// Checks, in order:
/// 1. `export_path` itself, when it carries `extension`
/// 2. files directly inside `export_path`, when it is a directory
///    (non-recursive, first match in file-name order)
/// 3. each of `fallbacks`, relative ones resolved against `base`
///
/// Only paths that exist are returned.
pub fn locate_artifact(
    export_path: Option<&Path>,
    extension: &str,
    fallbacks: &[PathBuf],
    base: &Path,
) -> Option<LocatedArtifact> {
    let found = export_path.and_then(|path| from_export(path, extension));

    found
        .or_else(|| {
            fallbacks
                .iter()
                .map(|candidate| base.join(candidate))
                .inspect(|candidate| trace!("Checking fallback {}", candidate.display()))
                .find(|candidate| candidate.exists())
                .map(|path| LocatedArtifact {
                    path,
                    origin: ArtifactOrigin::Fallback,
                })
        })
        .filter(|artifact| artifact.path.exists())
}

fn from_export(path: &Path, extension: &str) -> Option<LocatedArtifact> {
    if has_extension(path, extension) {
        debug!("Export result is the artifact: {}", path.display());
        return Some(LocatedArtifact {
            path: path.to_path_buf(),
            origin: ArtifactOrigin::ExportResult,
        });
    }

    if path.is_dir() {
        debug!("Searching export directory {}", path.display());
        return first_in_dir(path, extension).map(|path| LocatedArtifact {
            path,
            origin: ArtifactOrigin::ExportDirectory,
        });
    }

    None
}

fn first_in_dir(dir: &Path, extension: &str) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;

    let mut matches: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| has_extension(path, extension))
        .collect();
    matches.sort();
    matches.into_iter().next()
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().map(|e| e == extension).unwrap_or(false)
}
