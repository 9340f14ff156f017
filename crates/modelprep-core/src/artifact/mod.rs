//! Finding the exported artifact and installing it into app assets.

mod install;
mod locate;

pub use install::{InstalledArtifact, install_artifact, mebibytes};
pub use locate::{ArtifactOrigin, LocatedArtifact, locate_artifact};
