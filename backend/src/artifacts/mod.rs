pub mod card;
pub mod preprocessing;

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Missing {kind} at {}", .path.display())]
    MissingArtifact { kind: &'static str, path: PathBuf },
    #[error("Invalid preprocessing config: {0}")]
    InvalidConfig(String),
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to load model: {0}")]
    ModelLoad(String),
}

/// Fails with `MissingArtifact` unless `path` points at an existing file.
pub fn require_file(kind: &'static str, path: &Path) -> Result<(), ArtifactError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ArtifactError::MissingArtifact {
            kind,
            path: path.to_path_buf(),
        })
    }
}

pub(crate) fn read_to_string(path: &Path) -> Result<String, ArtifactError> {
    std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}
