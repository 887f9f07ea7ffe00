use std::path::PathBuf;
use thiserror::Error;

/// Errors from the dist fixers
#[derive(Error, Debug)]
pub enum DistError {
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Export target {} is outside the package directory {}", path.display(), package_dir.display())]
    OutsidePackage { path: PathBuf, package_dir: PathBuf },

    #[error("Failed to parse manifest {}: {reason}", path.display())]
    ManifestParse { path: PathBuf, reason: String },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DistError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
