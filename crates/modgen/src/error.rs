use std::path::PathBuf;
use thiserror::Error;

/// Errors from template resolution and module generation
#[derive(Error, Debug)]
pub enum ModuleError {
    #[error("Error loading template \"{template}\": generator \"{generator}\" not found")]
    TemplateLoad { template: String, generator: String },

    #[error("Unsafe file path: {0}")]
    UnsafePath(String),

    #[error("Module \"{module}\" already exists at {}", path.display())]
    ModuleAlreadyExists { module: String, path: PathBuf },

    #[error("Invalid module name: \"{0}\"")]
    InvalidModuleName(String),

    #[error("Cannot register module in {}: {reason}", path.display())]
    Registration { path: PathBuf, reason: String },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ModuleError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
