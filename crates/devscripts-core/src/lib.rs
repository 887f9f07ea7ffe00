//! devscripts core - shared functionality for all devscripts tools
//!
//! Configuration loading, project path handling and output formatting
//! used by `modgen` and `distfix`.

pub mod config;
pub mod format;
pub mod paths;

pub use config::{Config, CustomTemplate, ExportRule, ExportTarget, FileEntry, FixExportsConfig, ModuleConfig};
pub use paths::Paths;
