//! Configuration management for devscripts tools
//!
//! The config file is plain JSON. Every section and field is optional;
//! missing values fall back to the defaults below.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::paths::Paths;

/// Project-level devscripts configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Module generator settings
    #[serde(default)]
    pub module: ModuleConfig,

    /// Exports synthesizer settings
    #[serde(default)]
    pub fix_exports: FixExportsConfig,
}

/// A single file to generate inside a module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path relative to the module root
    #[serde(alias = "name")]
    pub path: String,

    /// File content
    #[serde(default)]
    pub content: String,
}

impl FileEntry {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// User-defined template from the config file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CustomTemplate {
    #[serde(default)]
    pub description: String,

    /// Destination used when none is given on the command line
    #[serde(default)]
    pub destination: Option<String>,

    /// Whether files go into a folder named after the module
    #[serde(default)]
    pub create_folder: Option<bool>,

    /// Files to generate; may contain `{{PLACEHOLDER}}` variables
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

/// Module generator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// Directory where modules are generated
    #[serde(default = "default_destination")]
    pub destination: String,

    /// Template used when none is given on the command line
    #[serde(default)]
    pub template: Option<String>,

    /// Overwrite an existing module directory
    #[serde(default)]
    pub force: bool,

    /// Generate files inside a folder named after the module
    #[serde(default)]
    pub create_folder: Option<bool>,

    #[serde(default)]
    pub custom_templates: BTreeMap<String, CustomTemplate>,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            destination: default_destination(),
            template: None,
            force: false,
            create_folder: None,
            custom_templates: BTreeMap::new(),
        }
    }
}

fn default_destination() -> String {
    "src/app/modules".to_string()
}

/// Scan rule for auxiliary subpath groups such as plugins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRule {
    /// Prefix of the public export key
    pub pattern: String,

    /// Directory name to look for under the declarations root
    pub folder_name: String,
}

impl ExportRule {
    pub fn new(pattern: impl Into<String>, folder_name: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            folder_name: folder_name.into(),
        }
    }
}

/// One entry of a package.json `exports` map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ExportTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// Exports synthesizer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixExportsConfig {
    /// Directory holding the compiled `.d.ts` output
    #[serde(default = "default_dist_path")]
    pub dist_path: String,

    #[serde(default = "default_package_json_path")]
    pub package_json_path: String,

    /// File names treated as a module's types entry, in priority order
    #[serde(default = "default_type_file_candidates")]
    pub type_file_candidates: Vec<String>,

    #[serde(default = "default_extra_patterns")]
    pub extra_patterns: Vec<ExportRule>,

    /// Entries merged verbatim into the exports map
    #[serde(default)]
    pub extra_static: BTreeMap<String, ExportTarget>,
}

impl Default for FixExportsConfig {
    fn default() -> Self {
        Self {
            dist_path: default_dist_path(),
            package_json_path: default_package_json_path(),
            type_file_candidates: default_type_file_candidates(),
            extra_patterns: default_extra_patterns(),
            extra_static: BTreeMap::new(),
        }
    }
}

fn default_dist_path() -> String {
    "dist/dts".to_string()
}

fn default_package_json_path() -> String {
    "package.json".to_string()
}

fn default_type_file_candidates() -> Vec<String> {
    vec!["types.d.ts".to_string(), "interfaces.d.ts".to_string()]
}

fn default_extra_patterns() -> Vec<ExportRule> {
    vec![ExportRule::new("plugins", "plugins")]
}

impl Config {
    /// Load config from file
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Find and load the first config file for this project.
    ///
    /// Returns the path that was loaded, or `None` when defaults are used.
    pub fn discover(paths: &Paths) -> Result<(Self, Option<PathBuf>)> {
        match paths.config_candidates().into_iter().find(|p| p.is_file()) {
            Some(path) => {
                tracing::debug!(config = %path.display(), "loading config");
                Ok((Self::load(&path)?, Some(path)))
            }
            None => Ok((Self::default(), None)),
        }
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
