//! Exports synthesizer
//!
//! Scans a declarations root such as `dist/dts` and rebuilds the
//! package.json `exports` map and its `typesVersions` fallback:
//!
//! - `.` points at `index.d.ts` plus the sibling `esm`/`cjs` entry points
//! - every first-level module with a types file gets `./<module>/types`
//! - every `*.d.ts` inside a folder matched by an [`ExportRule`] gets
//!   `./<pattern>/<name>` with `types`, `import` and `require`
//!
//! Keys are emitted in sorted order so repeated runs produce identical
//! manifests.

use devscripts_core::paths::{relative_to, to_export_path};
use devscripts_core::{ExportRule, ExportTarget, FixExportsConfig, Paths};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::error::DistError;
use crate::manifest::Manifest;

const DTS_SUFFIX: &str = ".d.ts";

/// Inputs of a synthesis run
#[derive(Debug, Clone)]
pub struct ExportsOptions {
    /// Compiled type declarations, one subdirectory per module
    pub dts_root: PathBuf,
    pub manifest_path: PathBuf,
    /// File names tried in order inside each module directory
    pub type_file_candidates: Vec<String>,
    pub extra_patterns: Vec<ExportRule>,
    /// Entries added verbatim after the computed ones
    pub extra_static: BTreeMap<String, ExportTarget>,
}

impl ExportsOptions {
    /// Options with the default candidates and patterns. Relative paths
    /// are resolved against the project root.
    pub fn new(paths: &Paths, dts_root: impl AsRef<Path>, manifest_path: impl AsRef<Path>) -> Self {
        let defaults = FixExportsConfig::default();
        Self {
            dts_root: paths.resolve(dts_root),
            manifest_path: paths.resolve(manifest_path),
            type_file_candidates: defaults.type_file_candidates,
            extra_patterns: defaults.extra_patterns,
            extra_static: defaults.extra_static,
        }
    }

    /// Options from the `fix_exports` config section, with relative paths
    /// resolved against the project root
    pub fn from_config(paths: &Paths, config: &FixExportsConfig) -> Self {
        Self {
            dts_root: paths.resolve(&config.dist_path),
            manifest_path: paths.resolve(&config.package_json_path),
            type_file_candidates: config.type_file_candidates.clone(),
            extra_patterns: config.extra_patterns.clone(),
            extra_static: config.extra_static.clone(),
        }
    }

    /// Directory emitted paths are relative to
    fn base_dir(&self) -> &Path {
        self.manifest_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }
}

/// A module whose types file was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModule {
    pub name: String,
    /// Export path of the types file, e.g. `./dist/dts/a/types.d.ts`
    pub types: String,
}

/// A declaration file found through an [`ExportRule`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub pattern: String,
    /// File name without `.d.ts`
    pub name: String,
    pub target: ExportTarget,
}

impl PatternMatch {
    pub fn key(&self) -> String {
        format!("./{}/{}", self.pattern, self.name)
    }
}

/// Everything a synthesis run computed, before it is written
#[derive(Debug, Clone)]
pub struct ExportsPlan {
    pub exports: Map<String, Value>,
    /// Contents of `typesVersions["*"]`
    pub types_versions: Map<String, Value>,
    pub modules: Vec<ResolvedModule>,
    pub matches: Vec<PatternMatch>,
}

impl ExportsPlan {
    pub fn exports_value(&self) -> Value {
        Value::Object(self.exports.clone())
    }

    pub fn types_versions_value(&self) -> Value {
        let mut outer = Map::new();
        outer.insert("*".to_string(), Value::Object(self.types_versions.clone()));
        Value::Object(outer)
    }
}

/// Compute the exports map without touching the manifest
pub fn synthesize(options: &ExportsOptions) -> Result<ExportsPlan, DistError> {
    let dts_root = &options.dts_root;
    if !dts_root.is_dir() {
        return Err(DistError::DirectoryNotFound(dts_root.clone()));
    }

    let base = options.base_dir();
    let export_path = |path: &Path| package_path(path, base);

    let esm_root = sibling_root(dts_root, "esm");
    let cjs_root = sibling_root(dts_root, "cjs");

    let mut exports = Map::new();
    exports.insert(
        "./package.json".to_string(),
        Value::String("./package.json".to_string()),
    );
    exports.insert(
        ".".to_string(),
        target_value(&ExportTarget {
            types: Some(export_path(&dts_root.join("index.d.ts"))?),
            import: Some(export_path(&esm_root.join("index.js"))?),
            require: Some(export_path(&cjs_root.join("index.js"))?),
            default: None,
        }),
    );

    let mut types_versions = Map::new();

    let mut modules = Vec::new();
    for module in module_dirs(dts_root)? {
        let found = options
            .type_file_candidates
            .iter()
            .map(|candidate| dts_root.join(&module).join(candidate))
            .find(|path| path.is_file());

        let Some(types_file) = found else {
            tracing::debug!(module = %module, "no types file");
            continue;
        };

        let types = export_path(&types_file)?;
        exports.insert(
            format!("./{}/types", module),
            target_value(&ExportTarget {
                types: Some(types.clone()),
                default: Some(types.clone()),
                ..Default::default()
            }),
        );
        types_versions.insert(format!("{}/types", module), version_paths(&types));
        modules.push(ResolvedModule { name: module, types });
    }

    let mut matches = Vec::new();
    for rule in &options.extra_patterns {
        for file in walk_for_folder(dts_root, &rule.folder_name)? {
            let Some(inner) = file.strip_prefix(dts_root).ok().map(Path::to_path_buf) else {
                continue;
            };
            let name = file_stem_dts(&file);
            let js = inner.with_file_name(format!("{}.js", name));

            let matched = PatternMatch {
                pattern: rule.pattern.clone(),
                name,
                target: ExportTarget {
                    types: Some(export_path(&file)?),
                    import: Some(export_path(&esm_root.join(&js))?),
                    require: Some(export_path(&cjs_root.join(&js))?),
                    default: None,
                },
            };

            let key = matched.key();
            if exports.contains_key(&key) {
                tracing::warn!(key = %key, file = %file.display(), "export key already taken, replacing");
            }
            exports.insert(key, target_value(&matched.target));
            if let Some(ref types) = matched.target.types {
                types_versions.insert(format!("{}/{}", matched.pattern, matched.name), version_paths(types));
            }
            matches.push(matched);
        }
    }

    for (key, target) in &options.extra_static {
        exports.insert(key.clone(), target_value(target));
        if let Some(ref types) = target.types {
            types_versions.insert(strip_dot_slash(key).to_string(), version_paths(types));
        }
    }

    tracing::info!(
        modules = modules.len(),
        patterns = matches.len(),
        root = %dts_root.display(),
        "exports synthesized"
    );

    Ok(ExportsPlan {
        exports,
        types_versions,
        modules,
        matches,
    })
}

/// Synthesize the exports map and write it into the manifest.
///
/// The manifest is only written once everything has been computed.
pub fn fix_type_exports(options: &ExportsOptions) -> Result<ExportsPlan, DistError> {
    let plan = synthesize(options)?;

    let mut manifest = Manifest::load(&options.manifest_path)?;
    manifest.set("exports", plan.exports_value());
    manifest.set("typesVersions", plan.types_versions_value());
    manifest.save()?;

    Ok(plan)
}

/// Export path of `path` relative to the package directory.
///
/// Targets must stay inside the package, so anything that would need a
/// leading `..` is rejected.
fn package_path(path: &Path, package_dir: &Path) -> Result<String, DistError> {
    let rel = relative_to(path, package_dir);
    match rel.components().next() {
        Some(Component::Normal(_)) => Ok(to_export_path(&rel)),
        _ => Err(DistError::OutsidePackage {
            path: path.to_path_buf(),
            package_dir: package_dir.to_path_buf(),
        }),
    }
}

/// `dist/dts` -> `dist/esm`
fn sibling_root(dts_root: &Path, name: &str) -> PathBuf {
    match dts_root.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

/// First-level subdirectories, sorted by name
fn module_dirs(dts_root: &Path) -> Result<Vec<String>, DistError> {
    let mut modules = Vec::new();
    for entry in WalkDir::new(dts_root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| walk_error(dts_root, e))?;
        if entry.file_type().is_dir() {
            modules.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(modules)
}

/// `*.d.ts` files directly inside every directory named `folder_name`.
///
/// A matched directory is not descended into further.
fn walk_for_folder(dts_root: &Path, folder_name: &str) -> Result<Vec<PathBuf>, DistError> {
    let mut found = Vec::new();
    let mut walker = WalkDir::new(dts_root).min_depth(1).sort_by_file_name().into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry.map_err(|e| walk_error(dts_root, e))?;
        if !entry.file_type().is_dir() || entry.file_name() != folder_name {
            continue;
        }

        for file in WalkDir::new(entry.path())
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let file = file.map_err(|e| walk_error(entry.path(), e))?;
            let is_dts = file.file_name().to_string_lossy().ends_with(DTS_SUFFIX);
            if file.file_type().is_file() && is_dts {
                found.push(file.into_path());
            }
        }

        walker.skip_current_dir();
    }

    Ok(found)
}

fn file_stem_dts(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.strip_suffix(DTS_SUFFIX).unwrap_or(&name).to_string()
}

fn strip_dot_slash(path: &str) -> &str {
    path.strip_prefix("./").unwrap_or(path)
}

fn version_paths(types: &str) -> Value {
    Value::Array(vec![Value::String(strip_dot_slash(types).to_string())])
}

/// Serialize a target with a fixed key order
fn target_value(target: &ExportTarget) -> Value {
    let mut map = Map::new();
    let fields = [
        ("types", &target.types),
        ("import", &target.import),
        ("require", &target.require),
        ("default", &target.default),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            map.insert(key.to_string(), Value::String(value.clone()));
        }
    }
    Value::Object(map)
}

fn walk_error(root: &Path, err: walkdir::Error) -> DistError {
    let path = err.path().unwrap_or(root).to_path_buf();
    DistError::io(path, err.into())
}
