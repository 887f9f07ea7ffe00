//! ESM import extension fixer
//!
//! Node's ESM loader needs explicit file extensions on relative specifiers.
//! This pass appends them to `import … from './x'` and `export … from './x'`
//! in compiled output.

use regex::{Captures, Regex};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use walkdir::WalkDir;

use crate::error::DistError;

/// `import`/`export` … `from` followed by a quoted relative specifier
static FROM_SPECIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\b(?:import|export)\b[^'";]*?\bfrom\s*['"])(\.{1,2}/[^'"]+)(['"])"#)
        .expect("valid specifier regex")
});

/// Extension appended to relative specifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ImportExtension {
    Js,
    Ts,
}

impl ImportExtension {
    pub fn as_str(self) -> &'static str {
        match self {
            ImportExtension::Js => ".js",
            ImportExtension::Ts => ".ts",
        }
    }

    /// Specifier endings that are left alone
    fn already_suffixed(self) -> &'static [&'static str] {
        match self {
            ImportExtension::Js => &[".js", ".mjs", ".json"],
            ImportExtension::Ts => &[".ts", ".json"],
        }
    }

    fn applies_to(self, path: &Path) -> bool {
        path.file_name()
            .map(|name| name.to_string_lossy().ends_with(self.as_str()))
            .unwrap_or(false)
    }
}

impl std::fmt::Display for ImportExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportFixSummary {
    pub files_scanned: usize,
    pub files_changed: usize,
    pub specifiers_rewritten: usize,
}

/// Rewrite relative specifiers in one source text.
///
/// Returns the new text and the number of specifiers changed.
pub fn rewrite_specifiers(source: &str, ext: ImportExtension) -> (String, usize) {
    let mut rewritten = 0;
    let out = FROM_SPECIFIER.replace_all(source, |caps: &Captures| {
        let specifier = &caps[2];
        if ext.already_suffixed().iter().any(|s| specifier.ends_with(s)) {
            return caps[0].to_string();
        }
        rewritten += 1;
        format!("{}{}{}{}", &caps[1], specifier, ext.as_str(), &caps[3])
    });
    (out.into_owned(), rewritten)
}

/// Append `ext` to relative specifiers in every matching file under `dir`
pub fn fix_import_extensions(dir: &Path, ext: ImportExtension) -> Result<ImportFixSummary, DistError> {
    if !dir.is_dir() {
        return Err(DistError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut summary = ImportFixSummary::default();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            DistError::io(path, e.into())
        })?;
        if !entry.file_type().is_file() || !ext.applies_to(entry.path()) {
            continue;
        }

        let path = entry.path();
        let source = fs::read_to_string(path).map_err(|e| DistError::io(path, e))?;
        summary.files_scanned += 1;

        let (updated, count) = rewrite_specifiers(&source, ext);
        if count == 0 || updated == source {
            continue;
        }

        fs::write(path, updated).map_err(|e| DistError::io(path, e))?;
        tracing::debug!(file = %path.display(), specifiers = count, "imports rewritten");
        summary.files_changed += 1;
        summary.specifiers_rewritten += count;
    }

    tracing::info!(
        dir = %dir.display(),
        scanned = summary.files_scanned,
        changed = summary.files_changed,
        "import extensions fixed"
    );

    Ok(summary)
}
