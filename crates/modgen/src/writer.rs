//! Module writer
//!
//! Materializes a template's files under a module root. Every path is
//! validated before the first write, so a single unsafe entry rejects the
//! whole batch with nothing on disk.

use devscripts_core::paths::normalize;
use devscripts_core::FileEntry;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::ModuleError;
use crate::template::Template;

/// Callbacks around module generation
pub trait ModuleHooks {
    /// Called after validation, before the first file is written
    fn on_generate(&self, _module_name: &str) {}

    /// Called once every file has been written
    fn on_complete(&self, _module_name: &str) {}
}

/// Hooks that do nothing
pub struct NoHooks;

impl ModuleHooks for NoHooks {}

/// What to generate and where
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub module_name: String,
    pub destination: PathBuf,
    /// Put files in `destination/module_name` instead of `destination`
    pub create_subfolder: bool,
    /// Write even if the module root already exists
    pub overwrite: bool,
}

impl GenerationRequest {
    pub fn new(module_name: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            module_name: module_name.into(),
            destination: destination.into(),
            create_subfolder: true,
            overwrite: false,
        }
    }

    pub fn create_subfolder(mut self, create_subfolder: bool) -> Self {
        self.create_subfolder = create_subfolder;
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Directory the files are written under
    pub fn module_root(&self) -> PathBuf {
        if self.create_subfolder {
            self.destination.join(&self.module_name)
        } else {
            self.destination.clone()
        }
    }
}

/// Result of a successful generation
#[derive(Debug, Clone)]
pub struct GeneratedModule {
    pub module_name: String,
    pub root: PathBuf,
    /// Written files, in template order
    pub files: Vec<PathBuf>,
}

/// Generate a module from a template.
///
/// Fails with [`ModuleError::ModuleAlreadyExists`] without touching the
/// filesystem when the module root exists and `overwrite` is not set.
pub fn generate_module(
    request: &GenerationRequest,
    template: &Template,
    hooks: &dyn ModuleHooks,
) -> Result<GeneratedModule, ModuleError> {
    validate_module_name(&request.module_name)?;

    let root = request.module_root();
    if root.exists() && !request.overwrite {
        return Err(ModuleError::ModuleAlreadyExists {
            module: request.module_name.clone(),
            path: root,
        });
    }

    let files = template.files(&request.module_name);
    let planned = plan(&files)?;

    hooks.on_generate(&request.module_name);

    let written = write_planned(&root, &planned)?;
    tracing::info!(
        module = %request.module_name,
        root = %root.display(),
        files = written.len(),
        "module generated"
    );

    hooks.on_complete(&request.module_name);

    Ok(GeneratedModule {
        module_name: request.module_name.clone(),
        root,
        files: written,
    })
}

/// Validate every entry, then write them all under `root`
pub fn write_files(root: &Path, files: &[FileEntry]) -> Result<Vec<PathBuf>, ModuleError> {
    let planned = plan(files)?;
    write_planned(root, &planned)
}

/// Normalize a template path and refuse anything outside the module root
pub fn safe_relative_path(path: &str) -> Result<PathBuf, ModuleError> {
    let raw = Path::new(path);
    let unsafe_path = || ModuleError::UnsafePath(path.to_string());

    if raw.is_absolute() || raw.has_root() {
        return Err(unsafe_path());
    }

    let normalized = normalize(raw);
    match normalized.components().next() {
        None | Some(Component::ParentDir) => Err(unsafe_path()),
        Some(_) => Ok(normalized),
    }
}

fn validate_module_name(name: &str) -> Result<(), ModuleError> {
    let mut components = Path::new(name).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );

    if name.trim().is_empty() || name.trim() != name || !single_normal {
        return Err(ModuleError::InvalidModuleName(name.to_string()));
    }
    Ok(())
}

fn plan(files: &[FileEntry]) -> Result<Vec<(PathBuf, &str)>, ModuleError> {
    files
        .iter()
        .map(|entry| Ok((safe_relative_path(&entry.path)?, entry.content.as_str())))
        .collect()
}

fn write_planned(root: &Path, planned: &[(PathBuf, &str)]) -> Result<Vec<PathBuf>, ModuleError> {
    fs::create_dir_all(root).map_err(|e| ModuleError::io(root, e))?;

    let mut written = Vec::with_capacity(planned.len());
    for (rel, content) in planned {
        let full_path = root.join(rel);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ModuleError::io(parent, e))?;
        }

        fs::write(&full_path, content).map_err(|e| ModuleError::io(&full_path, e))?;
        tracing::debug!(file = %full_path.display(), "wrote");

        written.push(full_path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::tempdir;

    struct RecordingHooks {
        events: RefCell<Vec<String>>,
    }

    impl RecordingHooks {
        fn new() -> Self {
            Self {
                events: RefCell::new(Vec::new()),
            }
        }
    }

    impl ModuleHooks for RecordingHooks {
        fn on_generate(&self, module_name: &str) {
            self.events.borrow_mut().push(format!("generate:{module_name}"));
        }

        fn on_complete(&self, module_name: &str) {
            self.events.borrow_mut().push(format!("complete:{module_name}"));
        }
    }

    fn widget_template() -> Template {
        Template::Static(vec![FileEntry::new("index.ts", "// x")])
    }

    #[test]
    fn test_generate_into_subfolder_then_refuse_second_run() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        let request = GenerationRequest::new("widget", &out);

        let module = generate_module(&request, &widget_template(), &NoHooks).unwrap();
        let index = out.join("widget/index.ts");
        assert_eq!(module.files, vec![index.clone()]);
        assert_eq!(fs::read_to_string(&index).unwrap(), "// x");

        fs::write(&index, "// edited").unwrap();
        let err = generate_module(&request, &widget_template(), &NoHooks).unwrap_err();

        assert!(matches!(err, ModuleError::ModuleAlreadyExists { ref module, .. } if module == "widget"));
        assert_eq!(fs::read_to_string(&index).unwrap(), "// edited");
    }

    #[test]
    fn test_existing_module_skips_hooks() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("widget")).unwrap();
        fs::write(dir.path().join("widget/keep.ts"), "keep").unwrap();

        let hooks = RecordingHooks::new();
        let request = GenerationRequest::new("widget", dir.path());
        assert!(generate_module(&request, &widget_template(), &hooks).is_err());

        assert!(hooks.events.borrow().is_empty());
        assert!(!dir.path().join("widget/index.ts").exists());
    }

    #[test]
    fn test_overwrite_replaces_files() {
        let dir = tempdir().unwrap();
        let request = GenerationRequest::new("widget", dir.path());
        generate_module(&request, &widget_template(), &NoHooks).unwrap();

        let updated = Template::Static(vec![FileEntry::new("index.ts", "// y")]);
        generate_module(&request.clone().overwrite(true), &updated, &NoHooks).unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("widget/index.ts")).unwrap(), "// y");
    }

    #[test]
    fn test_unsafe_entry_rejects_whole_batch() {
        let dir = tempdir().unwrap();
        let template = Template::Static(vec![
            FileEntry::new("a.ts", "a"),
            FileEntry::new("nested/b.ts", "b"),
            FileEntry::new("../escape.ts", "nope"),
            FileEntry::new("c.ts", "c"),
        ]);

        let hooks = RecordingHooks::new();
        let request = GenerationRequest::new("widget", dir.path());
        let err = generate_module(&request, &template, &hooks).unwrap_err();

        assert!(matches!(err, ModuleError::UnsafePath(ref p) if p == "../escape.ts"));
        assert!(!dir.path().join("widget").exists());
        assert!(!dir.path().join("escape.ts").exists());
        assert!(hooks.events.borrow().is_empty());
    }

    #[test]
    fn test_absolute_entry_rejected() {
        let dir = tempdir().unwrap();
        let files = vec![FileEntry::new("ok.ts", ""), FileEntry::new("/etc/passwd", "")];

        assert!(matches!(
            write_files(dir.path(), &files),
            Err(ModuleError::UnsafePath(_))
        ));
        assert!(!dir.path().join("ok.ts").exists());
    }

    #[test]
    fn test_safe_relative_path() {
        assert_eq!(safe_relative_path("a/./b.ts").unwrap(), PathBuf::from("a/b.ts"));
        assert_eq!(safe_relative_path("a/../b.ts").unwrap(), PathBuf::from("b.ts"));
        assert!(safe_relative_path("a/../../b.ts").is_err());
        assert!(safe_relative_path("..").is_err());
        assert!(safe_relative_path(".").is_err());
        assert!(safe_relative_path("").is_err());
        assert!(safe_relative_path("/abs.ts").is_err());
    }

    #[test]
    fn test_nested_directories_created() {
        let dir = tempdir().unwrap();
        let template = Template::Static(vec![FileEntry::new("deep/er/file.ts", "ok")]);
        let request = GenerationRequest::new("widget", dir.path());

        generate_module(&request, &template, &NoHooks).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("widget/deep/er/file.ts")).unwrap(),
            "ok"
        );
    }

    #[test]
    fn test_without_subfolder_writes_into_destination() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("src/features");
        let template = Template::generator(|name| vec![FileEntry::new(format!("{name}.ts"), name)]);
        let request = GenerationRequest::new("cart", &dest).create_subfolder(false);

        let module = generate_module(&request, &template, &NoHooks).unwrap();
        assert_eq!(module.root, dest);
        assert_eq!(fs::read_to_string(dest.join("cart.ts")).unwrap(), "cart");
    }

    #[test]
    fn test_hooks_run_in_order() {
        let dir = tempdir().unwrap();
        let hooks = RecordingHooks::new();
        let request = GenerationRequest::new("widget", dir.path());

        generate_module(&request, &widget_template(), &hooks).unwrap();
        assert_eq!(
            *hooks.events.borrow(),
            vec!["generate:widget".to_string(), "complete:widget".to_string()]
        );
    }

    #[test]
    fn test_invalid_module_names() {
        let dir = tempdir().unwrap();
        for name in ["", "  ", "../up", "a/b", " padded"] {
            let request = GenerationRequest::new(name, dir.path());
            let err = generate_module(&request, &widget_template(), &NoHooks).unwrap_err();
            assert!(matches!(err, ModuleError::InvalidModuleName(_)), "{name:?}");
        }
    }

    #[test]
    fn test_static_template_is_deterministic() {
        let dir = tempdir().unwrap();
        let template = Template::Static(vec![
            FileEntry::new("index.ts", "export * from './a';\n"),
            FileEntry::new("a.ts", "export const a = 1;\n"),
        ]);

        for run in ["one", "two"] {
            let request = GenerationRequest::new("m", dir.path().join(run));
            generate_module(&request, &template, &NoHooks).unwrap();
        }

        for file in ["index.ts", "a.ts"] {
            assert_eq!(
                fs::read(dir.path().join("one/m").join(file)).unwrap(),
                fs::read(dir.path().join("two/m").join(file)).unwrap()
            );
        }
    }
}
