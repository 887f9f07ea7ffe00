//! Standard paths used by devscripts tools

use std::path::{Component, Path, PathBuf};

/// Config file names looked up in the project root, in order
pub const CONFIG_FILE_NAMES: &[&str] = &["devscripts.config.json", ".devscripts.json"];

/// Standard devscripts paths
pub struct Paths {
    /// Project root (usually the current directory)
    pub root: PathBuf,
    /// User config directory (~/.config/devscripts)
    pub user_config: Option<PathBuf>,
}

impl Paths {
    /// Paths rooted at the current directory
    pub fn new() -> std::io::Result<Self> {
        let root = std::env::current_dir()?;
        let user_config = dirs::config_dir().map(|d| d.join("devscripts"));
        Ok(Self { root, user_config })
    }

    /// Paths rooted at `root`, without a user-level config fallback
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            user_config: None,
        }
    }

    /// Config files to try, most specific first
    pub fn config_candidates(&self) -> Vec<PathBuf> {
        let mut candidates: Vec<PathBuf> = CONFIG_FILE_NAMES
            .iter()
            .map(|name| self.root.join(name))
            .collect();

        if let Some(ref dir) = self.user_config {
            candidates.push(dir.join("config.json"));
        }

        candidates
    }

    /// Resolve a possibly relative path against the project root
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            normalize(path)
        } else {
            normalize(&self.root.join(path))
        }
    }
}

/// Lexically normalize a path: drop `.` and fold `name/..` pairs.
///
/// Leading `..` components that cannot be folded are kept. Nothing touches
/// the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    out.iter().map(|c| c.as_os_str()).collect()
}

/// Path of `target` relative to `base`, both lexically normalized.
///
/// Walks up with `..` where `target` is not below `base`.
pub fn relative_to(target: &Path, base: &Path) -> PathBuf {
    let target = normalize(target);
    let base = normalize(base);

    let target_parts: Vec<_> = target.components().collect();
    let base_parts: Vec<_> = base.components().collect();

    let common = target_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..base_parts.len() {
        rel.push("..");
    }
    for part in &target_parts[common..] {
        rel.push(part.as_os_str());
    }
    rel
}

/// Render a relative path the way package.json expects: forward slashes
/// and a leading `./` unless it already walks upward.
pub fn to_export_path(rel: &Path) -> String {
    let joined = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");

    if joined.is_empty() {
        ".".to_string()
    } else if joined.starts_with("../") || joined == ".." {
        joined
    } else {
        format!("./{}", joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("a/./b/../c")), PathBuf::from("a/c"));
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(normalize(Path::new("/x/../../y")), PathBuf::from("/y"));
        assert_eq!(normalize(Path::new("./")), PathBuf::new());
    }

    #[test]
    fn test_relative_to() {
        assert_eq!(
            relative_to(Path::new("/p/dist/dts/a/types.d.ts"), Path::new("/p")),
            PathBuf::from("dist/dts/a/types.d.ts")
        );
        assert_eq!(
            relative_to(Path::new("/p/dist"), Path::new("/p/pkg")),
            PathBuf::from("../dist")
        );
    }

    #[test]
    fn test_to_export_path() {
        assert_eq!(to_export_path(Path::new("dist/esm/index.js")), "./dist/esm/index.js");
        assert_eq!(to_export_path(Path::new("../dist/x.js")), "../dist/x.js");
        assert_eq!(to_export_path(Path::new("")), ".");
    }

    #[test]
    fn test_resolve() {
        let paths = Paths::with_root("/project");
        assert_eq!(paths.resolve("dist/dts"), PathBuf::from("/project/dist/dts"));
        assert_eq!(paths.resolve("/abs/./x"), PathBuf::from("/abs/x"));
        assert_eq!(paths.config_candidates().len(), 2);
    }
}
