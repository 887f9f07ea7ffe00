//! Register a freshly generated module with an Express app
//!
//! Runs after `modgen new --register` for the express-mongoose-zod layout:
//! adds the model name to `COLLECTIONS` and the router to the routes array.

use regex::{NoExpand, Regex};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use crate::error::ModuleError;
use crate::naming::{capitalize, pluralize};

pub const COLLECTIONS_FILE: &str = "src/app/constants/index.ts";
pub const ROUTES_FILE: &str = "src/app/routes/index.ts";

static COLLECTIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)export const COLLECTIONS = \[\n(.+?)\n\] as const;").expect("collections pattern")
});

static ROUTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)const routes: IRoute\[\] = \[(.*?)\];").expect("routes pattern"));

/// Add `'Module'` to the `COLLECTIONS` array.
///
/// Returns `false` when the entry was already there.
pub fn update_collection(project_root: &Path, module_name: &str) -> Result<bool, ModuleError> {
    let path = project_root.join(COLLECTIONS_FILE);
    let content = read(&path)?;
    let item = format!("'{}'", capitalize(module_name));

    let caps = COLLECTIONS.captures(&content).ok_or_else(|| ModuleError::Registration {
        path: path.clone(),
        reason: "COLLECTIONS array not found".to_string(),
    })?;

    if caps[1].contains(&item) {
        return Ok(false);
    }

    let replacement = format!(
        "export const COLLECTIONS = [\n{}\n\t{},\n] as const;",
        caps[1].trim_end(),
        item
    );
    let updated = COLLECTIONS.replace(&content, NoExpand(&replacement));

    write(&path, &updated)?;
    tracing::info!(file = %path.display(), module = module_name, "collection registered");
    Ok(true)
}

/// Add an import and a `{ path, route }` entry for the module's router.
///
/// With `use_alias` the import goes through `@/modules/...` instead of a
/// relative path. Returns `false` when the route was already registered.
pub fn update_routes(project_root: &Path, module_name: &str, use_alias: bool) -> Result<bool, ModuleError> {
    let path = project_root.join(ROUTES_FILE);
    let mut content = read(&path)?;

    let route_name = format!("{module_name}Routes");
    let route_line = format!(
        "{{ path: '/{}', route: {} }}",
        pluralize(module_name),
        route_name
    );

    if content.contains(&route_line) {
        return Ok(false);
    }

    let caps = ROUTES.captures(&content).ok_or_else(|| ModuleError::Registration {
        path: path.clone(),
        reason: "routes array not found".to_string(),
    })?;
    let replacement = format!(
        "const routes: IRoute[] = [{}\n\t{},\n];",
        caps[1].trim_end(),
        route_line
    );
    content = ROUTES.replace(&content, NoExpand(&replacement)).into_owned();

    if !content.contains(&format!("import {{ {route_name} }}")) {
        let base = if use_alias { "@/modules" } else { "../modules" };
        content = format!(
            "import {{ {route_name} }} from '{base}/{module_name}/{module_name}.routes';\n{content}"
        );
    }

    write(&path, &content)?;
    tracing::info!(file = %path.display(), module = module_name, "route registered");
    Ok(true)
}

fn read(path: &Path) -> Result<String, ModuleError> {
    fs::read_to_string(path).map_err(|e| ModuleError::io(path, e))
}

fn write(path: &Path, content: &str) -> Result<(), ModuleError> {
    fs::write(path, content).map_err(|e| ModuleError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const CONSTANTS: &str = "export const COLLECTIONS = [\n\t'User',\n] as const;\n";

    const ROUTES_TS: &str = "import { Router } from 'express';\n\nconst routes: IRoute[] = [\n\t{ path: '/users', route: userRoutes },\n];\n";

    fn project(constants: &str, routes: &str) -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/app/constants")).unwrap();
        fs::create_dir_all(root.join("src/app/routes")).unwrap();
        fs::write(root.join(COLLECTIONS_FILE), constants).unwrap();
        fs::write(root.join(ROUTES_FILE), routes).unwrap();
        dir
    }

    #[test]
    fn test_update_collection_appends_once() {
        let dir = project(CONSTANTS, ROUTES_TS);

        assert!(update_collection(dir.path(), "order").unwrap());
        assert!(!update_collection(dir.path(), "order").unwrap());

        let content = fs::read_to_string(dir.path().join(COLLECTIONS_FILE)).unwrap();
        assert_eq!(
            content,
            "export const COLLECTIONS = [\n\t'User',\n\t'Order',\n] as const;\n"
        );
    }

    #[test]
    fn test_update_collection_missing_array() {
        let dir = project("export const OTHER = [];\n", ROUTES_TS);

        let err = update_collection(dir.path(), "order").unwrap_err();
        assert!(matches!(err, ModuleError::Registration { .. }));
    }

    #[test]
    fn test_update_routes_adds_import_and_route() {
        let dir = project(CONSTANTS, ROUTES_TS);

        assert!(update_routes(dir.path(), "category", false).unwrap());
        assert!(!update_routes(dir.path(), "category", false).unwrap());

        let content = fs::read_to_string(dir.path().join(ROUTES_FILE)).unwrap();
        assert!(content.starts_with(
            "import { categoryRoutes } from '../modules/category/category.routes';\n"
        ));
        assert!(content.contains(
            "\t{ path: '/users', route: userRoutes },\n\t{ path: '/categories', route: categoryRoutes },\n];"
        ));
    }

    #[test]
    fn test_update_routes_with_alias() {
        let dir = project(CONSTANTS, ROUTES_TS);

        update_routes(dir.path(), "order", true).unwrap();

        let content = fs::read_to_string(dir.path().join(ROUTES_FILE)).unwrap();
        assert!(content.contains("from '@/modules/order/order.routes';"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            update_routes(dir.path(), "order", false),
            Err(ModuleError::Io { .. })
        ));
    }
}
