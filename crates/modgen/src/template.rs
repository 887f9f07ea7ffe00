//! Template registry
//!
//! Handles registering, listing and resolving module templates. Built-in
//! templates are registered at startup; custom templates from the user's
//! config are layered on top and can shadow a built-in of the same name.

use devscripts_core::{CustomTemplate, FileEntry, ModuleConfig};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::builtin::BUILTINS;
use crate::error::ModuleError;
use crate::naming::{find_used_variables, generator_name, has_placeholders, template_key, Variables};

/// Function from a module name to the files of that module
pub type GeneratorFn = Arc<dyn Fn(&str) -> Vec<FileEntry> + Send + Sync>;

/// The files a template produces
#[derive(Clone)]
pub enum Template {
    /// Same files regardless of module name
    Static(Vec<FileEntry>),
    /// Files computed from the module name
    Generator(GeneratorFn),
}

impl Template {
    pub fn generator<F>(f: F) -> Self
    where
        F: Fn(&str) -> Vec<FileEntry> + Send + Sync + 'static,
    {
        Self::Generator(Arc::new(f))
    }

    /// Build a template from config file entries.
    ///
    /// Entries without any {{PLACEHOLDER}} stay static; otherwise every
    /// path and content is substituted per module name.
    pub fn from_entries(files: Vec<FileEntry>) -> Self {
        let dynamic = files
            .iter()
            .any(|f| has_placeholders(&f.path) || has_placeholders(&f.content));

        if !dynamic {
            return Self::Static(files);
        }

        Self::generator(move |module_name| {
            let vars = Variables::for_module(module_name);
            files
                .iter()
                .map(|f| FileEntry::new(vars.substitute(&f.path), vars.substitute(&f.content)))
                .collect()
        })
    }

    /// Produce the file list for a module
    pub fn files(&self, module_name: &str) -> Vec<FileEntry> {
        match self {
            Self::Static(files) => files.clone(),
            Self::Generator(f) => f(module_name),
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self, Self::Static(_))
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(files) => f.debug_tuple("Static").field(files).finish(),
            Self::Generator(_) => f.write_str("Generator(..)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateOrigin {
    Builtin,
    Custom,
}

/// A registered template and its defaults
#[derive(Debug, Clone)]
pub struct TemplateSpec {
    pub name: String,
    pub origin: TemplateOrigin,
    pub description: String,
    /// Destination used when the caller gives none
    pub destination: Option<String>,
    /// Folder preference; `None` defers to the caller
    pub create_folder: Option<bool>,
    pub template: Template,
}

impl TemplateSpec {
    pub fn custom(name: &str, custom: &CustomTemplate) -> Self {
        Self {
            name: name.to_string(),
            origin: TemplateOrigin::Custom,
            description: custom.description.clone(),
            destination: custom.destination.clone(),
            create_folder: custom.create_folder,
            template: Template::from_entries(custom.files.clone()),
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.origin == TemplateOrigin::Builtin
    }
}

/// Name -> template mapping
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, TemplateSpec>,
}

impl TemplateRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding only the built-in templates
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for builtin in BUILTINS {
            registry.register(TemplateSpec {
                name: builtin.name.to_string(),
                origin: TemplateOrigin::Builtin,
                description: builtin.title.to_string(),
                destination: None,
                create_folder: None,
                template: Template::generator(builtin.generator),
            });
        }
        registry
    }

    /// Built-ins plus the custom templates from config
    pub fn from_config(config: &ModuleConfig) -> Self {
        let mut registry = Self::builtin();
        for (name, custom) in &config.custom_templates {
            registry.register(TemplateSpec::custom(name, custom));
        }
        registry
    }

    /// Add a template, replacing any template with the same name
    pub fn register(&mut self, spec: TemplateSpec) {
        if let Some(previous) = self.templates.get(&spec.name) {
            tracing::debug!(
                template = %spec.name,
                shadowed = ?previous.origin,
                "template replaces an existing registration"
            );
        }
        self.templates.insert(spec.name.clone(), spec);
    }

    /// Look a template up by name.
    ///
    /// An exact match wins; otherwise the name is normalized to kebab case
    /// and matched against the built-ins.
    pub fn resolve(&self, name: &str) -> Result<&TemplateSpec, ModuleError> {
        if let Some(spec) = self.templates.get(name) {
            return Ok(spec);
        }

        let key = template_key(name);
        self.templates
            .get(&key)
            .filter(|spec| spec.is_builtin())
            .ok_or_else(|| ModuleError::TemplateLoad {
                template: name.to_string(),
                generator: generator_name(&key),
            })
    }

    /// Resolve a template and produce its files for a module
    pub fn files(&self, name: &str, module_name: &str) -> Result<Vec<FileEntry>, ModuleError> {
        Ok(self.resolve(name)?.template.files(module_name))
    }

    /// All registered templates, sorted by name
    pub fn list(&self) -> impl Iterator<Item = &TemplateSpec> {
        self.templates.values()
    }
}

/// Placeholders used across a set of raw entries
pub fn entry_placeholders(files: &[FileEntry]) -> Vec<String> {
    let mut vars: Vec<String> = files
        .iter()
        .flat_map(|f| {
            let mut found = find_used_variables(&f.path);
            found.extend(find_used_variables(&f.content));
            found
        })
        .collect();
    vars.sort();
    vars.dedup();
    vars
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom(files: Vec<FileEntry>) -> CustomTemplate {
        CustomTemplate {
            files,
            ..Default::default()
        }
    }

    #[test]
    fn test_builtin_resolves() {
        let registry = TemplateRegistry::builtin();
        let spec = registry.resolve("express-mongoose-zod").unwrap();

        assert!(spec.is_builtin());
        assert_eq!(spec.template.files("user").len(), 6);
    }

    #[test]
    fn test_builtin_name_is_normalized() {
        let registry = TemplateRegistry::builtin();

        assert!(registry.resolve("ExpressMongooseZod").is_ok());
        assert!(registry.resolve("express_mongoose_zod").is_ok());
    }

    #[test]
    fn test_unknown_template_names_generator() {
        let registry = TemplateRegistry::builtin();
        let err = registry.resolve("react-component").unwrap_err();

        match err {
            ModuleError::TemplateLoad { template, generator } => {
                assert_eq!(template, "react-component");
                assert_eq!(generator, "reactComponentTemplate");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_custom_static_template() {
        let mut config = ModuleConfig::default();
        config
            .custom_templates
            .insert("plain".to_string(), custom(vec![FileEntry::new("index.ts", "// x")]));

        let registry = TemplateRegistry::from_config(&config);
        let spec = registry.resolve("plain").unwrap();

        assert!(spec.template.is_static());
        assert_eq!(spec.template.files("a"), spec.template.files("b"));
    }

    #[test]
    fn test_custom_dynamic_template() {
        let mut config = ModuleConfig::default();
        config.custom_templates.insert(
            "feature".to_string(),
            custom(vec![FileEntry::new(
                "{{NAME}}.controllers.ts",
                "// controllers for {{NAME}}",
            )]),
        );

        let registry = TemplateRegistry::from_config(&config);
        let files = registry.files("feature", "order").unwrap();

        assert_eq!(
            files,
            vec![FileEntry::new("order.controllers.ts", "// controllers for order")]
        );
    }

    #[test]
    fn test_custom_shadows_builtin() {
        let mut config = ModuleConfig::default();
        config.custom_templates.insert(
            "express-mongoose-zod".to_string(),
            custom(vec![FileEntry::new("only.ts", "")]),
        );

        let registry = TemplateRegistry::from_config(&config);
        let spec = registry.resolve("express-mongoose-zod").unwrap();

        assert_eq!(spec.origin, TemplateOrigin::Custom);
        assert_eq!(registry.list().count(), 1);
    }

    #[test]
    fn test_custom_names_are_not_normalized() {
        let mut config = ModuleConfig::default();
        config
            .custom_templates
            .insert("my-template".to_string(), custom(vec![]));

        let registry = TemplateRegistry::from_config(&config);
        assert!(registry.resolve("MyTemplate").is_err());
    }

    #[test]
    fn test_entry_placeholders() {
        let files = vec![
            FileEntry::new("{{NAME}}.ts", "// {{PASCAL_NAME}}"),
            FileEntry::new("index.ts", "export * from './{{NAME}}';"),
        ];
        assert_eq!(entry_placeholders(&files), vec!["NAME", "PASCAL_NAME"]);
    }
}
