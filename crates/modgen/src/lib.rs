//! modgen - Module scaffolding for devscripts
//!
//! Resolves a named template into a list of files and writes them under a
//! destination directory. Built-in templates live in an explicit registry;
//! user templates come from the `module.custom_templates` config section.

pub mod builtin;
pub mod error;
pub mod naming;
pub mod register;
pub mod template;
pub mod writer;

pub use devscripts_core::FileEntry;
pub use error::ModuleError;
pub use naming::Variables;
pub use template::{Template, TemplateOrigin, TemplateRegistry, TemplateSpec};
pub use writer::{generate_module, GeneratedModule, GenerationRequest, ModuleHooks, NoHooks};
