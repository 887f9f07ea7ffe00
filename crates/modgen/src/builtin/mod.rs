//! Built-in module templates
//!
//! Each built-in is registered under its kebab-case name. The generator for
//! `foo-bar` is expected to be the function conventionally named
//! `fooBarTemplate` (see [`crate::naming::generator_name`]).

mod express_mongoose_zod;

pub use express_mongoose_zod::express_mongoose_zod_template;

use devscripts_core::FileEntry;

/// Signature shared by all built-in generators
pub type BuiltinGenerator = fn(&str) -> Vec<FileEntry>;

/// A built-in template entry
pub struct Builtin {
    pub name: &'static str,
    pub title: &'static str,
    pub generator: BuiltinGenerator,
}

/// The template used when neither the command line nor config picks one
pub const DEFAULT_TEMPLATE: &str = "express-mongoose-zod";

pub const BUILTINS: &[Builtin] = &[Builtin {
    name: "express-mongoose-zod",
    title: "Express + Mongoose + Zod",
    generator: express_mongoose_zod_template,
}];
