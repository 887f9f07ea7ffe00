//! distfix - Post-build fixes for TypeScript packages
//!
//! Two passes over a compiled `dist` tree:
//! - `exports`: rebuild package.json `exports` and `typesVersions` from the
//!   `.d.ts` output
//! - `imports`: append explicit `.js`/`.ts` extensions to relative ESM
//!   import specifiers

pub mod error;
pub mod exports;
pub mod imports;
pub mod manifest;

pub use error::DistError;
pub use exports::{fix_type_exports, synthesize, ExportsOptions, ExportsPlan};
pub use imports::{fix_import_extensions, ImportExtension, ImportFixSummary};
pub use manifest::Manifest;
