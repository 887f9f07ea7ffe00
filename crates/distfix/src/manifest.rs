//! package.json reading and writing
//!
//! Fields are kept in file order so a rewrite only moves what it replaces.

use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::DistError;

/// A parsed package.json
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    fields: Map<String, Value>,
}

impl Manifest {
    /// Read and parse a manifest. Unreadable files, invalid JSON and
    /// non-object documents are all parse errors.
    pub fn load(path: &Path) -> Result<Self, DistError> {
        let content = fs::read_to_string(path).map_err(|e| DistError::ManifestParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(path, &content)
    }

    pub fn parse(path: &Path, content: &str) -> Result<Self, DistError> {
        let parse_error = |reason: String| DistError::ManifestParse {
            path: path.to_path_buf(),
            reason,
        };

        match serde_json::from_str::<Value>(content).map_err(|e| parse_error(e.to_string()))? {
            Value::Object(fields) => Ok(Self {
                path: path.to_path_buf(),
                fields,
            }),
            other => Err(parse_error(format!("expected a JSON object, found {}", kind(&other)))),
        }
    }

    /// Replace a top-level field; a new key is appended at the end
    pub fn set(&mut self, key: &str, value: Value) {
        self.fields.insert(key.to_string(), value);
    }

    /// Two-space indented JSON with a trailing newline
    pub fn to_pretty_string(&self) -> Result<String, DistError> {
        let mut out = serde_json::to_string_pretty(&self.fields)
            .map_err(|e| DistError::io(&self.path, e.into()))?;
        out.push('\n');
        Ok(out)
    }

    /// Write the manifest back in a single write
    pub fn save(&self) -> Result<(), DistError> {
        let content = self.to_pretty_string()?;
        fs::write(&self.path, content).map_err(|e| DistError::io(&self.path, e))?;
        tracing::debug!(manifest = %self.path.display(), "manifest written");
        Ok(())
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_roundtrip_keeps_field_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("package.json");
        fs::write(&path, r#"{"name":"pkg","version":"1.0.0","exports":{},"scripts":{"build":"tsc"}}"#).unwrap();

        let mut manifest = Manifest::load(&path).unwrap();
        manifest.set("exports", json!({ ".": "./index.js" }));
        manifest.set("typesVersions", json!({ "*": {} }));
        manifest.save().unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let keys: Vec<_> = ["\"name\"", "\"version\"", "\"exports\"", "\"scripts\"", "\"typesVersions\""]
            .iter()
            .map(|k| written.find(k).unwrap())
            .collect();

        assert!(keys.windows(2).all(|w| w[0] < w[1]), "{written}");
        assert!(written.ends_with("}\n"));
        assert!(written.contains("\n  \"name\": \"pkg\""));
    }

    #[test]
    fn test_invalid_json() {
        let err = Manifest::parse(Path::new("package.json"), "{ not json").unwrap_err();
        assert!(matches!(err, DistError::ManifestParse { .. }));
    }

    #[test]
    fn test_non_object_root() {
        let err = Manifest::parse(Path::new("package.json"), "[1, 2]").unwrap_err();
        match err {
            DistError::ManifestParse { reason, .. } => assert!(reason.contains("an array")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file_is_parse_error() {
        let dir = tempdir().unwrap();
        let err = Manifest::load(&dir.path().join("package.json")).unwrap_err();
        assert!(matches!(err, DistError::ManifestParse { .. }));
    }
}
