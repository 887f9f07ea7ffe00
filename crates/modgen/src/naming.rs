//! Module name variants and placeholder substitution
//!
//! Custom templates use {{PLACEHOLDER}} syntax in file paths and content.
//! Every placeholder is derived from the module name, plus the date.

use chrono::Local;
use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Z_][A-Z0-9_]*)\}\}").expect("placeholder pattern"));

/// Upper-case the first character, leave the rest alone
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Naive English plural, good enough for route paths
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    let lower = word.to_lowercase();
    if ["s", "x", "z", "ch", "sh"].iter().any(|end| lower.ends_with(end)) {
        return format!("{}es", word);
    }

    if let Some(stem) = word.strip_suffix('y').or_else(|| word.strip_suffix('Y')) {
        let before_vowel = stem
            .chars()
            .last()
            .map(|c| "aeiouAEIOU".contains(c))
            .unwrap_or(true);
        if !before_vowel {
            return format!("{}ies", stem);
        }
    }

    format!("{}s", word)
}

/// Conventional generator name for a built-in template:
/// `express-mongoose-zod` -> `expressMongooseZodTemplate`
pub fn generator_name(template: &str) -> String {
    format!("{}Template", template.to_lower_camel_case())
}

/// Registry key for a template name: `ExpressMongooseZod` -> `express-mongoose-zod`
pub fn template_key(template: &str) -> String {
    template.trim().to_kebab_case()
}

/// Template variables container
#[derive(Debug, Clone)]
pub struct Variables {
    vars: BTreeMap<String, String>,
}

impl Variables {
    /// Standard variables for a module name
    pub fn for_module(module_name: &str) -> Self {
        let mut vars = BTreeMap::new();
        let now = Local::now();

        vars.insert("NAME".to_string(), module_name.to_string());
        vars.insert("PASCAL_NAME".to_string(), module_name.to_upper_camel_case());
        vars.insert("CAMEL_NAME".to_string(), module_name.to_lower_camel_case());
        vars.insert("KEBAB_NAME".to_string(), module_name.to_kebab_case());
        vars.insert("SNAKE_NAME".to_string(), module_name.to_snake_case());
        vars.insert("CAPITALIZED_NAME".to_string(), capitalize(module_name));
        vars.insert("PLURAL_NAME".to_string(), pluralize(module_name));
        vars.insert("DATE".to_string(), now.format("%Y-%m-%d").to_string());
        vars.insert("YEAR".to_string(), now.format("%Y").to_string());

        Self { vars }
    }

    /// Set a variable value
    pub fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_uppercase(), value.to_string());
    }

    /// Replace all {{PLACEHOLDER}} patterns in a string
    pub fn substitute(&self, content: &str) -> String {
        PLACEHOLDER
            .replace_all(content, |caps: &regex::Captures| {
                let key = &caps[1];
                self.vars
                    .get(key)
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

/// Find all placeholders used in a string, sorted and deduplicated
pub fn find_used_variables(content: &str) -> Vec<String> {
    let mut vars: Vec<String> = PLACEHOLDER
        .captures_iter(content)
        .map(|cap| cap[1].to_string())
        .collect();

    vars.sort();
    vars.dedup();
    vars
}

pub fn has_placeholders(content: &str) -> bool {
    PLACEHOLDER.is_match(content)
}
