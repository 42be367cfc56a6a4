use crate::directive::DirectiveMode;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Text hook run on a style block before rebasing.
#[derive(Clone)]
pub struct Replacer(Arc<dyn Fn(&str) -> String + Send + Sync>);

impl Replacer {
    pub fn new(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Replacer(Arc::new(f))
    }

    pub fn apply(&self, text: &str) -> String {
        (self.0)(text)
    }
}

impl fmt::Debug for Replacer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Replacer(..)")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptConfig {
    #[serde(default)]
    pub compile: bool,

    #[serde(default = "default_coffee_command")]
    pub command: Vec<String>,

    #[serde(default)]
    pub options: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StyleConfig {
    #[serde(default)]
    pub compile: bool,

    #[serde(default = "default_sass_command")]
    pub command: Vec<String>,

    #[serde(default)]
    pub options: Map<String, Value>,

    /// Literal substitutions, applied in order.
    #[serde(default)]
    pub replace: IndexMap<String, String>,

    #[serde(skip)]
    pub replacer: Option<Replacer>,
}

impl StyleConfig {
    /// Run the replacer hook, then the literal substitutions.
    pub fn apply_replacements(&self, text: &str) -> String {
        let mut out = match &self.replacer {
            Some(replacer) => replacer.apply(text),
            None => text.to_string(),
        };
        for (from, to) in &self.replace {
            if !from.is_empty() {
                out = out.replace(from.as_str(), to);
            }
        }
        out
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default, alias = "removeBlankLines")]
    pub remove_blank_lines: bool,

    #[serde(default, alias = "emptyExport")]
    pub empty_export: bool,

    #[serde(default)]
    pub directives: DirectiveMode,

    #[serde(default)]
    pub coffee: ScriptConfig,

    #[serde(default)]
    pub sass: StyleConfig,
}

fn default_coffee_command() -> Vec<String> {
    vec!["coffee".to_string()]
}
fn default_sass_command() -> Vec<String> {
    vec!["sass".to_string()]
}

impl Default for ScriptConfig {
    fn default() -> Self {
        ScriptConfig {
            compile: false,
            command: default_coffee_command(),
            options: Map::new(),
        }
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        StyleConfig {
            compile: false,
            command: default_sass_command(),
            options: Map::new(),
            replace: IndexMap::new(),
            replacer: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.remove_blank_lines);
        assert!(!config.empty_export);
        assert_eq!(config.directives, DirectiveMode::Parsed);
        assert!(!config.coffee.compile);
        assert_eq!(config.coffee.command, vec!["coffee"]);
        assert!(config.coffee.options.is_empty());
        assert!(!config.sass.compile);
        assert_eq!(config.sass.command, vec!["sass"]);
        assert!(config.sass.replace.is_empty());
        assert!(config.sass.replacer.is_none());
    }

    #[test]
    fn test_deserialize_full_config() {
        let json = r##"{
            "remove_blank_lines": true,
            "empty_export": true,
            "directives": "document",
            "coffee": {"compile": true, "command": ["npx", "coffee"], "options": {"bare": true}},
            "sass": {
                "compile": true,
                "options": {"style": "compressed"},
                "replace": {"$primary": "#333", "$accent": "red"}
            }
        }"##;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.remove_blank_lines);
        assert!(config.empty_export);
        assert_eq!(config.directives, DirectiveMode::Document);
        assert!(config.coffee.compile);
        assert_eq!(config.coffee.command, vec!["npx", "coffee"]);
        assert_eq!(config.coffee.options.get("bare"), Some(&Value::Bool(true)));
        assert!(config.sass.compile);
        assert_eq!(config.sass.command, vec!["sass"]);
        let keys: Vec<&String> = config.sass.replace.keys().collect();
        assert_eq!(keys, vec!["$primary", "$accent"]);
        assert_eq!(config.sass.replace.get("$primary").map(String::as_str), Some("#333"));
    }

    #[test]
    fn test_camel_case_aliases() {
        let config: Config =
            serde_json::from_str(r#"{"removeBlankLines": true, "emptyExport": true}"#).unwrap();
        assert!(config.remove_blank_lines);
        assert!(config.empty_export);
    }

    #[test]
    fn test_partial_section() {
        let config: Config = serde_json::from_str(r#"{"sass": {"compile": true}}"#).unwrap();
        assert!(config.sass.compile);
        assert_eq!(config.sass.command, vec!["sass"]);
        assert!(!config.coffee.compile);
    }

    #[test]
    fn test_replacements_order() {
        let mut sass = StyleConfig::default();
        sass.replacer = Some(Replacer::new(|text| text.replace("@@", "$")));
        sass.replace.insert("$color".to_string(), "blue".to_string());
        assert_eq!(sass.apply_replacements(".a\n  color: @@color"), ".a\n  color: blue");
    }
}
