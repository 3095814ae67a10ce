//! Conversion settings.
//!
//! Example `js2j.toml`:
//! ```toml
//! layout = "class"
//! indent-width = 2
//! accumulators = ["sum", "total"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use js2j_codegen_java::{Layout, RenderOptions};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Settings for one conversion run. Every field has a default, so a config
/// file only names what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Run the syntax normalizer before parsing.
    pub normalize: bool,
    /// Run the repair pipeline over rendered text.
    pub repair: bool,
    pub layout: Layout,
    /// Wrapper class name for class layout. Derived from the file name when
    /// unset.
    pub class_name: Option<String>,
    pub indent_width: usize,
    /// Binding names treated as accumulators in `acc + xs[i];` statements.
    pub accumulators: Vec<String>,
    /// Name for class-shaped literals that have no binding name.
    pub default_class_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            normalize: true,
            repair: true,
            layout: Layout::Loose,
            class_name: None,
            indent_width: 4,
            accumulators: ["sum", "total", "count", "result"]
                .into_iter()
                .map(String::from)
                .collect(),
            default_class_name: "GeneratedClass".to_string(),
        }
    }
}

impl Config {
    /// Load a config from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn is_accumulator(&self, name: &str) -> bool {
        self.accumulators.iter().any(|acc| acc == name)
    }

    /// Printer options for a unit whose wrapper class is `class_name`.
    pub fn render_options(&self, class_name: &str) -> RenderOptions {
        RenderOptions {
            indent_width: self.indent_width,
            layout: self.layout,
            class_name: self
                .class_name
                .clone()
                .unwrap_or_else(|| class_name.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_config() {
        let config = Config::from_toml_str(
            "layout = \"class\"\nindent-width = 2\nclass-name = \"Main\"\nrepair = false\n",
        )
        .unwrap();
        assert_eq!(config.layout, Layout::Class);
        assert_eq!(config.indent_width, 2);
        assert!(!config.repair);
        assert!(config.normalize);
        assert_eq!(config.render_options("Other").class_name, "Main");
    }

    #[test]
    fn test_unknown_layout_is_an_error() {
        let err = Config::from_toml_str("layout = \"nested\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("js2j.toml");
        std::fs::write(&path, "accumulators = [\"acc\"]\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert!(config.is_accumulator("acc"));
        assert!(!config.is_accumulator("sum"));
    }
}
