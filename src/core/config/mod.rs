pub mod loader;
pub mod validation;

pub use loader::ConfigLoader;
pub use validation::ConfigValidator;

use crate::core::document::Language;
use crate::logging::config::LoggingSection;
use serde::{Deserialize, Serialize};

/// Name of the configuration file looked up in a directory.
pub const CONFIG_FILE_NAME: &str = "frontmatter-transform.toml";

/// Configuration loaded from frontmatter-transform.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TransformConfig {
    /// Query engine limits
    #[serde(default)]
    pub query: QueryConfig,

    /// Document splitting defaults
    #[serde(default)]
    pub document: DocumentConfig,

    /// Logging section, resolved by `LoggingConfig`
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Limits applied to the Rhai query engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryConfig {
    #[serde(default = "default_max_operations")]
    pub max_operations: u64,

    #[serde(default = "default_max_call_levels")]
    pub max_call_levels: usize,

    #[serde(default = "default_max_expr_depth")]
    pub max_expr_depth: usize,
}

/// Document configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentConfig {
    /// Language for documents whose opening delimiter carries no tag
    #[serde(default)]
    pub default_language: Language,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_operations: default_max_operations(),
            max_call_levels: default_max_call_levels(),
            max_expr_depth: default_max_expr_depth(),
        }
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            default_language: Language::Yaml,
        }
    }
}

fn default_max_operations() -> u64 {
    100_000
}

fn default_max_call_levels() -> usize {
    64
}

fn default_max_expr_depth() -> usize {
    64
}
