#![allow(clippy::result_large_err)]

use super::{yaml, Language};
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use crate::core::value::{mapping_to_json, Frontmatter, Value};
use serde_json::Value as JsonValue;

/// Parses and serializes the text between the frontmatter delimiters.
pub trait FrontmatterEngine: Send + Sync {
    fn parse(&self, text: &str) -> Result<Frontmatter, AppError>;

    fn stringify(&self, frontmatter: &Frontmatter) -> Result<String, AppError>;
}

/// YAML engine.
///
/// By default, strings that a YAML reader would resolve to timestamps are
/// single-quoted so they stay strings. The date-formatted variant writes
/// them plain, which is how formatted dates end up unquoted in the output.
#[derive(Debug, Clone, Copy)]
pub struct YamlEngine {
    quote_timestamps: bool,
}

impl YamlEngine {
    pub fn new() -> Self {
        Self {
            quote_timestamps: true,
        }
    }

    pub fn date_formatted() -> Self {
        Self {
            quote_timestamps: false,
        }
    }
}

impl Default for YamlEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FrontmatterEngine for YamlEngine {
    fn parse(&self, text: &str) -> Result<Frontmatter, AppError> {
        yaml::parse_block(text)
    }

    fn stringify(&self, frontmatter: &Frontmatter) -> Result<String, AppError> {
        Ok(yaml::emit(frontmatter, self.quote_timestamps))
    }
}

/// JSON engine. Written with two-space indentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEngine;

impl FrontmatterEngine for JsonEngine {
    fn parse(&self, text: &str) -> Result<Frontmatter, AppError> {
        let parsed: JsonValue = serde_json::from_str(text).map_err(|err| {
            AppError::with_source(
                ErrorCategory::DocumentError,
                format!("failed to parse JSON frontmatter: {}", err),
                Box::new(err),
            )
            .with_code("FM-DOC-001")
        })?;
        match Value::from_json(parsed) {
            Value::Null => Ok(Frontmatter::new()),
            Value::Mapping(tree) => Ok(tree),
            other => Err(AppError::new(
                ErrorCategory::DocumentError,
                format!("frontmatter must be a mapping, found {}", other.type_name()),
            )
            .with_code("FM-DOC-002")),
        }
    }

    fn stringify(&self, frontmatter: &Frontmatter) -> Result<String, AppError> {
        serde_json::to_string_pretty(&JsonValue::Object(mapping_to_json(frontmatter))).map_err(
            |err| {
                AppError::with_source(
                    ErrorCategory::SerializationError,
                    format!("failed to serialize JSON frontmatter: {}", err),
                    Box::new(err),
                )
                .with_code("FM-DOC-003")
            },
        )
    }
}

/// The engine used for each frontmatter language.
pub struct Engines {
    yaml: Box<dyn FrontmatterEngine>,
    json: Box<dyn FrontmatterEngine>,
}

impl Default for Engines {
    fn default() -> Self {
        Self {
            yaml: Box::new(YamlEngine::new()),
            json: Box::new(JsonEngine),
        }
    }
}

impl Engines {
    /// Engines used when the caller asked for a date format.
    pub fn date_formatted() -> Self {
        Self::default().with_engine(Language::Yaml, YamlEngine::date_formatted())
    }

    pub fn with_engine(mut self, language: Language, engine: impl FrontmatterEngine + 'static) -> Self {
        match language {
            Language::Yaml => self.yaml = Box::new(engine),
            Language::Json => self.json = Box::new(engine),
        }
        self
    }

    pub fn get(&self, language: Language) -> &dyn FrontmatterEngine {
        match language {
            Language::Yaml => self.yaml.as_ref(),
            Language::Json => self.json.as_ref(),
        }
    }
}

impl std::fmt::Debug for Engines {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engines").finish_non_exhaustive()
    }
}
