#![allow(clippy::result_large_err)]

use super::{ConfigValidator, TransformConfig, CONFIG_FILE_NAME};
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::env;
use std::path::Path;

pub const ENV_QUERY_MAX_OPERATIONS: &str = "FRONTMATTER_TRANSFORM_QUERY_MAX_OPERATIONS";
pub const ENV_DEFAULT_LANGUAGE: &str = "FRONTMATTER_TRANSFORM_DEFAULT_LANGUAGE";
pub const ENV_LOG_LEVEL: &str = "FRONTMATTER_TRANSFORM_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "FRONTMATTER_TRANSFORM_LOG_DIR";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config from a directory (dir/frontmatter-transform.toml)
    /// Environment variables override config file values
    /// A missing file yields defaults + env vars
    pub fn load_from_dir(dir: &Path) -> Result<TransformConfig, AppError> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        let config_file = Self::load_from_file(&config_path)?;

        let mut config = config_file.unwrap_or_default();

        Self::apply_env_overrides(&mut config);
        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Load config from specific file path
    /// Returns Ok(None) if file doesn't exist
    pub fn load_from_file(path: &Path) -> Result<Option<TransformConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read config file {}: {}", path.display(), e),
            )
        })?;

        let config: TransformConfig = toml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ConfigError,
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
            .with_code("FM-CFG-001")
        })?;

        Ok(Some(config))
    }

    /// Apply environment variable overrides to the configuration
    /// Environment variables take precedence over config file values
    fn apply_env_overrides(config: &mut TransformConfig) {
        if let Ok(value) = env::var(ENV_QUERY_MAX_OPERATIONS) {
            match value.trim().parse::<u64>() {
                Ok(max_operations) => config.query.max_operations = max_operations,
                Err(_) => tracing::warn!(
                    "ignoring {}={}: not an unsigned integer",
                    ENV_QUERY_MAX_OPERATIONS,
                    value
                ),
            }
        }

        if let Ok(value) = env::var(ENV_DEFAULT_LANGUAGE) {
            match value.parse() {
                Ok(language) => config.document.default_language = language,
                Err(err) => tracing::warn!("ignoring {}: {}", ENV_DEFAULT_LANGUAGE, err),
            }
        }

        if let Ok(level) = env::var(ENV_LOG_LEVEL) {
            if !level.trim().is_empty() {
                config.logging.default_level = Some(level);
            }
        }

        if let Ok(dir) = env::var(ENV_LOG_DIR) {
            if !dir.trim().is_empty() {
                config.logging.log_dir = Some(dir);
            }
        }
    }
}
