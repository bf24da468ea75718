#![allow(clippy::result_large_err)]

use super::TransformConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;

pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration rules
    pub fn validate(config: &TransformConfig) -> Result<(), AppError> {
        let limits = [
            ("query.max_operations", config.query.max_operations == 0),
            ("query.max_call_levels", config.query.max_call_levels == 0),
            ("query.max_expr_depth", config.query.max_expr_depth == 0),
        ];
        for (field, is_zero) in limits {
            if is_zero {
                return Err(AppError::new(
                    ErrorCategory::ConfigError,
                    format!("{} must be greater than zero", field),
                )
                .with_code("FM-CFG-002"));
            }
        }
        Ok(())
    }
}
