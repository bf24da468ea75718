#![allow(clippy::result_large_err)]

//! Read a document, transform its frontmatter and write it back in place.

use crate::core::config::TransformConfig;
use crate::core::dates::{denormalize_mapping, normalize_frontmatter, DateFormat};
use crate::core::document::{Document, Engines, Language};
use crate::core::error::AppError;
use crate::core::instruction::Instruction;
use crate::core::transform::FrontmatterTransformer;
use crate::core::types::ErrorCategory;
use crate::core::value::{Frontmatter, Value};
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct FilePipeline {
    transformer: FrontmatterTransformer,
    default_language: Language,
}

impl FilePipeline {
    pub fn new(transformer: FrontmatterTransformer, default_language: Language) -> Self {
        Self {
            transformer,
            default_language,
        }
    }

    pub fn from_config(config: &TransformConfig) -> Self {
        Self::new(
            FrontmatterTransformer::from_config(config),
            config.document.default_language,
        )
    }

    pub fn transformer(&self) -> &FrontmatterTransformer {
        &self.transformer
    }

    /// Transform the frontmatter of the document at `path` and overwrite it.
    ///
    /// With `date_format`, every date in the new tree is rendered with that
    /// pattern as UTC wall-clock text and written unquoted. Only encodings
    /// with native dates accept a format.
    pub async fn transform_file(
        &self,
        path: impl AsRef<Path>,
        instruction: impl Into<Instruction>,
        date_format: Option<&str>,
    ) -> Result<(), AppError> {
        let path = path.as_ref();
        let mut document = Document::read(path, self.default_language).await?;

        let format = match date_format {
            Some(pattern) => {
                if !document.language.supports_native_dates() {
                    return Err(AppError::new(
                        ErrorCategory::EncodingError,
                        format!(
                            "a date format was given but '{}' frontmatter cannot hold dates",
                            document.language
                        ),
                    )
                    .with_code("FM-ENC-001")
                    .with_context(path.display().to_string()));
                }
                Some(DateFormat::parse(pattern)?)
            }
            None => None,
        };

        let old = &document.frontmatter;
        let new = self.transformer.transform(old, instruction).await?;
        let old_view = Value::Mapping(old.clone());
        let new_view = Value::Mapping(new.clone());
        tracing::debug!(
            path = %path.display(),
            language = %document.language,
            old = %old_view,
            new = %new_view,
            "transformed frontmatter"
        );

        let (frontmatter, engines) = match &format {
            Some(format) => (render_dates(new, format), Engines::date_formatted()),
            None => (new, Engines::default()),
        };
        document.frontmatter = frontmatter;

        let text = document.stringify(&engines)?;
        tokio::fs::write(path, text).await?;
        tracing::info!(path = %path.display(), date_format = ?date_format, "wrote document");
        Ok(())
    }
}

/// Textual dates from queries are recognized first so they are formatted too.
fn render_dates(frontmatter: Frontmatter, format: &DateFormat) -> Frontmatter {
    denormalize_mapping(normalize_frontmatter(frontmatter), Some(format))
}

/// Transform a file with a default-configured pipeline.
pub async fn transform_file(
    path: impl AsRef<Path>,
    instruction: impl Into<Instruction>,
    date_format: Option<&str>,
) -> Result<(), AppError> {
    FilePipeline::default()
        .transform_file(path, instruction, date_format)
        .await
}
