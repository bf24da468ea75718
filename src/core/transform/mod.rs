#![allow(clippy::result_large_err)]

use crate::core::config::TransformConfig;
use crate::core::error::AppError;
use crate::core::instruction::{compile, Apply, CompiledInstruction, Instruction};
use crate::core::query::QueryEngine;
use crate::core::value::Frontmatter;
use std::sync::Arc;

/// Runs instructions against frontmatter without touching the caller's tree.
#[derive(Clone)]
pub struct FrontmatterTransformer {
    engine: Arc<QueryEngine>,
}

impl Default for FrontmatterTransformer {
    fn default() -> Self {
        Self::new(Arc::new(QueryEngine::default()))
    }
}

impl FrontmatterTransformer {
    pub fn new(engine: Arc<QueryEngine>) -> Self {
        Self { engine }
    }

    pub fn from_config(config: &TransformConfig) -> Self {
        Self::new(Arc::new(QueryEngine::new(&config.query)))
    }

    pub fn engine(&self) -> &Arc<QueryEngine> {
        &self.engine
    }

    pub fn compile(&self, instruction: impl Into<Instruction>) -> Result<CompiledInstruction, AppError> {
        compile(instruction.into(), &self.engine)
    }

    /// Apply `instruction` to a copy of `frontmatter` and return the new tree.
    pub async fn transform(
        &self,
        frontmatter: &Frontmatter,
        instruction: impl Into<Instruction>,
    ) -> Result<Frontmatter, AppError> {
        let instruction = instruction.into();
        tracing::trace!(kind = instruction.kind(), "compiling instruction");
        let compiled = self.compile(instruction)?;
        compiled.apply(frontmatter.clone()).await
    }
}

impl std::fmt::Debug for FrontmatterTransformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrontmatterTransformer").finish_non_exhaustive()
    }
}

/// Transform with a default-configured query engine.
pub async fn transform_frontmatter(
    frontmatter: &Frontmatter,
    instruction: impl Into<Instruction>,
) -> Result<Frontmatter, AppError> {
    FrontmatterTransformer::default()
        .transform(frontmatter, instruction)
        .await
}
