#![allow(clippy::result_large_err)]

//! Instructions and their compilation into one async `apply` contract.
//!
//! An instruction is either a function over the whole tree or a declarative
//! query. Functions replace the tree with whatever they return. Queries
//! return a patch that is merged into the top level of the tree: a null
//! value deletes the key, anything else overwrites it.

use crate::core::dates::normalize_frontmatter;
use crate::core::error::AppError;
use crate::core::query::{CompiledQuery, QueryEngine};
use crate::core::types::ErrorCategory;
use crate::core::value::{Frontmatter, Value};
use async_trait::async_trait;
use futures::future::{self, BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Boxed imperative instruction.
pub type ImperativeFn =
    Arc<dyn Fn(Frontmatter) -> BoxFuture<'static, Result<Frontmatter, AppError>> + Send + Sync>;

#[derive(Clone)]
pub enum Instruction {
    Function(ImperativeFn),
    Source(String),
    Compiled(CompiledQuery),
}

impl Instruction {
    /// Infallible function. It receives an owned tree and may mutate it.
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(Frontmatter) -> Frontmatter + Send + Sync + 'static,
    {
        Instruction::Function(Arc::new(move |tree| {
            future::ready(Ok::<_, AppError>(f(tree))).boxed()
        }))
    }

    pub fn try_function<F>(f: F) -> Self
    where
        F: Fn(Frontmatter) -> Result<Frontmatter, AppError> + Send + Sync + 'static,
    {
        Instruction::Function(Arc::new(move |tree| future::ready(f(tree)).boxed()))
    }

    pub fn async_function<F, Fut>(f: F) -> Self
    where
        F: Fn(Frontmatter) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Frontmatter, AppError>> + Send + 'static,
    {
        Instruction::Function(Arc::new(move |tree| f(tree).boxed()))
    }

    pub fn query(source: impl Into<String>) -> Self {
        Instruction::Source(source.into())
    }

    pub fn compiled(query: CompiledQuery) -> Self {
        Instruction::Compiled(query)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Instruction::Function(_) => "function",
            Instruction::Source(_) => "query source",
            Instruction::Compiled(_) => "compiled query",
        }
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Function(_) => f.write_str("Instruction::Function(..)"),
            Instruction::Source(source) => f.debug_tuple("Instruction::Source").field(source).finish(),
            Instruction::Compiled(query) => f.debug_tuple("Instruction::Compiled").field(query).finish(),
        }
    }
}

impl From<&str> for Instruction {
    fn from(source: &str) -> Self {
        Instruction::query(source)
    }
}

impl From<String> for Instruction {
    fn from(source: String) -> Self {
        Instruction::query(source)
    }
}

impl From<CompiledQuery> for Instruction {
    fn from(query: CompiledQuery) -> Self {
        Instruction::compiled(query)
    }
}

/// An instruction ready to run. Query sources are compiled exactly once.
#[derive(Clone)]
pub enum CompiledInstruction {
    Function(ImperativeFn),
    Query {
        query: CompiledQuery,
        engine: Arc<QueryEngine>,
    },
}

/// Resolve an instruction into its runnable form.
pub fn compile(
    instruction: Instruction,
    engine: &Arc<QueryEngine>,
) -> Result<CompiledInstruction, AppError> {
    Ok(match instruction {
        Instruction::Function(f) => CompiledInstruction::Function(f),
        Instruction::Source(source) => CompiledInstruction::Query {
            query: engine.compile(&source)?,
            engine: Arc::clone(engine),
        },
        Instruction::Compiled(query) => CompiledInstruction::Query {
            query,
            engine: Arc::clone(engine),
        },
    })
}

/// Uniform contract every instruction is resolved into.
#[async_trait]
pub trait Apply: Send + Sync {
    /// Produce the new tree from an owned copy of the old one.
    async fn apply(&self, tree: Frontmatter) -> Result<Frontmatter, AppError>;
}

#[async_trait]
impl Apply for CompiledInstruction {
    async fn apply(&self, tree: Frontmatter) -> Result<Frontmatter, AppError> {
        match self {
            CompiledInstruction::Function(f) => f(tree).await,
            CompiledInstruction::Query { query, engine } => {
                let view = normalize_frontmatter(tree.clone());
                let result = engine.evaluate(query, &view).await?;
                let patch = match result {
                    Value::Mapping(patch) => patch,
                    other => {
                        return Err(AppError::new(
                            ErrorCategory::ValidationError,
                            format!(
                                "query must return a mapping, got {}: {}",
                                other.type_name(),
                                other
                            ),
                        )
                        .with_code("FM-QUERY-003")
                        .with_context(query.source().to_string()))
                    }
                };
                Ok(merge_query_result(tree, patch))
            }
        }
    }
}

impl fmt::Debug for CompiledInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompiledInstruction::Function(_) => f.write_str("CompiledInstruction::Function(..)"),
            CompiledInstruction::Query { query, .. } => f
                .debug_struct("CompiledInstruction::Query")
                .field("query", query)
                .finish(),
        }
    }
}

/// Shallow top-level merge of a query patch into `tree`.
///
/// Nested values in the patch replace the existing value wholesale.
pub fn merge_query_result(mut tree: Frontmatter, patch: Frontmatter) -> Frontmatter {
    for (key, value) in patch {
        if value.is_null() {
            tree.shift_remove(&key);
        } else {
            tree.insert(key, value);
        }
    }
    tree
}
