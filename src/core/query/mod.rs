#![allow(clippy::result_large_err)] // Query engine returns AppError directly for structured diagnostics.

use crate::core::config::QueryConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use crate::core::value::{canonical_date_string, Frontmatter, Number, Value};
use rhai::{Array, Dynamic, Engine, Map, Scope, AST};
use std::fmt;

/// Name under which the whole input tree is visible to a query.
pub const FRONTMATTER_VARIABLE: &str = "frontmatter";

/// A query compiled once and evaluated any number of times.
#[derive(Clone)]
pub struct CompiledQuery {
    source: String,
    ast: AST,
}

impl CompiledQuery {
    /// Compile with a default-configured engine.
    pub fn compile(source: &str) -> Result<Self, AppError> {
        QueryEngine::default().compile(source)
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledQuery")
            .field("source", &self.source)
            .finish()
    }
}

/// Query evaluation engine using a locked-down Rhai configuration.
pub struct QueryEngine {
    engine: Engine,
}

impl Default for QueryEngine {
    fn default() -> Self {
        QueryEngine::new(&QueryConfig::default())
    }
}

impl QueryEngine {
    pub fn new(config: &QueryConfig) -> Self {
        let mut engine = Engine::new();
        engine.set_max_operations(config.max_operations);
        engine.set_max_call_levels(config.max_call_levels);
        engine.set_max_expr_depths(config.max_expr_depth, config.max_expr_depth);
        engine.on_print(|_| {});
        engine.on_debug(|_, _, _| {});
        QueryEngine { engine }
    }

    /// Compile the given query source into an AST.
    pub fn compile(&self, source: &str) -> Result<CompiledQuery, AppError> {
        let ast = self.engine.compile(source).map_err(|err| {
            AppError::with_source(
                ErrorCategory::QueryError,
                format!("query compile error: {}", err),
                Box::new(err),
            )
            .with_code("FM-QUERY-001")
        })?;
        Ok(CompiledQuery {
            source: source.to_string(),
            ast,
        })
    }

    /// Evaluate a compiled query against `input`.
    ///
    /// Every top-level key is bound as a variable of the same name, and the
    /// whole tree as `frontmatter`. Dates are seen as canonical text.
    pub async fn evaluate(
        &self,
        query: &CompiledQuery,
        input: &Frontmatter,
    ) -> Result<Value, AppError> {
        let mut scope = Scope::new();
        for (key, value) in input {
            scope.push_dynamic(key.as_str(), to_dynamic(value));
        }
        scope.push_dynamic(FRONTMATTER_VARIABLE, to_dynamic_map(input));

        let result = self
            .engine
            .eval_ast_with_scope::<Dynamic>(&mut scope, &query.ast)
            .map_err(|err| {
                AppError::new(
                    ErrorCategory::QueryError,
                    format!("query execution error: {}", err),
                )
                .with_code("FM-QUERY-002")
                .with_context(query.source.clone())
            })?;
        from_dynamic(result)
    }
}

fn to_dynamic(value: &Value) -> Dynamic {
    match value {
        Value::Null => Dynamic::UNIT,
        Value::Bool(b) => Dynamic::from(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Dynamic::from(i)
            } else if let Some(f) = n.as_f64() {
                Dynamic::from(f)
            } else {
                Dynamic::from(0_i64)
            }
        }
        Value::String(s) => Dynamic::from(s.clone()),
        Value::Date(date) => Dynamic::from(canonical_date_string(date)),
        Value::Sequence(items) => {
            let mut arr = Array::new();
            for item in items {
                arr.push(to_dynamic(item));
            }
            Dynamic::from_array(arr)
        }
        Value::Mapping(map) => to_dynamic_map(map),
    }
}

fn to_dynamic_map(map: &Frontmatter) -> Dynamic {
    let mut rhai_map = Map::new();
    for (key, value) in map {
        rhai_map.insert(key.as_str().into(), to_dynamic(value));
    }
    Dynamic::from_map(rhai_map)
}

fn from_dynamic(value: Dynamic) -> Result<Value, AppError> {
    if value.is_unit() {
        return Ok(Value::Null);
    }
    if let Some(b) = value.clone().try_cast::<bool>() {
        return Ok(Value::Bool(b));
    }
    if let Some(i) = value.clone().try_cast::<i64>() {
        return Ok(Value::Number(Number::from(i)));
    }
    if let Some(f) = value.clone().try_cast::<f64>() {
        return Number::from_f64(f).map(Value::Number).ok_or_else(|| {
            unrepresentable(format!("non-finite number {}", f))
        });
    }
    if let Some(c) = value.clone().try_cast::<char>() {
        return Ok(Value::String(c.to_string()));
    }
    if let Some(s) = value.clone().try_cast::<String>() {
        return Ok(Value::String(s));
    }
    if let Some(arr) = value.clone().try_cast::<Array>() {
        return arr
            .into_iter()
            .map(from_dynamic)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Sequence);
    }
    if let Some(map) = value.clone().try_cast::<Map>() {
        let mut tree = Frontmatter::new();
        for (key, value) in map {
            tree.insert(key.to_string(), from_dynamic(value)?);
        }
        return Ok(Value::Mapping(tree));
    }
    Err(unrepresentable(format!("value of type `{}`", value.type_name())))
}

fn unrepresentable(what: String) -> AppError {
    AppError::new(
        ErrorCategory::QueryError,
        format!("query produced a {} that frontmatter cannot hold", what),
    )
    .with_code("FM-QUERY-004")
}
