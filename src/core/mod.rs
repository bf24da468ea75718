pub mod config;
pub mod dates;
pub mod document;
pub mod error;
pub mod instruction;
pub mod pipeline;
pub mod query;
pub mod transform;
pub mod types;
pub mod value;

pub use config::{ConfigLoader, ConfigValidator, TransformConfig};
pub use dates::{
    denormalize_dates, denormalize_frontmatter, format_utc, normalize_dates_for_query,
    normalize_frontmatter, parse_date_time_string, DateFormat,
};
pub use document::{Document, Engines, FrontmatterEngine, JsonEngine, Language, LineEnding, YamlEngine};
pub use error::AppError;
pub use instruction::{compile, merge_query_result, Apply, CompiledInstruction, Instruction};
pub use pipeline::{transform_file, FilePipeline};
pub use query::{CompiledQuery, QueryEngine};
pub use transform::{transform_frontmatter, FrontmatterTransformer};
pub use types::*;
pub use value::{Frontmatter, Number, Value};
