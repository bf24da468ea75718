//! Transform the frontmatter of Markdown-style documents.
//!
//! An [`Instruction`](core::Instruction) is either a Rust function over the
//! whole frontmatter tree or a Rhai query whose object-map result is merged
//! into the tree. [`transform_frontmatter`](core::transform_frontmatter) works
//! on trees in memory and [`transform_file`](core::transform_file) rewrites a
//! document on disk, optionally rendering dates with a custom pattern.

pub mod core;
pub mod logging;

/// Current crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub type Result<T> = std::result::Result<T, anyhow::Error>;
