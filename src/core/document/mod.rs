#![allow(clippy::result_large_err)]

//! Splitting a text document into its frontmatter block and body, and
//! joining them back together.
//!
//! A block starts when the document opens with `---` (not `----`). Anything
//! after the three dashes on that line names the block language. The block
//! ends at the first line consisting of `---`; without one, the rest of the
//! document is the block. The body is everything after the closing line and
//! is never altered.

mod engine;
pub mod yaml;

pub use engine::{Engines, FrontmatterEngine, JsonEngine, YamlEngine};

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use crate::core::value::Frontmatter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

const DELIMITER: &str = "---";
const BYTE_ORDER_MARK: char = '\u{feff}';

/// Frontmatter block language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Yaml,
    Json,
}

impl Language {
    /// Resolve the tag written after the opening delimiter.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(Language::Yaml),
            "json" => Some(Language::Json),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Yaml => "yaml",
            Language::Json => "json",
        }
    }

    /// Whether the language has its own date values. JSON only has text.
    pub fn supports_native_dates(&self) -> bool {
        matches!(self, Language::Yaml)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::from_tag(s).ok_or_else(|| {
            format!(
                "unsupported frontmatter language '{}' (expected yaml, yml or json)",
                s.trim()
            )
        })
    }
}

/// Line terminator used for the delimiters and block when writing back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// Follow whatever terminates the first line of `text`.
    pub fn detect(text: &str) -> Self {
        match text.find('\n') {
            Some(idx) if text[..idx].ends_with('\r') => LineEnding::CrLf,
            _ => LineEnding::Lf,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// A document split into frontmatter and body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub frontmatter: Frontmatter,
    pub body: String,
    pub language: Language,
    pub line_ending: LineEnding,
    /// Raw block text as read, empty when the document had no block.
    pub matter: String,
    /// Text after the opening delimiter, `None` when there was no block.
    opening_tag: Option<String>,
}

impl Document {
    /// A document with no frontmatter block yet.
    pub fn new(body: impl Into<String>, language: Language) -> Self {
        Self {
            frontmatter: Frontmatter::new(),
            body: body.into(),
            language,
            line_ending: LineEnding::Lf,
            matter: String::new(),
            opening_tag: None,
        }
    }

    /// Read and split the document at `path`. Every call reads the file.
    pub async fn read(path: impl AsRef<Path>, default_language: Language) -> Result<Self, AppError> {
        let text = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::parse(&text, default_language)
    }

    pub fn parse(text: &str, default_language: Language) -> Result<Self, AppError> {
        Self::parse_with(text, default_language, &Engines::default())
    }

    pub fn parse_with(
        text: &str,
        default_language: Language,
        engines: &Engines,
    ) -> Result<Self, AppError> {
        let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
        let mut document = Document::new(text, default_language);
        document.line_ending = LineEnding::detect(text);

        let Some(after_open) = text.strip_prefix(DELIMITER) else {
            return Ok(document);
        };
        if after_open.starts_with('-') {
            return Ok(document);
        }

        let (tag, rest) = match after_open.find('\n') {
            Some(idx) => (after_open[..idx].trim_end_matches('\r'), &after_open[idx + 1..]),
            None => (after_open.trim_end_matches('\r'), ""),
        };
        if !tag.trim().is_empty() {
            document.language = Language::from_tag(tag).ok_or_else(|| {
                AppError::new(
                    ErrorCategory::EncodingError,
                    format!("unsupported frontmatter language '{}'", tag.trim()),
                )
                .with_code("FM-ENC-002")
            })?;
        }

        let (matter, body) = split_at_closing_line(rest);
        document.opening_tag = Some(tag.to_string());
        document.matter = matter.to_string();
        document.body = body.to_string();
        if !matter.trim().is_empty() {
            document.frontmatter = engines.get(document.language).parse(matter)?;
        }
        Ok(document)
    }

    /// Join frontmatter and body. An empty tree writes the body alone.
    ///
    /// A non-empty body always ends with a line break.
    pub fn stringify(&self, engines: &Engines) -> Result<String, AppError> {
        let newline = self.line_ending.as_str();
        let mut body = self.body.clone();
        if !body.is_empty() && !body.ends_with('\n') {
            body.push_str(newline);
        }
        if self.frontmatter.is_empty() {
            return Ok(body);
        }

        let matter = engines.get(self.language).stringify(&self.frontmatter)?;
        let mut out = String::with_capacity(matter.len() + body.len() + 16);
        out.push_str(DELIMITER);
        if let Some(tag) = &self.opening_tag {
            out.push_str(tag);
        }
        out.push_str(newline);
        for line in matter.trim_end().split('\n') {
            out.push_str(line);
            out.push_str(newline);
        }
        out.push_str(DELIMITER);
        out.push_str(newline);
        out.push_str(&body);
        Ok(out)
    }
}

/// Returns (block, body) for the text after the opening line.
fn split_at_closing_line(rest: &str) -> (&str, &str) {
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let content = line.trim_end_matches('\n').trim_end_matches('\r');
        if content.trim_end() == DELIMITER {
            return (&rest[..offset], &rest[offset + line.len()..]);
        }
        offset += line.len();
    }
    (rest, "")
}
