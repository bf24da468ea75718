#![allow(clippy::result_large_err)]

//! YAML frontmatter codec.
//!
//! Reading goes through `serde_yaml` and resolves plain timestamp scalars to
//! dates. Writing is a small block-style emitter so that quoting of
//! timestamp-looking strings stays under our control.

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use crate::core::value::{canonical_date_string, Frontmatter, Number, Value};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use regex::Regex;
use serde_yaml::Value as YamlValue;
use std::sync::OnceLock;

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("yaml date pattern is valid")
    })
}

fn timestamp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[Tt]|[ \t]+)(\d{1,2}):(\d{2}):(\d{2})(?:\.(\d*))?(?:[ \t]*(Z|([-+])(\d{1,2})(?::(\d{2}))?))?$",
        )
        .expect("yaml timestamp pattern is valid")
    })
}

/// Resolve a YAML timestamp scalar. Without an offset the time is UTC.
pub fn parse_yaml_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Some(caps) = date_pattern().captures(text) {
        let date = NaiveDate::from_ymd_opt(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        )?;
        return Some(date.and_time(NaiveTime::MIN).and_utc());
    }

    let caps = timestamp_pattern().captures(text)?;
    let date = NaiveDate::from_ymd_opt(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    )?;
    let millis = caps
        .get(7)
        .map(|m| {
            let digits: String = m.as_str().chars().chain("000".chars()).take(3).collect();
            digits.parse::<u32>()
        })
        .transpose()
        .ok()?
        .unwrap_or(0);
    let time = NaiveTime::from_hms_milli_opt(
        caps[4].parse().ok()?,
        caps[5].parse().ok()?,
        caps[6].parse().ok()?,
        millis,
    )?;

    let offset_seconds = match caps.get(9) {
        Some(sign) => {
            let hours: i32 = caps[10].parse().ok()?;
            let minutes: i32 = caps.get(11).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
            let seconds = hours * 3600 + minutes * 60;
            if sign.as_str() == "-" {
                -seconds
            } else {
                seconds
            }
        }
        None => 0,
    };
    FixedOffset::east_opt(offset_seconds)?
        .from_local_datetime(&date.and_time(time))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse a YAML frontmatter block into a tree.
pub fn parse_block(text: &str) -> Result<Frontmatter, AppError> {
    let parsed: YamlValue = serde_yaml::from_str(text).map_err(|err| {
        AppError::with_source(
            ErrorCategory::DocumentError,
            format!("failed to parse YAML frontmatter: {}", err),
            Box::new(err),
        )
        .with_code("FM-DOC-001")
    })?;

    match parsed {
        YamlValue::Null => Ok(Frontmatter::new()),
        YamlValue::Mapping(map) => convert_mapping(map, text),
        YamlValue::Tagged(tagged) => match tagged.value {
            YamlValue::Mapping(map) => convert_mapping(map, text),
            other => Err(not_a_mapping(yaml_type_name(&other))),
        },
        other => Err(not_a_mapping(yaml_type_name(&other))),
    }
}

fn not_a_mapping(found: &str) -> AppError {
    AppError::new(
        ErrorCategory::DocumentError,
        format!("frontmatter must be a mapping, found {}", found),
    )
    .with_code("FM-DOC-002")
}

fn yaml_type_name(value: &YamlValue) -> &'static str {
    match value {
        YamlValue::Null => "null",
        YamlValue::Bool(_) => "boolean",
        YamlValue::Number(_) => "number",
        YamlValue::String(_) => "string",
        YamlValue::Sequence(_) => "sequence",
        YamlValue::Mapping(_) => "mapping",
        YamlValue::Tagged(_) => "tagged value",
    }
}

fn convert_mapping(map: serde_yaml::Mapping, source: &str) -> Result<Frontmatter, AppError> {
    let mut tree = Frontmatter::new();
    for (key, value) in map {
        tree.insert(key_to_string(key), convert(value, source)?);
    }
    Ok(tree)
}

fn key_to_string(key: YamlValue) -> String {
    match key {
        YamlValue::String(s) => s,
        YamlValue::Number(n) => n.to_string(),
        YamlValue::Bool(b) => b.to_string(),
        YamlValue::Null => "null".to_string(),
        YamlValue::Tagged(tagged) => key_to_string(tagged.value),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

fn convert(value: YamlValue, source: &str) -> Result<Value, AppError> {
    Ok(match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(Number::from(i))
            } else if let Some(u) = n.as_u64() {
                Value::Number(Number::from(u))
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                Value::Number(Number::from_f64(f).ok_or_else(|| {
                    AppError::new(
                        ErrorCategory::DocumentError,
                        format!("frontmatter number {} cannot be represented", n),
                    )
                    .with_code("FM-DOC-001")
                })?)
            }
        }
        YamlValue::String(s) => match parse_yaml_timestamp(&s) {
            Some(date) if !only_quoted_in(source, &s) => Value::Date(date),
            _ => Value::String(s),
        },
        YamlValue::Sequence(items) => Value::Sequence(
            items
                .into_iter()
                .map(|item| convert(item, source))
                .collect::<Result<_, _>>()?,
        ),
        YamlValue::Mapping(map) => Value::Mapping(convert_mapping(map, source)?),
        YamlValue::Tagged(tagged) => convert(tagged.value, source)?,
    })
}

/// True when every scalar spelled `text` in `source` is quoted.
///
/// `serde_yaml` does not report scalar styles, so a quoted timestamp is told
/// apart from a plain one by looking at the block text. Occurrences inside a
/// longer scalar are ignored.
fn only_quoted_in(source: &str, text: &str) -> bool {
    let mut seen = false;
    for (idx, _) in source.match_indices(text) {
        let before = source[..idx].chars().next_back();
        let after = source[idx + text.len()..].chars().next();
        if matches!(before, Some('\'' | '"')) && after == before {
            seen = true;
            continue;
        }
        let starts_scalar = matches!(before, None | Some(' ' | '\t' | '\n' | '[' | '{' | ','));
        let ends_scalar = matches!(
            after,
            None | Some(' ' | '\t' | '\r' | '\n' | ',' | ']' | '}' | '#')
        );
        if starts_scalar && ends_scalar {
            return false;
        }
    }
    seen
}

/// Emit `frontmatter` as a block-style YAML document ending in a newline.
pub fn emit(frontmatter: &Frontmatter, quote_timestamps: bool) -> String {
    if frontmatter.is_empty() {
        return "{}\n".to_string();
    }
    let mut emitter = Emitter {
        quote_timestamps,
        out: String::new(),
    };
    emitter.mapping(frontmatter, 0);
    emitter.out
}

struct Emitter {
    quote_timestamps: bool,
    out: String,
}

impl Emitter {
    fn pad(&mut self, indent: usize) {
        self.out.extend(std::iter::repeat(' ').take(indent));
    }

    fn mapping(&mut self, map: &Frontmatter, indent: usize) {
        for (key, value) in map {
            self.pad(indent);
            let key = self.inline_string(key);
            self.out.push_str(&key);
            self.out.push(':');
            self.after_indicator(value, indent, true);
        }
    }

    fn sequence(&mut self, items: &[Value], indent: usize) {
        for item in items {
            self.pad(indent);
            self.out.push('-');
            self.after_indicator(item, indent, false);
        }
    }

    /// Write whatever follows `key:` or `-`, through the end of the entry.
    fn after_indicator(&mut self, value: &Value, indent: usize, under_key: bool) {
        match value {
            Value::Mapping(map) if !map.is_empty() => {
                if under_key {
                    self.out.push('\n');
                    self.mapping(map, indent + 2);
                } else {
                    self.out.push(' ');
                    self.compact(indent + 2, |e| e.mapping(map, indent + 2));
                }
            }
            Value::Sequence(items) if !items.is_empty() => {
                if under_key {
                    self.out.push('\n');
                    self.sequence(items, indent + 2);
                } else {
                    self.out.push(' ');
                    self.compact(indent + 2, |e| e.sequence(items, indent + 2));
                }
            }
            Value::String(s) if use_block_literal(s) => {
                self.out.push(' ');
                self.block_literal(s, indent + 2);
            }
            other => {
                self.out.push(' ');
                let scalar = self.inline(other);
                self.out.push_str(&scalar);
                self.out.push('\n');
            }
        }
    }

    /// Nested collection in a sequence item: its first line shares the dash line.
    fn compact(&mut self, indent: usize, write: impl FnOnce(&mut Self)) {
        let start = self.out.len();
        write(self);
        self.out.replace_range(start..start + indent, "");
    }

    fn block_literal(&mut self, s: &str, indent: usize) {
        let trailing = s.len() - s.trim_end_matches('\n').len();
        let (chomp, content) = match trailing {
            0 => ("-", s),
            1 => ("", &s[..s.len() - 1]),
            _ => ("+", &s[..s.len() - 1]),
        };
        self.out.push('|');
        self.out.push_str(chomp);
        self.out.push('\n');
        for line in content.split('\n') {
            if !line.is_empty() {
                self.pad(indent);
                self.out.push_str(line);
            }
            self.out.push('\n');
        }
    }

    fn inline(&self, value: &Value) -> String {
        match value {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => self.inline_string(s),
            Value::Date(date) => canonical_date_string(date),
            Value::Sequence(_) => "[]".to_string(),
            Value::Mapping(_) => "{}".to_string(),
        }
    }

    fn inline_string(&self, s: &str) -> String {
        if s.chars().any(char::is_control) {
            // JSON string syntax is valid YAML double-quoted syntax.
            return serde_json::to_string(s).unwrap_or_else(|_| format!("{:?}", s));
        }
        if self.is_plain_safe(s) {
            s.to_string()
        } else {
            format!("'{}'", s.replace('\'', "''"))
        }
    }

    fn is_plain_safe(&self, s: &str) -> bool {
        if s.is_empty() || is_legacy_boolean(s) {
            return false;
        }
        if self.quote_timestamps && parse_yaml_timestamp(s).is_some() {
            return false;
        }
        matches!(serde_yaml::from_str::<YamlValue>(s), Ok(YamlValue::String(ref plain)) if plain == s)
    }
}

/// Multi-line strings go into `|` blocks unless they need escaping or an
/// explicit indentation indicator.
fn use_block_literal(s: &str) -> bool {
    s.contains('\n')
        && !s.starts_with([' ', '\n'])
        && !s.chars().any(|c| c != '\n' && c.is_control())
}

/// YAML 1.1 booleans that older readers still resolve.
fn is_legacy_boolean(s: &str) -> bool {
    matches!(
        s,
        "y" | "Y" | "yes" | "Yes" | "YES" | "n" | "N" | "no" | "No" | "NO" | "on" | "On" | "ON"
            | "off" | "Off" | "OFF"
    )
}
