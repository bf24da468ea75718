//! Conversion between native date values and their textual forms.
//!
//! Declarative queries only see text, so before evaluation every string that
//! spells a date-time is turned into a [`Value::Date`] and the query bridge then
//! renders it canonically. On the way out, dates are rendered either in the
//! canonical round-trip form or with a caller-supplied token pattern.

mod format;

pub use format::{format_utc, DateFormat};

use crate::core::error::AppError;
use crate::core::value::{canonical_date_string, Frontmatter, Value};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use regex::Regex;
use std::sync::OnceLock;

/// `YYYY-MM-DD[THH:mm[:ss[.sss]][Z|±HH:mm]]`
fn date_time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(\d{4})-(\d{2})-(\d{2})(?:T(\d{2}):(\d{2})(?::(\d{2})(?:\.(\d{3}))?)?(Z|[+-]\d{2}:\d{2})?)?$",
        )
        .expect("date-time pattern is valid")
    })
}

/// Parse a string in the canonical date-time format subset.
///
/// Returns `None` when the text does not match the grammar or names an
/// impossible calendar instant (for example `2023-13-45`). A missing UTC
/// offset is read as UTC.
pub fn parse_date_time_string(text: &str) -> Option<DateTime<Utc>> {
    let caps = date_time_pattern().captures(text)?;
    let number = |idx: usize| -> Option<u32> {
        caps.get(idx)
            .map(|m| m.as_str().parse().ok())
            .unwrap_or(Some(0))
    };

    let year: i32 = caps[1].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, number(2)?, number(3)?)?;
    let time = NaiveTime::from_hms_milli_opt(number(4)?, number(5)?, number(6)?, number(7)?)?;
    let offset = match caps.get(8).map(|m| m.as_str()) {
        None | Some("Z") => FixedOffset::east_opt(0)?,
        Some(suffix) => parse_offset(suffix)?,
    };

    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// `±HH:mm` to a fixed offset.
fn parse_offset(suffix: &str) -> Option<FixedOffset> {
    let sign = if suffix.starts_with('-') { -1 } else { 1 };
    let hours: i32 = suffix.get(1..3)?.parse().ok()?;
    let minutes: i32 = suffix.get(4..6)?.parse().ok()?;
    if minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Replace every date-time string in the tree with a native date value.
///
/// Sequences keep their order and length, mappings keep all of their keys,
/// values that are already dates pass through untouched.
pub fn normalize_dates_for_query(value: Value) -> Value {
    match value {
        Value::String(text) => match parse_date_time_string(&text) {
            Some(date) => Value::Date(date),
            None => Value::String(text),
        },
        Value::Sequence(items) => {
            Value::Sequence(items.into_iter().map(normalize_dates_for_query).collect())
        }
        Value::Mapping(map) => Value::Mapping(normalize_frontmatter(map)),
        other => other,
    }
}

pub fn normalize_frontmatter(frontmatter: Frontmatter) -> Frontmatter {
    frontmatter
        .into_iter()
        .map(|(key, value)| (key, normalize_dates_for_query(value)))
        .collect()
}

/// Replace every native date value in the tree with text.
///
/// Without a format the canonical `YYYY-MM-DDTHH:mm:ss.sssZ` form is used;
/// with one, the date is rendered as UTC wall-clock time.
pub fn denormalize_dates(value: Value, format: Option<&DateFormat>) -> Value {
    match value {
        Value::Date(date) => Value::String(match format {
            Some(format) => format.render(&date),
            None => canonical_date_string(&date),
        }),
        Value::Sequence(items) => Value::Sequence(
            items
                .into_iter()
                .map(|item| denormalize_dates(item, format))
                .collect(),
        ),
        Value::Mapping(map) => Value::Mapping(denormalize_mapping(map, format)),
        other => other,
    }
}

pub(crate) fn denormalize_mapping(
    frontmatter: Frontmatter,
    format: Option<&DateFormat>,
) -> Frontmatter {
    frontmatter
        .into_iter()
        .map(|(key, value)| (key, denormalize_dates(value, format)))
        .collect()
}

/// Denormalize a whole frontmatter tree, compiling `pattern` first.
pub fn denormalize_frontmatter(
    frontmatter: Frontmatter,
    pattern: Option<&str>,
) -> Result<Frontmatter, AppError> {
    let format = pattern.map(DateFormat::parse).transpose()?;
    Ok(denormalize_mapping(frontmatter, format.as_ref()))
}
