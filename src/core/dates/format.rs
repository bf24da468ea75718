//! Token-pattern date rendering (`yyyy-MM-dd HH:mm:ss` style).
//!
//! Patterns use Unicode/date-fns tokens with English names, weeks starting on
//! Sunday and the first week containing January 1st. Rendering is always done
//! in UTC, so the output never depends on the host time zone.

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Utc};

const MONTHS_WIDE: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const DAYS_WIDE: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const DAYS_SHORT: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

/// Letters that may carry the `o` ordinal suffix.
const ORDINAL_LETTERS: &str = "yYQqMLwIdDecihHKkms";

/// Letters with a renderer.
const FIELD_LETTERS: &str = "GyYRuQqMLwIdDEeciabBHhKkmsSXxOztT";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("format string contains an unescaped latin alphabet character `{0}`")]
    UnescapedLetter(char),
    #[error("format string has an unterminated quoted literal")]
    UnterminatedLiteral,
}

impl From<PatternError> for AppError {
    fn from(err: PatternError) -> Self {
        AppError::new(
            ErrorCategory::DateFormatError,
            format!("invalid date format: {}", err),
        )
        .with_code("FM-DATE-001")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Field {
        letter: char,
        width: usize,
        ordinal: bool,
    },
}

/// A compiled date pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    pattern: String,
    parts: Vec<Part>,
}

impl DateFormat {
    pub fn parse(pattern: &str) -> Result<Self, AppError> {
        let expanded = expand_long_formats(pattern)?;
        let parts = tokenize(&expanded)?;
        Ok(DateFormat {
            pattern: pattern.to_string(),
            parts,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Render `date` as UTC wall-clock text.
    pub fn render(&self, date: &DateTime<Utc>) -> String {
        let naive = date.naive_utc();
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Field {
                    letter,
                    width,
                    ordinal,
                } => out.push_str(&render_field(&naive, *letter, *width, *ordinal)),
            }
        }
        out
    }
}

/// Format a date with a token pattern as UTC wall-clock time.
pub fn format_utc(date: &DateTime<Utc>, pattern: &str) -> Result<String, AppError> {
    Ok(DateFormat::parse(pattern)?.render(date))
}

fn tokenize(pattern: &str) -> Result<Vec<Part>, PatternError> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut parts = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\'' {
            let (text, next) = read_quoted(&chars, i)?;
            parts.push(Part::Literal(text));
            i = next;
            continue;
        }
        if c.is_ascii_alphabetic() {
            if !FIELD_LETTERS.contains(c) {
                return Err(PatternError::UnescapedLetter(c));
            }
            let mut width = 1;
            while chars.get(i + width) == Some(&c) {
                width += 1;
            }
            let ordinal =
                width == 1 && ORDINAL_LETTERS.contains(c) && chars.get(i + 1) == Some(&'o');
            parts.push(Part::Field {
                letter: c,
                width,
                ordinal,
            });
            i += width + usize::from(ordinal);
            continue;
        }
        parts.push(Part::Literal(c.to_string()));
        i += 1;
    }
    Ok(parts)
}

/// Read a quoted literal starting at `start`; `''` is an escaped quote.
fn read_quoted(chars: &[char], start: usize) -> Result<(String, usize), PatternError> {
    if chars.get(start + 1) == Some(&'\'') {
        return Ok(("'".to_string(), start + 2));
    }
    let mut text = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        if chars[i] == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                text.push('\'');
                i += 2;
                continue;
            }
            return Ok((text, i + 1));
        }
        text.push(chars[i]);
        i += 1;
    }
    // An open quote runs to the end of the pattern.
    if text.is_empty() {
        return Err(PatternError::UnterminatedLiteral);
    }
    Ok((text, i))
}

/// Expand `P`, `p` and `Pp` runs into their English long formats.
fn expand_long_formats(pattern: &str) -> Result<String, PatternError> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::new();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\'' => {
                let (_, next) = read_quoted(&chars, i)?;
                out.extend(&chars[i..next]);
                i = next;
            }
            'P' => {
                let date_width = run_length(&chars, i, 'P');
                i += date_width;
                let time_width = run_length(&chars, i, 'p');
                i += time_width;
                let date = long_date(date_width);
                if time_width == 0 {
                    out.push_str(date);
                } else {
                    let joiner = if date_width >= 3 { " 'at' " } else { ", " };
                    out.push_str(date);
                    out.push_str(joiner);
                    out.push_str(long_time(time_width));
                }
            }
            'p' => {
                let width = run_length(&chars, i, 'p');
                out.push_str(long_time(width));
                i += width;
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    Ok(out)
}

fn run_length(chars: &[char], start: usize, letter: char) -> usize {
    chars[start..].iter().take_while(|&&c| c == letter).count()
}

fn long_date(width: usize) -> &'static str {
    match width {
        1 => "MM/dd/yyyy",
        2 => "MMM d, y",
        3 => "MMMM do, y",
        _ => "EEEE, MMMM do, y",
    }
}

fn long_time(width: usize) -> &'static str {
    match width {
        1 => "h:mm a",
        2 => "h:mm:ss a",
        3 => "h:mm:ss a z",
        _ => "h:mm:ss a zzzz",
    }
}

fn render_field(dt: &NaiveDateTime, letter: char, width: usize, ordinal: bool) -> String {
    let date = dt.date();
    let numeric = |n: i64| {
        if ordinal {
            ordinal_number(n)
        } else {
            pad(n, width)
        }
    };

    match letter {
        'G' => {
            let (ad, bc) = match width {
                1..=3 => ("AD", "BC"),
                4 => ("Anno Domini", "Before Christ"),
                _ => ("A", "B"),
            };
            (if date.year() > 0 { ad } else { bc }).to_string()
        }
        'y' => era_year(i64::from(date.year()), width, ordinal),
        'Y' => era_year(i64::from(local_week_year(date)), width, ordinal),
        'R' => pad(i64::from(date.iso_week().year()), width),
        'u' => pad(i64::from(date.year()), width),
        'Q' | 'q' => {
            let quarter = i64::from(date.month0() / 3 + 1);
            match (ordinal, width) {
                (true, _) => ordinal_number(quarter),
                (false, 1 | 2) => pad(quarter, width),
                (false, 3) => format!("Q{}", quarter),
                (false, 5) => quarter.to_string(),
                _ => format!("{} quarter", ordinal_number(quarter)),
            }
        }
        'M' | 'L' => {
            let month = date.month0() as usize;
            match (ordinal, width) {
                (true, _) => ordinal_number(month as i64 + 1),
                (false, 1 | 2) => pad(month as i64 + 1, width),
                (false, 3) => MONTHS_WIDE[month][..3].to_string(),
                (false, 5) => MONTHS_WIDE[month][..1].to_string(),
                _ => MONTHS_WIDE[month].to_string(),
            }
        }
        'w' => numeric(i64::from(local_week(date))),
        'I' => numeric(i64::from(date.iso_week().week())),
        'd' => numeric(i64::from(date.day())),
        'D' => numeric(i64::from(date.ordinal())),
        'E' => {
            let weekday = date.weekday().num_days_from_sunday() as usize;
            weekday_name(weekday, width.max(3))
        }
        'e' | 'c' => {
            let weekday = date.weekday().num_days_from_sunday() as usize;
            match (ordinal, width) {
                (true, _) => ordinal_number(weekday as i64 + 1),
                (false, 1 | 2) => pad(weekday as i64 + 1, width),
                _ => weekday_name(weekday, width),
            }
        }
        'i' => {
            let iso_day = date.weekday().number_from_monday() as i64;
            match (ordinal, width) {
                (true, _) => ordinal_number(iso_day),
                (false, 1 | 2) => pad(iso_day, width),
                _ => weekday_name(date.weekday().num_days_from_sunday() as usize, width),
            }
        }
        'a' => {
            let (am, pm) = match width {
                1 | 2 => ("AM", "PM"),
                3 => ("am", "pm"),
                5 => ("a", "p"),
                _ => ("a.m.", "p.m."),
            };
            (if dt.hour() < 12 { am } else { pm }).to_string()
        }
        'b' => {
            let hour = dt.hour();
            let (am, pm, noon, midnight) = match width {
                1 | 2 => ("AM", "PM", "noon", "midnight"),
                3 => ("am", "pm", "noon", "midnight"),
                5 => ("a", "p", "n", "mi"),
                _ => ("a.m.", "p.m.", "noon", "midnight"),
            };
            match hour {
                12 => noon,
                0 => midnight,
                h if h < 12 => am,
                _ => pm,
            }
            .to_string()
        }
        'B' => match dt.hour() {
            h if h >= 17 => "in the evening",
            h if h >= 12 => "in the afternoon",
            h if h >= 4 => "in the morning",
            _ => "at night",
        }
        .to_string(),
        'h' => {
            let hour = dt.hour() % 12;
            numeric(i64::from(if hour == 0 { 12 } else { hour }))
        }
        'H' => numeric(i64::from(dt.hour())),
        'K' => numeric(i64::from(dt.hour() % 12)),
        'k' => numeric(i64::from(if dt.hour() == 0 { 24 } else { dt.hour() })),
        'm' => numeric(i64::from(dt.minute())),
        's' => numeric(i64::from(dt.second())),
        'S' => {
            // Only milliseconds are kept; longer runs are padded with zeros.
            let millis = pad(i64::from(dt.and_utc().timestamp_subsec_millis()), 3);
            let mut fraction: String = millis.chars().take(width).collect();
            fraction.extend(std::iter::repeat('0').take(width.saturating_sub(3)));
            fraction
        }
        'X' => "Z".to_string(),
        'x' => match width {
            1 => "+00".to_string(),
            2 | 4 => "+0000".to_string(),
            _ => "+00:00".to_string(),
        },
        'O' | 'z' => {
            if width == 4 {
                "GMT+00:00".to_string()
            } else {
                "GMT+0".to_string()
            }
        }
        't' => pad(dt.and_utc().timestamp(), width),
        'T' => pad(dt.and_utc().timestamp_millis(), width),
        _ => String::new(),
    }
}

fn era_year(signed: i64, width: usize, ordinal: bool) -> String {
    let year = if signed > 0 { signed } else { 1 - signed };
    if ordinal {
        return ordinal_number(year);
    }
    if width == 2 {
        pad(year % 100, 2)
    } else {
        pad(year, width)
    }
}

fn weekday_name(weekday: usize, width: usize) -> String {
    match width {
        1..=3 => DAYS_WIDE[weekday][..3].to_string(),
        5 => DAYS_WIDE[weekday][..1].to_string(),
        6 => DAYS_SHORT[weekday].to_string(),
        _ => DAYS_WIDE[weekday].to_string(),
    }
}

fn pad(n: i64, width: usize) -> String {
    let sign = if n < 0 { "-" } else { "" };
    format!("{}{:0>width$}", sign, n.unsigned_abs(), width = width)
}

fn ordinal_number(n: i64) -> String {
    let rem100 = n % 100;
    let suffix = if !(10..=20).contains(&rem100) {
        match rem100 % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        }
    } else {
        "th"
    };
    format!("{}{}", n, suffix)
}

fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

fn jan_first(year: i32) -> NaiveDate {
    NaiveDate::from_yo_opt(year, 1).unwrap_or(NaiveDate::MAX)
}

/// Week-numbering year for Sunday-start weeks where week 1 contains Jan 1.
fn local_week_year(date: NaiveDate) -> i32 {
    let year = date.year();
    if date >= start_of_week(jan_first(year + 1)) {
        year + 1
    } else if date >= start_of_week(jan_first(year)) {
        year
    } else {
        year - 1
    }
}

fn local_week(date: NaiveDate) -> u32 {
    let first = start_of_week(jan_first(local_week_year(date)));
    let days = (start_of_week(date) - first).num_days();
    (days / 7) as u32 + 1
}
