use chrono::{DateTime, TimeZone, Utc};
use frontmatter_transform::core::{
    denormalize_dates, denormalize_frontmatter, format_utc, normalize_dates_for_query,
    normalize_frontmatter, DateFormat, ErrorCategory, Frontmatter, Value,
};

fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

fn sample_tree() -> Value {
    let mut nested = Frontmatter::new();
    nested.insert("updated".into(), "2023-06-15T08:30:00+02:00".into());
    nested.insert("label".into(), "2023-13-45".into());

    let mut tree = Frontmatter::new();
    tree.insert("title".into(), "hello world".into());
    tree.insert("published".into(), "2023-06-15".into());
    tree.insert("count".into(), 3.into());
    tree.insert("draft".into(), false.into());
    tree.insert("nothing".into(), Value::Null);
    tree.insert(
        "history".into(),
        vec!["2020-01-01T00:00Z", "not a date", "2020-02-30"].into(),
    );
    tree.insert("meta".into(), Value::Mapping(nested));
    Value::Mapping(tree)
}

#[test]
fn test_detection_converts_only_valid_dates() {
    let normalized = normalize_dates_for_query(sample_tree());
    let tree = normalized.as_mapping().unwrap();

    assert_eq!(tree["title"], Value::from("hello world"));
    assert_eq!(tree["published"], Value::Date(utc(2023, 6, 15, 0, 0, 0)));
    assert_eq!(tree["count"], Value::from(3));
    assert_eq!(tree["draft"], Value::from(false));
    assert!(tree["nothing"].is_null());

    let history = tree["history"].as_sequence().unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0], Value::Date(utc(2020, 1, 1, 0, 0, 0)));
    assert_eq!(history[1], Value::from("not a date"));
    assert_eq!(history[2], Value::from("2020-02-30"));

    let meta = tree["meta"].as_mapping().unwrap();
    assert_eq!(meta["updated"], Value::Date(utc(2023, 6, 15, 6, 30, 0)));
    assert_eq!(meta["label"], Value::from("2023-13-45"));
}

#[test]
fn test_normalization_is_idempotent() {
    let once = normalize_dates_for_query(sample_tree());
    let twice = normalize_dates_for_query(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn test_normalization_keeps_key_order() {
    let normalized = normalize_dates_for_query(sample_tree());
    let keys: Vec<_> = normalized.as_mapping().unwrap().keys().cloned().collect();
    assert_eq!(
        keys,
        vec!["title", "published", "count", "draft", "nothing", "history", "meta"]
    );
}

#[test]
fn test_denormalize_without_format_is_canonical_utc() {
    let value = denormalize_dates(Value::Date(utc(2023, 1, 1, 12, 0, 0)), None);
    assert_eq!(value, Value::from("2023-01-01T12:00:00.000Z"));
}

#[test]
fn test_denormalize_with_format_renders_utc_wall_clock() {
    let format = DateFormat::parse("yyyy-MM-dd HH:mm:ss").unwrap();
    let value = denormalize_dates(
        Value::Sequence(vec![
            Value::Date(utc(2023, 1, 1, 12, 0, 0)),
            Value::from("untouched"),
        ]),
        Some(&format),
    );
    assert_eq!(
        value,
        Value::Sequence(vec!["2023-01-01 12:00:00".into(), "untouched".into()])
    );
}

#[test]
fn test_denormalize_frontmatter_with_pattern() {
    let mut tree = Frontmatter::new();
    tree.insert("date".into(), Value::Date(utc(2024, 2, 29, 23, 59, 59)));
    let out = denormalize_frontmatter(tree, Some("yyyy/DDD")).unwrap();
    assert_eq!(out["date"], Value::from("2024/060"));
}

#[test]
fn test_week_year_tokens() {
    // 2022-01-01 is a Saturday: local week 1 of 2022, ISO week 52 of 2021.
    let date = utc(2022, 1, 1, 0, 0, 0);
    assert_eq!(format_utc(&date, "YYYY-'W'ww").unwrap(), "2022-W01");
    assert_eq!(format_utc(&date, "RRRR-'W'II").unwrap(), "2021-W52");
}

#[test]
fn test_invalid_pattern_is_a_date_format_error() {
    let err = format_utc(&utc(2023, 1, 1, 0, 0, 0), "yyyy-MM-dd j").unwrap_err();
    assert_eq!(err.category, ErrorCategory::DateFormatError);
    assert_eq!(err.code, "FM-DATE-001");
}

#[test]
fn test_normalize_frontmatter_matches_value_walk() {
    let tree = sample_tree().as_mapping().unwrap().clone();
    let expected = normalize_dates_for_query(Value::Mapping(tree.clone()));
    assert_eq!(Value::Mapping(normalize_frontmatter(tree)), expected);
}
