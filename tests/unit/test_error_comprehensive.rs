use frontmatter_transform::core::error::AppError;
use frontmatter_transform::core::types::{ErrorCategory, ErrorSeverity};

#[test]
fn test_error_creation_all_categories() {
    let categories = vec![
        ErrorCategory::ValidationError,
        ErrorCategory::QueryError,
        ErrorCategory::DateFormatError,
        ErrorCategory::EncodingError,
        ErrorCategory::DocumentError,
        ErrorCategory::SerializationError,
        ErrorCategory::ConfigError,
        ErrorCategory::IoError,
        ErrorCategory::InternalError,
        ErrorCategory::Unknown,
    ];

    for category in categories {
        let error = AppError::new(category, "test message");
        assert_eq!(error.category, category);
        assert_eq!(error.message, "test message");
        assert_eq!(error.context.len(), 0);
        assert!(error.occurred_at <= chrono::Utc::now());
        assert!(error.source.is_none());
        assert!(error.code.starts_with("ERR-"));
    }
}

#[test]
fn test_error_severity_mapping() {
    let test_cases = vec![
        (ErrorCategory::ValidationError, ErrorSeverity::Error),
        (ErrorCategory::QueryError, ErrorSeverity::Error),
        (ErrorCategory::EncodingError, ErrorSeverity::Error),
        (ErrorCategory::IoError, ErrorSeverity::Error),
        (ErrorCategory::Unknown, ErrorSeverity::Info),
    ];

    for (category, expected) in test_cases {
        assert_eq!(AppError::new(category, "msg").severity(), expected);
    }
}

#[test]
fn test_error_display_format() {
    let error = AppError::new(ErrorCategory::EncodingError, "json cannot hold dates")
        .with_code("FM-ENC-001")
        .with_context("post.md");
    let display = error.to_string();
    assert!(display.starts_with("[FM-ENC-001] EncodingError: json cannot hold dates"));
    assert!(display.contains("post.md"));
}

#[test]
fn test_error_with_source_displays_cause() {
    let cause = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read only");
    let error = AppError::with_source(
        ErrorCategory::DocumentError,
        "failed to write document",
        Box::new(cause),
    );
    assert!(error.source.is_some());
    assert!(error.to_string().contains("Caused by: read only"));
}

#[test]
fn test_from_anyhow() {
    let error: AppError = anyhow::anyhow!("something broke").into();
    assert_eq!(error.category, ErrorCategory::InternalError);
    assert_eq!(error.code, "ANYHOW_ERROR");
    assert_eq!(error.message, "something broke");
}

#[test]
fn test_from_io_error_passes_kind_through() {
    let error: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert_eq!(error.category, ErrorCategory::IoError);
    assert_eq!(error.io_error_kind(), Some(std::io::ErrorKind::NotFound));
    assert_eq!(error.message, "gone");
}

#[test]
fn test_category_display() {
    assert_eq!(ErrorCategory::DateFormatError.to_string(), "DateFormatError");
}
