use frontmatter_transform::core::config::loader::{
    ENV_DEFAULT_LANGUAGE, ENV_LOG_DIR, ENV_LOG_LEVEL, ENV_QUERY_MAX_OPERATIONS,
};
use frontmatter_transform::core::config::{ConfigLoader, TransformConfig, CONFIG_FILE_NAME};
use frontmatter_transform::core::{ErrorCategory, FilePipeline, Language};
use frontmatter_transform::logging::config::LoggingConfig;
use frontmatter_transform::logging::ConsoleOutput;
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

fn clear_transform_env() {
    for v in &[
        ENV_QUERY_MAX_OPERATIONS,
        ENV_DEFAULT_LANGUAGE,
        ENV_LOG_LEVEL,
        ENV_LOG_DIR,
    ] {
        env::remove_var(v);
    }
}

#[test]
#[serial]
fn test_missing_file_yields_defaults() {
    clear_transform_env();
    let temp_dir = TempDir::new().unwrap();
    let config = ConfigLoader::load_from_dir(temp_dir.path()).unwrap();
    assert_eq!(config, TransformConfig::default());
    assert_eq!(config.query.max_operations, 100_000);
    assert_eq!(config.document.default_language, Language::Yaml);
}

#[test]
#[serial]
fn test_config_file_is_loaded() {
    clear_transform_env();
    let temp_dir = TempDir::new().unwrap();
    let config_content = r#"
[query]
max_operations = 5000
max_call_levels = 16

[document]
default_language = "json"

[logging]
default_level = "debug"
log_dir = "logs"
console_output = "none"
"#;
    fs::write(temp_dir.path().join(CONFIG_FILE_NAME), config_content).unwrap();

    let config = ConfigLoader::load_from_dir(temp_dir.path()).unwrap();
    assert_eq!(config.query.max_operations, 5000);
    assert_eq!(config.query.max_call_levels, 16);
    assert_eq!(config.query.max_expr_depth, 64);
    assert_eq!(config.document.default_language, Language::Json);

    let logging = LoggingConfig::from_section(&config.logging, Some(temp_dir.path())).unwrap();
    assert_eq!(logging.default_level, "debug");
    assert!(logging.enable_file);
    assert_eq!(logging.console_output, ConsoleOutput::None);
}

#[test]
#[serial]
fn test_env_overrides_take_precedence() {
    clear_transform_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(CONFIG_FILE_NAME),
        "[query]\nmax_operations = 5000\n",
    )
    .unwrap();

    env::set_var(ENV_QUERY_MAX_OPERATIONS, "777");
    env::set_var(ENV_DEFAULT_LANGUAGE, "json");
    env::set_var(ENV_LOG_LEVEL, "warn");
    env::set_var(ENV_LOG_DIR, "/tmp/fm-logs");

    let config = ConfigLoader::load_from_dir(temp_dir.path()).unwrap();
    clear_transform_env();

    assert_eq!(config.query.max_operations, 777);
    assert_eq!(config.document.default_language, Language::Json);
    assert_eq!(config.logging.default_level.as_deref(), Some("warn"));
    assert_eq!(config.logging.log_dir.as_deref(), Some("/tmp/fm-logs"));
}

#[test]
#[serial]
fn test_invalid_env_values_are_ignored() {
    clear_transform_env();
    let temp_dir = TempDir::new().unwrap();
    env::set_var(ENV_QUERY_MAX_OPERATIONS, "lots");
    env::set_var(ENV_DEFAULT_LANGUAGE, "toml");

    let config = ConfigLoader::load_from_dir(temp_dir.path()).unwrap();
    clear_transform_env();

    assert_eq!(config.query.max_operations, 100_000);
    assert_eq!(config.document.default_language, Language::Yaml);
}

#[test]
#[serial]
fn test_malformed_file_is_a_config_error() {
    clear_transform_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "[query\nmax = ").unwrap();

    let err = ConfigLoader::load_from_dir(temp_dir.path()).unwrap_err();
    assert_eq!(err.category, ErrorCategory::ConfigError);
    assert_eq!(err.code, "FM-CFG-001");
}

#[test]
#[serial]
fn test_zero_limit_fails_validation() {
    clear_transform_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(CONFIG_FILE_NAME),
        "[query]\nmax_expr_depth = 0\n",
    )
    .unwrap();

    let err = ConfigLoader::load_from_dir(temp_dir.path()).unwrap_err();
    assert_eq!(err.code, "FM-CFG-002");
    assert!(err.message.contains("max_expr_depth"));
}

#[tokio::test]
#[serial]
async fn test_pipeline_uses_configured_default_language() {
    clear_transform_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join(CONFIG_FILE_NAME),
        "[document]\ndefault_language = \"json\"\n",
    )
    .unwrap();
    let config = ConfigLoader::load_from_dir(temp_dir.path()).unwrap();

    let path = temp_dir.path().join("post.md");
    fs::write(&path, "---\n{\"title\": \"A\"}\n---\nbody\n").unwrap();
    FilePipeline::from_config(&config)
        .transform_file(&path, r#"#{ title: "B" }"#, None)
        .await
        .unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "---\n{\n  \"title\": \"B\"\n}\n---\nbody\n"
    );
}
