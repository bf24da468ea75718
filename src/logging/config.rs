use crate::logging::layers::console::ConsoleOutput;
use crate::Result;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing_subscriber::filter::Directive;

const DEFAULT_LEVEL: &str = "info";

/// `[logging]` table of frontmatter-transform.toml, as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingSection {
    pub log_dir: Option<String>,
    pub default_level: Option<String>,
    pub enable_file: Option<bool>,
    #[serde(default)]
    pub console_output: Option<ConsoleOutput>,
}

/// Resolved logging configuration after applying the config file section.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_dir: Option<PathBuf>,
    pub default_level: String,
    pub enable_file: bool,
    pub console_output: ConsoleOutput,
    /// Directory that relative `log_dir` values are resolved against.
    pub base_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            default_level: DEFAULT_LEVEL.to_string(),
            enable_file: false,
            console_output: ConsoleOutput::default(),
            base_dir: None,
        }
    }
}

impl LoggingConfig {
    /// Resolve a config file section. `base_dir` is usually the directory the
    /// config file was loaded from.
    pub fn from_section(section: &LoggingSection, base_dir: Option<&Path>) -> Result<Self> {
        let mut config = LoggingConfig {
            base_dir: base_dir.map(Path::to_path_buf),
            ..Default::default()
        };
        if let Some(log_dir) = &section.log_dir {
            config.log_dir = Some(PathBuf::from(log_dir));
            // A configured directory implies the file sink unless disabled.
            config.enable_file = true;
        }
        if let Some(default_level) = &section.default_level {
            config.default_level = default_level.clone();
        }
        if let Some(enable_file) = section.enable_file {
            config.enable_file = enable_file;
        }
        if let Some(console_output) = section.console_output {
            config.console_output = console_output;
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        Directive::from_str(&self.default_level)
            .map_err(|_| anyhow!("logging.default_level must be a valid tracing directive"))?;
        Ok(())
    }
}
