//! Configuration for boardsync.
//!
//! Settings live in `.boardsync/boardsync.toml` inside the project directory
//! and are layered file → environment → CLI flags.
//!
//! # Configuration File Format
//!
//! ```toml
//! [backend]
//! base_url = "http://127.0.0.1:3142/api"
//! token = "optional bearer token"
//! timeout_secs = 30
//!
//! [board]
//! project_id = 1
//! workflow_id = 1
//!
//! [logging]
//! filter = "info"
//! format = "pretty"
//! ```
//!
//! # Environment Overrides
//!
//! | Variable                 | Setting               |
//! |--------------------------|-----------------------|
//! | `BOARDSYNC_BASE_URL`     | `backend.base_url`    |
//! | `BOARDSYNC_TOKEN`        | `backend.token`       |
//! | `BOARDSYNC_PROJECT_ID`   | `board.project_id`    |
//! | `BOARDSYNC_WORKFLOW_ID`  | `board.workflow_id`   |
//! | `BOARDSYNC_LOG`          | `logging.filter`      |
//! | `BOARDSYNC_LOG_FORMAT`   | `logging.format`      |

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::board::models::BoardKey;

pub const CONFIG_DIR: &str = ".boardsync";
pub const CONFIG_FILE: &str = "boardsync.toml";

/// Log line rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, for terminals
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Invalid log format '{}'. Valid values: pretty, json", s),
        }
    }
}

/// Where the board backend lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL every REST path is joined onto
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:3142/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Which board to open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSection {
    #[serde(default = "default_id")]
    pub project_id: i64,
    #[serde(default = "default_id")]
    pub workflow_id: i64,
}

fn default_id() -> i64 {
    1
}

impl Default for BoardSection {
    fn default() -> Self {
        Self {
            project_id: default_id(),
            workflow_id: default_id(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            format: LogFormat::default(),
        }
    }
}

/// Parsed `boardsync.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardsyncToml {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub board: BoardSection,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid {} '{}': {}", name, value, e))
}

impl BoardsyncToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse boardsync.toml")
    }

    /// Load `boardsync.toml` from `config_dir`, or defaults if it is absent.
    pub fn load_or_default(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize boardsync.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Apply `BOARDSYNC_*` overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup("BOARDSYNC_BASE_URL") {
            self.backend.base_url = url;
        }
        if let Some(token) = lookup("BOARDSYNC_TOKEN") {
            self.backend.token = Some(token).filter(|t| !t.is_empty());
        }
        if let Some(id) = lookup("BOARDSYNC_PROJECT_ID") {
            self.board.project_id = parse_env("BOARDSYNC_PROJECT_ID", &id)?;
        }
        if let Some(id) = lookup("BOARDSYNC_WORKFLOW_ID") {
            self.board.workflow_id = parse_env("BOARDSYNC_WORKFLOW_ID", &id)?;
        }
        if let Some(filter) = lookup("BOARDSYNC_LOG") {
            self.logging.filter = filter;
        }
        if let Some(format) = lookup("BOARDSYNC_LOG_FORMAT") {
            self.logging.format = format.parse()?;
        }
        Ok(())
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let url = self.backend.base_url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            warnings.push(format!(
                "Invalid base_url '{}': should start with http:// or https://",
                url
            ));
        }
        if self.backend.timeout_secs == 0 {
            warnings.push("timeout_secs is 0: every request will time out".to_string());
        }
        if self.board.project_id <= 0 {
            warnings.push(format!(
                "Invalid project_id {}: should be positive",
                self.board.project_id
            ));
        }
        if self.board.workflow_id <= 0 {
            warnings.push(format!(
                "Invalid workflow_id {}: should be positive",
                self.board.workflow_id
            ));
        }
        if let Err(e) = tracing_subscriber::EnvFilter::try_new(&self.logging.filter) {
            warnings.push(format!(
                "Invalid logging filter '{}': {}",
                self.logging.filter, e
            ));
        }

        warnings
    }
}

/// Resolved configuration for one invocation.
#[derive(Debug, Clone)]
pub struct BoardsyncConfig {
    pub project_dir: PathBuf,
    pub config_dir: PathBuf,
    pub toml: BoardsyncToml,
    pub verbose: bool,
}

/// CLI flags that override file and environment settings.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub base_url: Option<String>,
    pub project_id: Option<i64>,
    pub workflow_id: Option<i64>,
    pub verbose: bool,
}

impl BoardsyncConfig {
    /// Load the file layer for `project_dir`.
    pub fn new(project_dir: PathBuf) -> Result<Self> {
        let project_dir = project_dir
            .canonicalize()
            .context("Failed to resolve project directory")?;
        let config_dir = project_dir.join(CONFIG_DIR);
        let toml = BoardsyncToml::load_or_default(&config_dir)?;

        Ok(Self {
            project_dir,
            config_dir,
            toml,
            verbose: false,
        })
    }

    /// Load file, then process environment, then CLI flags.
    pub fn with_cli_args(project_dir: PathBuf, cli: CliOverrides) -> Result<Self> {
        let mut config = Self::new(project_dir)?;
        config.toml.apply_env(|name| std::env::var(name).ok())?;
        config.apply_cli(cli);
        Ok(config)
    }

    pub fn apply_cli(&mut self, cli: CliOverrides) {
        if let Some(url) = cli.base_url {
            self.toml.backend.base_url = url;
        }
        if let Some(id) = cli.project_id {
            self.toml.board.project_id = id;
        }
        if let Some(id) = cli.workflow_id {
            self.toml.board.workflow_id = id;
        }
        self.verbose = cli.verbose;
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    pub fn board_key(&self) -> BoardKey {
        BoardKey::new(self.toml.board.project_id, self.toml.board.workflow_id)
    }

    /// Logging settings, with `-v` raising the default filter to debug.
    pub fn logging(&self) -> LoggingConfig {
        let mut logging = self.toml.logging.clone();
        if self.verbose && logging.filter == default_log_filter() {
            logging.filter = "boardsync=debug,info".to_string();
        }
        logging
    }

    pub fn validate(&self) -> Vec<String> {
        self.toml.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_parse_empty_uses_defaults() {
        let config = BoardsyncToml::parse("").unwrap();
        assert_eq!(config.backend.base_url, "http://127.0.0.1:3142/api");
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.board.project_id, 1);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_parse_full_file() {
        let config = BoardsyncToml::parse(
            r#"
            [backend]
            base_url = "https://tracker.example.com/api"
            token = "abc"
            timeout_secs = 5

            [board]
            project_id = 12
            workflow_id = 4

            [logging]
            filter = "debug"
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.backend.token.as_deref(), Some("abc"));
        assert_eq!(config.backend.timeout_secs, 5);
        assert_eq!(config.board.workflow_id, 4);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_parse_rejects_bad_types() {
        assert!(BoardsyncToml::parse("[board]\nproject_id = \"one\"").is_err());
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        let err = "xml".parse::<LogFormat>().unwrap_err();
        assert!(err.to_string().contains("Valid values"));
    }

    #[test]
    fn test_apply_env_overrides_file() {
        let mut config = BoardsyncToml::default();
        config
            .apply_env(env(&[
                ("BOARDSYNC_BASE_URL", "http://10.0.0.2:8080/api"),
                ("BOARDSYNC_PROJECT_ID", "9"),
                ("BOARDSYNC_WORKFLOW_ID", " 3 "),
                ("BOARDSYNC_LOG_FORMAT", "json"),
                ("BOARDSYNC_TOKEN", "secret"),
            ]))
            .unwrap();
        assert_eq!(config.backend.base_url, "http://10.0.0.2:8080/api");
        assert_eq!(config.board.project_id, 9);
        assert_eq!(config.board.workflow_id, 3);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.backend.token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_apply_env_rejects_bad_ids() {
        let mut config = BoardsyncToml::default();
        let err = config
            .apply_env(env(&[("BOARDSYNC_PROJECT_ID", "seven")]))
            .unwrap_err();
        assert!(err.to_string().contains("BOARDSYNC_PROJECT_ID"));
    }

    #[test]
    fn test_validate_reports_problems() {
        let mut config = BoardsyncToml::default();
        config.backend.base_url = "ftp://nowhere".into();
        config.backend.timeout_secs = 0;
        config.board.workflow_id = 0;
        let warnings = config.validate();
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("base_url"));
        assert!(warnings[2].contains("workflow_id"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let mut config = BoardsyncToml::default();
        config.board.project_id = 42;
        config.backend.token = Some("t".into());
        config.save(&path).unwrap();

        let loaded = BoardsyncToml::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_or_default_without_file() {
        let dir = tempdir().unwrap();
        let config = BoardsyncToml::load_or_default(dir.path()).unwrap();
        assert_eq!(config, BoardsyncToml::default());
    }

    #[test]
    fn test_cli_overrides_win() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(CONFIG_DIR)).unwrap();
        std::fs::write(
            dir.path().join(CONFIG_DIR).join(CONFIG_FILE),
            "[board]\nproject_id = 2\nworkflow_id = 2\n",
        )
        .unwrap();

        let mut config = BoardsyncConfig::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(config.board_key(), BoardKey::new(2, 2));

        config.apply_cli(CliOverrides {
            workflow_id: Some(5),
            verbose: true,
            ..Default::default()
        });
        assert_eq!(config.board_key(), BoardKey::new(2, 5));
        assert_eq!(config.logging().filter, "boardsync=debug,info");
    }
}
