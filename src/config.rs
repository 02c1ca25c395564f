//! Configuration for sitebot.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (GEMINI_API_KEY, GEMINI_MODEL, SITEBOT_REFERENCE_TABLE,
//!    TELEGRAM_BOT_TOKEN, PORT)
//! 2. Config file (.sitebot/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .sitebot/config.yaml
//! - Paths in config file are relative to the project root (parent of .sitebot/),
//!   or to the file's own directory for any other config file
//!
//! The resolved `BotConfig` is passed explicitly to the pipeline and bot.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::gemini::GeminiConfig;
use crate::adapters::telegram::{TelegramConfig, DEFAULT_API_BASE};
use crate::core::pipeline::DEFAULT_MAX_MESSAGE_BYTES;
use crate::reference::ReferenceColumns;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub service: Option<ServiceSection>,
    #[serde(default)]
    pub reference: Option<ReferenceSection>,
    #[serde(default)]
    pub transport: Option<TransportSection>,
    #[serde(default)]
    pub server: Option<ServerSection>,
    #[serde(default)]
    pub limits: Option<LimitsSection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSection {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceSection {
    /// Reference table path (relative to project root)
    pub path: Option<String>,
    #[serde(flatten)]
    pub columns: PartialColumns,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartialColumns {
    pub primary_column: Option<String>,
    pub secondary_column: Option<String>,
    pub secondary_aliases: Option<Vec<String>>,
    pub contact_column: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransportSection {
    pub api_base: Option<String>,
    pub poll_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsSection {
    pub max_message_bytes: Option<usize>,
}

const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_REFERENCE_TABLE: &str = "data.csv";

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Text-understanding service settings
    pub service: GeminiConfig,
    /// Absolute or cwd-relative path to the reference table
    pub reference_path: PathBuf,
    /// Reference table column names
    pub columns: ReferenceColumns,
    /// Telegram bot token (the bot loop is disabled without it)
    pub telegram_token: Option<String>,
    /// Telegram API root
    pub telegram_api_base: String,
    /// Long-poll timeout
    pub poll_timeout_seconds: u64,
    /// Keep-alive server port
    pub port: u16,
    /// Messages larger than this get a size-limit reply without calling the service
    pub max_message_bytes: usize,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            service: GeminiConfig::default(),
            reference_path: PathBuf::from(DEFAULT_REFERENCE_TABLE),
            columns: ReferenceColumns::default(),
            telegram_token: None,
            telegram_api_base: DEFAULT_API_BASE.to_string(),
            poll_timeout_seconds: DEFAULT_POLL_TIMEOUT_SECS,
            port: DEFAULT_PORT,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }
}

impl BotConfig {
    /// Load configuration from the discovered config file and the process environment
    pub fn load() -> Result<Self> {
        let config_file = find_config_file();
        Self::from_sources(config_file.as_deref(), |key| std::env::var(key).ok())
    }

    /// Resolve configuration from an optional config file and an environment lookup
    pub fn from_sources<F>(config_path: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let lookup = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = config_path {
            let file = load_config_file(path)?;
            let base_dir = base_dir_for(path);

            config.config_file = Some(path.to_path_buf());
            config.reference_path = base_dir.join(DEFAULT_REFERENCE_TABLE);
            config.apply_file(file, &base_dir);
        }

        if let Some(key) = lookup("GEMINI_API_KEY") {
            config.service.api_key = Some(key);
        }
        if let Some(model) = lookup("GEMINI_MODEL") {
            config.service.model = model;
        }
        if let Some(path) = lookup("SITEBOT_REFERENCE_TABLE") {
            config.reference_path = PathBuf::from(path);
        }
        if let Some(token) = lookup("TELEGRAM_BOT_TOKEN") {
            config.telegram_token = Some(token);
        }
        if let Some(port) = lookup("PORT") {
            config.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT value: {}", port))?;
        }

        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile, base_dir: &Path) {
        if let Some(service) = file.service {
            if let Some(model) = service.model {
                self.service.model = model;
            }
            if let Some(base_url) = service.base_url {
                self.service.base_url = base_url;
            }
            if let Some(secs) = service.timeout_seconds {
                self.service.timeout = Duration::from_secs(secs);
            }
        }

        if let Some(reference) = file.reference {
            if let Some(ref path) = reference.path {
                self.reference_path = resolve_path(base_dir, path);
            }
            let columns = reference.columns;
            if let Some(primary) = columns.primary_column {
                self.columns.primary = primary;
            }
            if let Some(secondary) = columns.secondary_column {
                self.columns.secondary = secondary;
            }
            if let Some(aliases) = columns.secondary_aliases {
                self.columns.secondary_aliases = aliases;
            }
            if let Some(contact) = columns.contact_column {
                self.columns.contact = contact;
            }
        }

        if let Some(transport) = file.transport {
            if let Some(api_base) = transport.api_base {
                self.telegram_api_base = api_base;
            }
            if let Some(secs) = transport.poll_timeout_seconds {
                self.poll_timeout_seconds = secs;
            }
        }

        if let Some(port) = file.server.and_then(|s| s.port) {
            self.port = port;
        }

        if let Some(max) = file.limits.and_then(|l| l.max_message_bytes) {
            self.max_message_bytes = max;
        }
    }

    /// Timeout applied to each extraction call
    pub fn service_timeout(&self) -> Duration {
        self.service.timeout
    }

    /// Telegram settings, if a bot token is configured
    pub fn telegram(&self) -> Option<TelegramConfig> {
        self.telegram_token.as_ref().map(|token| TelegramConfig {
            bot_token: token.clone(),
            api_base: self.telegram_api_base.clone(),
            poll_timeout_seconds: self.poll_timeout_seconds,
        })
    }

    /// Human-readable summary with secrets masked
    pub fn describe(&self) -> String {
        let masked = |v: &Option<String>| if v.is_some() { "set" } else { "not set" };
        let lines = [
            format!(
                "Config file:        {}",
                self.config_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(none)".to_string())
            ),
            format!("Service model:      {}", self.service.model),
            format!("Service endpoint:   {}", self.service.base_url),
            format!("Service timeout:    {:?}", self.service.timeout),
            format!("Service API key:    {}", masked(&self.service.api_key)),
            format!("Reference table:    {}", self.reference_path.display()),
            format!("Primary column:     {}", self.columns.primary),
            format!("Secondary column:   {}", self.columns.secondary),
            format!("Secondary aliases:  {}", self.columns.secondary_aliases.join(", ")),
            format!("Contact column:     {}", self.columns.contact),
            format!("Telegram token:     {}", masked(&self.telegram_token)),
            format!("Keep-alive port:    {}", self.port),
            format!("Max message bytes:  {}", self.max_message_bytes),
        ];
        lines.join("\n")
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".sitebot").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    // Fall back to a per-user config
    dirs::config_dir()
        .map(|d| d.join("sitebot").join("config.yaml"))
        .filter(|p| p.exists())
}

/// Directory that relative paths in a config file resolve against.
///
/// For `<root>/.sitebot/config.yaml` this is `<root>`; for any other file it is
/// the directory containing the file.
fn base_dir_for(config_path: &Path) -> PathBuf {
    let parent = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    if parent.file_name().is_some_and(|name| name == ".sitebot") {
        parent
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf()
    } else {
        parent.to_path_buf()
    }
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::gemini::DEFAULT_MODEL;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_without_file_or_env() {
        let config = BotConfig::from_sources(None, no_env).unwrap();

        assert!(config.config_file.is_none());
        assert_eq!(config.service.model, DEFAULT_MODEL);
        assert_eq!(config.service.timeout, Duration::from_secs(30));
        assert!(config.service.api_key.is_none());
        assert_eq!(config.reference_path, PathBuf::from("data.csv"));
        assert_eq!(config.columns, ReferenceColumns::default());
        assert_eq!(config.port, 3000);
        assert!(config.telegram().is_none());
    }

    #[test]
    fn test_config_file_parsing_and_resolution() {
        let temp = TempDir::new().unwrap();
        let dot_dir = temp.path().join(".sitebot");
        std::fs::create_dir_all(&dot_dir).unwrap();

        let config_path = dot_dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
service:
  model: gemini-test
  timeout_seconds: 5
reference:
  path: sheets/sites.csv
  secondary_aliases: ["Robi ID", "Alt ID"]
  contact_column: POC
server:
  port: 8080
limits:
  max_message_bytes: 512
"#
        )
        .unwrap();

        let config = BotConfig::from_sources(Some(&config_path), no_env).unwrap();
        assert_eq!(config.service.model, "gemini-test");
        assert_eq!(config.service_timeout(), Duration::from_secs(5));
        assert_eq!(config.reference_path, temp.path().join("sheets/sites.csv"));
        assert_eq!(config.columns.secondary, "Seeker ID");
        assert_eq!(config.columns.secondary_aliases, vec!["Robi ID", "Alt ID"]);
        assert_eq!(config.columns.contact, "POC");
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_message_bytes, 512);
    }

    #[test]
    fn test_env_overrides_file() {
        let temp = TempDir::new().unwrap();
        let dot_dir = temp.path().join(".sitebot");
        std::fs::create_dir_all(&dot_dir).unwrap();
        let config_path = dot_dir.join("config.yaml");
        std::fs::write(&config_path, "version: \"1.0\"\nserver:\n  port: 8080\n").unwrap();

        let env: HashMap<&str, &str> = [
            ("GEMINI_API_KEY", "secret"),
            ("PORT", "9090"),
            ("SITEBOT_REFERENCE_TABLE", "/data/ref.csv"),
            ("TELEGRAM_BOT_TOKEN", "tok"),
        ]
        .into_iter()
        .collect();

        let config =
            BotConfig::from_sources(Some(&config_path), |k| env.get(k).map(|v| v.to_string()))
                .unwrap();

        assert_eq!(config.service.api_key.as_deref(), Some("secret"));
        assert_eq!(config.port, 9090);
        assert_eq!(config.reference_path, PathBuf::from("/data/ref.csv"));
        assert_eq!(config.telegram().unwrap().bot_token, "tok");
    }

    #[test]
    fn test_invalid_port_is_error() {
        let result = BotConfig::from_sources(None, |k| (k == "PORT").then(|| "abc".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_describe_masks_secrets() {
        let config = BotConfig::from_sources(None, |k| {
            (k == "GEMINI_API_KEY").then(|| "super-secret".to_string())
        })
        .unwrap();
        let text = config.describe();
        assert!(!text.contains("super-secret"));
        assert!(text.contains("Service API key:    set"));
    }

    #[test]
    fn test_base_dir_for_project_and_standalone_files() {
        assert_eq!(
            base_dir_for(Path::new("/srv/app/.sitebot/config.yaml")),
            PathBuf::from("/srv/app")
        );
        assert_eq!(
            base_dir_for(Path::new("/home/u/.config/sitebot/config.yaml")),
            PathBuf::from("/home/u/.config/sitebot")
        );
        assert_eq!(
            base_dir_for(Path::new("/etc/sitebot.yaml")),
            PathBuf::from("/etc")
        );
        assert_eq!(base_dir_for(Path::new("sitebot.yaml")), PathBuf::from("."));
    }

    #[test]
    fn test_standalone_config_resolves_next_to_file() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("sitebot.yaml");
        std::fs::write(
            &config_path,
            "version: \"1.0\"\nreference:\n  path: sites.csv\n",
        )
        .unwrap();

        let config = BotConfig::from_sources(Some(&config_path), no_env).unwrap();
        assert_eq!(config.reference_path, temp.path().join("sites.csv"));
    }

    #[test]
    fn test_resolve_relative_path() {
        let base = PathBuf::from("/home/user/project");

        assert_eq!(
            resolve_path(&base, "./data.csv"),
            PathBuf::from("/home/user/project/./data.csv")
        );
        assert_eq!(
            resolve_path(&base, "/absolute/data.csv"),
            PathBuf::from("/absolute/data.csv")
        );
    }
}
