//! Application configuration management
//!
//! Configuration is assembled once at startup from built-in defaults, an
//! optional TOML file and the environment, then validated so the process
//! fails fast if misconfigured.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Default OpenAI API base URL
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default completion model
const DEFAULT_MODEL: &str = "gpt-4";

/// Default server port
const DEFAULT_PORT: u16 = 8000;

/// Default request timeout in seconds
const DEFAULT_REQUEST_TIMEOUT: u64 = 60;

/// Config file looked up when `CONFIG_PATH` is unset
const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Environment variable holding the upstream API key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable naming the TOML config file
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Inbound body size cap in bytes; unbounded when unset
    #[serde(default)]
    pub max_body_bytes: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            max_body_bytes: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestConfig {
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT
}

/// On-disk layout of `config.toml`; every section is optional
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub openai: OpenAIConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub request: RequestConfig,
}

/// Effective application configuration
///
/// Constructed once in `main` and shared read-only with the handlers.
#[derive(Debug, Clone)]
pub struct Config {
    /// Upstream API key
    pub api_key: String,

    /// OpenAI-compatible API base URL
    pub base_url: String,

    /// Model requested for every completion
    pub model: String,

    /// Server host address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Logging level
    pub log_level: String,

    /// Inbound body size cap in bytes, `None` for no limit
    pub max_body_bytes: Option<usize>,

    /// Outbound request timeout in seconds
    pub request_timeout: u64,
}

impl Config {
    /// Build configuration from parsed TOML and an optional API key from the
    /// environment, which takes precedence over the file.
    ///
    /// # Errors
    ///
    /// Returns error if no API key is available or a value fails validation.
    pub fn from_parts(file: TomlConfig, env_api_key: Option<String>) -> Result<Self> {
        let api_key = env_api_key
            .filter(|key| !key.trim().is_empty())
            .or(file.openai.api_key)
            .unwrap_or_default();

        let config = Config {
            api_key,
            base_url: file.openai.base_url.trim_end_matches('/').to_string(),
            model: file.openai.model,
            host: file.server.host,
            port: file.server.port,
            log_level: file.server.log_level,
            max_body_bytes: file.server.max_body_bytes,
            request_timeout: file.request.request_timeout,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the environment and an optional config file
    ///
    /// Reads `CONFIG_PATH`, falling back to `config.toml` in the current
    /// directory.
    pub fn from_env() -> Result<Self> {
        let explicit_path = std::env::var(CONFIG_PATH_ENV).ok();
        Self::from_path(
            explicit_path.as_deref(),
            DEFAULT_CONFIG_PATH,
            std::env::var(API_KEY_ENV).ok(),
        )
    }

    /// Resolve the config file and merge it with `env_api_key`
    ///
    /// An explicit path must exist; the default path may be absent, in which
    /// case built-in defaults are used.
    pub fn from_path(
        explicit_path: Option<&str>,
        default_path: &str,
        env_api_key: Option<String>,
    ) -> Result<Self> {
        let file = match explicit_path {
            Some(path) => Self::read_toml(path)
                .with_context(|| format!("Failed to load {}={}", CONFIG_PATH_ENV, path))?,
            None if Path::new(default_path).exists() => Self::read_toml(default_path)?,
            None => TomlConfig::default(),
        };

        Self::from_parts(file, env_api_key)
    }

    fn read_toml<P: AsRef<Path>>(path: P) -> Result<TomlConfig> {
        let content = fs::read_to_string(path).context("Failed to read configuration file")?;
        toml::from_str(&content).context("Failed to parse TOML configuration")
    }

    /// Check that every value is usable
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            bail!(
                "API key missing: set {} or [openai] api_key in the config file",
                API_KEY_ENV
            );
        }
        if self.model.trim().is_empty() {
            bail!("[openai] model must not be empty");
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            bail!("[openai] base_url must start with http:// or https://");
        }
        if self.request_timeout == 0 {
            bail!("[request] request_timeout must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse(toml_text: &str) -> TomlConfig {
        toml::from_str(toml_text).unwrap()
    }

    fn create_test_config() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [openai]
            api_key = "sk-test123"
            base_url = "http://localhost:9000/v1/"
            model = "gpt-4o-mini"

            [server]
            host = "127.0.0.1"
            port = 9090
            log_level = "debug"
            max_body_bytes = 1048576

            [request]
            request_timeout = 15
        "#
        )
        .unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_config() {
        let file = create_test_config();
        let content = fs::read_to_string(file.path()).unwrap();
        let config = Config::from_parts(parse(&content), None).unwrap();
        assert_eq!(config.api_key, "sk-test123");
        assert_eq!(config.base_url, "http://localhost:9000/v1");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9090);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.max_body_bytes, Some(1048576));
        assert_eq!(config.request_timeout, 15);
    }

    #[test]
    fn test_read_toml_from_file() {
        let file = create_test_config();
        let parsed = Config::read_toml(file.path()).unwrap();
        assert_eq!(parsed.openai.api_key.as_deref(), Some("sk-test123"));
        assert_eq!(parsed.server.port, 9090);
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = Config::from_parts(TomlConfig::default(), Some("sk-env".into())).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, "gpt-4");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.max_body_bytes, None);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn test_partial_section_keeps_field_defaults() {
        let file = parse(
            r#"
            [server]
            port = 3000
        "#,
        );
        let config = Config::from_parts(file, Some("sk-env".into())).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn test_env_key_overrides_file_key() {
        let file = parse(
            r#"
            [openai]
            api_key = "sk-file"
        "#,
        );
        let config = Config::from_parts(file.clone(), Some("sk-env".into())).unwrap();
        assert_eq!(config.api_key, "sk-env");

        let config = Config::from_parts(file, Some("   ".into())).unwrap();
        assert_eq!(config.api_key, "sk-file");
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let err = Config::from_parts(TomlConfig::default(), None).unwrap_err();
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let bad_url = parse(
            r#"
            [openai]
            base_url = "api.openai.com"
        "#,
        );
        assert!(Config::from_parts(bad_url, Some("sk-env".into())).is_err());

        let zero_timeout = parse(
            r#"
            [request]
            request_timeout = 0
        "#,
        );
        assert!(Config::from_parts(zero_timeout, Some("sk-env".into())).is_err());

        let empty_model = parse(
            r#"
            [openai]
            model = ""
        "#,
        );
        assert!(Config::from_parts(empty_model, Some("sk-env".into())).is_err());
    }

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let missing = missing.to_str().unwrap();

        let err = Config::from_path(Some(missing), DEFAULT_CONFIG_PATH, Some("sk-env".into()))
            .unwrap_err();
        assert!(format!("{:#}", err).contains(CONFIG_PATH_ENV));
    }

    #[test]
    fn test_missing_default_path_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("config.toml");

        let config =
            Config::from_path(None, missing.to_str().unwrap(), Some("sk-env".into())).unwrap();
        assert_eq!(config.api_key, "sk-env");
        assert_eq!(config.model, "gpt-4");
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_existing_default_path_is_loaded() {
        let file = create_test_config();

        let config = Config::from_path(None, file.path().to_str().unwrap(), None).unwrap();
        assert_eq!(config.api_key, "sk-test123");
        assert_eq!(config.port, 9090);
    }

    #[test]
    fn test_from_env_reads_process_environment() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let mut keyless = NamedTempFile::new().unwrap();
        write!(
            keyless,
            r#"
            [openai]
            model = "gpt-4o"
        "#
        )
        .unwrap();
        keyless.flush().unwrap();

        // Only this test touches these variables.
        unsafe {
            std::env::set_var(API_KEY_ENV, "sk-from-env");
            std::env::set_var(CONFIG_PATH_ENV, &missing);
        }
        assert!(Config::from_env().is_err());

        unsafe {
            std::env::set_var(CONFIG_PATH_ENV, keyless.path());
        }
        let config = Config::from_env();

        unsafe {
            std::env::remove_var(API_KEY_ENV);
            std::env::remove_var(CONFIG_PATH_ENV);
        }

        let config = config.unwrap();
        assert_eq!(config.api_key, "sk-from-env");
        assert_eq!(config.model, "gpt-4o");
    }

    #[test]
    fn test_unreadable_file_is_an_error() {
        assert!(Config::read_toml("/nonexistent/ask-proxy.toml").is_err());
    }
}
