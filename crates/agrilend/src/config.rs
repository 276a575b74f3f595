//! Layered application configuration.
//!
//! Values are resolved in this order, later layers winning:
//!
//! 1. built-in defaults
//! 2. a YAML file (`--config`, or `agrilend.yaml` in the working directory)
//! 3. `AGRILEND_*` environment variables
//! 4. command-line flags ([`Overrides`])

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use agrilend_client::{AnalyzerConfig, Latency};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::env::EnvReader;

pub const DEFAULT_CONFIG_FILE: &str = "agrilend.yaml";

pub const ENV_API_URL: &str = "AGRILEND_API_URL";
pub const ENV_TENANT: &str = "AGRILEND_TENANT";
pub const ENV_BRANCH: &str = "AGRILEND_BRANCH";
pub const ENV_TOKEN: &str = "AGRILEND_TOKEN";
pub const ENV_LOG: &str = "AGRILEND_LOG";
pub const ENV_ANALYZER_KEY: &str = "AGRILEND_ANALYZER_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid log level '{0}' (expected off, error, warn, info, debug or trace)")]
    LogLevel(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Backend base URL. Without one, screens run on seed data.
    pub api_url: Option<String>,
    pub tenant: Option<String>,
    pub branch: Option<String>,
    pub token: Option<String>,
    pub page_size: usize,
    pub debounce_ms: u64,
    pub option_cache_ttl_secs: u64,
    /// Simulated latency of the mock service.
    pub mock_latency_ms: u64,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub analyzer: AnalyzerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            api_url: None,
            tenant: None,
            branch: None,
            token: None,
            page_size: agrilend_browser::DEFAULT_PAGE_SIZE,
            debounce_ms: agrilend_client::DEFAULT_DEBOUNCE.as_millis() as u64,
            option_cache_ttl_secs: agrilend_client::DEFAULT_OPTION_TTL.as_secs(),
            mock_latency_ms: 0,
            log_level: "warn".to_string(),
            log_file: None,
            analyzer: AnalyzerConfig::default(),
        }
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub tenant: Option<String>,
    pub branch: Option<String>,
    pub token: Option<String>,
    pub page_size: Option<usize>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl AppConfig {
    /// Resolves the configuration.
    ///
    /// An explicit `file` must exist; the default file in `dir` is optional.
    pub fn load(
        file: Option<&Path>,
        dir: &Path,
        env: &dyn EnvReader,
        overrides: &Overrides,
    ) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = dir.join(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(&default)?
                } else {
                    AppConfig::default()
                }
            }
        };
        config.apply_env(env);
        config.apply_overrides(overrides);
        config.level_filter()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(text: &str) -> std::result::Result<Self, serde_yaml::Error> {
        // An empty document means "all defaults".
        if text.trim().is_empty() {
            return Ok(AppConfig::default());
        }
        serde_yaml::from_str(text)
    }

    pub fn apply_env(&mut self, env: &dyn EnvReader) {
        let read = |name: &str| env.var(name).filter(|v| !v.is_empty());
        if let Some(v) = read(ENV_API_URL) {
            self.api_url = Some(v);
        }
        if let Some(v) = read(ENV_TENANT) {
            self.tenant = Some(v);
        }
        if let Some(v) = read(ENV_BRANCH) {
            self.branch = Some(v);
        }
        if let Some(v) = read(ENV_TOKEN) {
            self.token = Some(v);
        }
        if let Some(v) = read(ENV_LOG) {
            self.log_level = v;
        }
        if let Some(v) = read(ENV_ANALYZER_KEY) {
            self.analyzer.api_key = Some(v);
        }
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        let o = overrides.clone();
        self.api_url = o.api_url.or(self.api_url.take());
        self.tenant = o.tenant.or(self.tenant.take());
        self.branch = o.branch.or(self.branch.take());
        self.token = o.token.or(self.token.take());
        self.log_file = o.log_file.or(self.log_file.take());
        if let Some(size) = o.page_size {
            self.page_size = size;
        }
        if let Some(level) = o.log_level {
            self.log_level = level;
        }
    }

    pub fn level_filter(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(self.log_level.trim())
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn option_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.option_cache_ttl_secs)
    }

    pub fn mock_latency(&self) -> Latency {
        Latency::from_millis(self.mock_latency_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MockEnv;

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.debounce_ms, 500);
        assert_eq!(config.option_cache_ttl_secs, 300);
        assert_eq!(config.level_filter().unwrap(), LevelFilter::Warn);
    }

    #[test]
    fn yaml_fills_only_given_fields() {
        let config = AppConfig::from_yaml("page_size: 25\nanalyzer:\n  model: gpt-4o\n").unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.analyzer.model, "gpt-4o");
        assert_eq!(config.analyzer.endpoint, agrilend_client::DEFAULT_ENDPOINT);
        assert_eq!(config.debounce_ms, 500);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(AppConfig::from_yaml("page_sise: 25\n").is_err());
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(AppConfig::from_yaml("  \n").unwrap(), AppConfig::default());
    }

    #[test]
    fn env_beats_file_and_flags_beat_env() {
        let mut config = AppConfig::from_yaml("tenant: from-file\nbranch: from-file\n").unwrap();
        let env = MockEnv::new()
            .with_var(ENV_TENANT, "from-env")
            .with_var(ENV_TOKEN, "tok")
            .with_var(ENV_BRANCH, "");
        config.apply_env(&env);
        assert_eq!(config.tenant.as_deref(), Some("from-env"));
        assert_eq!(config.branch.as_deref(), Some("from-file"));

        config.apply_overrides(&Overrides {
            tenant: Some("from-flag".into()),
            ..Default::default()
        });
        assert_eq!(config.tenant.as_deref(), Some("from-flag"));
        assert_eq!(config.token.as_deref(), Some("tok"));
    }

    #[test]
    fn bad_log_level_is_an_error() {
        let config = AppConfig {
            log_level: "loud".into(),
            ..Default::default()
        };
        assert!(matches!(config.level_filter(), Err(ConfigError::LogLevel(_))));
    }
}
