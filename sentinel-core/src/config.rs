use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::staleness::{StalenessEvaluator, StalenessPolicy, DEFAULT_THRESHOLD_DAYS};

#[derive(Debug, Deserialize, Clone)]
pub struct SentinelConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub staleness: StalenessConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProviderConfig {
    /// Falls back to `GEMINI_API_KEY`, then `GOOGLE_API_KEY`.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_seconds: u64,
    pub max_retries: usize,
    pub retry_delay_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-pro".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_seconds: 30,
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StalenessConfig {
    pub threshold_days: i64,
    pub policy: StalenessPolicy,
}

impl Default for StalenessConfig {
    fn default() -> Self {
        Self {
            threshold_days: DEFAULT_THRESHOLD_DAYS,
            policy: StalenessPolicy::default(),
        }
    }
}

impl StalenessConfig {
    /// Build the evaluator. The threshold must be a positive, representable
    /// number of days.
    pub fn evaluator(&self) -> Result<StalenessEvaluator, ConfigError> {
        let threshold = chrono::Duration::try_days(self.threshold_days)
            .filter(|_| self.threshold_days > 0)
            .ok_or_else(|| {
                ConfigError::Message(format!(
                    "staleness.threshold_days must be a positive number of days, got {}",
                    self.threshold_days
                ))
            })?;
        Ok(StalenessEvaluator::new(threshold, self.policy))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl SentinelConfig {
    /// Load from a TOML file, then apply `SENTINEL__SECTION__KEY` overrides.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("SENTINEL").separator("__"))
            .build()?;
        Self::validated(s.try_deserialize()?)
    }

    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        Self::validated(s.try_deserialize()?)
    }

    fn validated(config: Self) -> Result<Self, ConfigError> {
        config.staleness.evaluator()?;
        Ok(config)
    }
}
