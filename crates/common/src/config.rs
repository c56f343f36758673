//! Application configuration.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Translation vendor configuration.
    pub smartling: SmartlingConfig,
    /// Periodic sync configuration.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Redis-backed work queue. Jobs are synced in-process when absent.
    #[serde(default)]
    pub queue: Option<QueueConfig>,
    /// Log output configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Filesystem content catalog used by the standalone binary.
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Which vendor API deployment to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmartlingEnvironment {
    /// The live API.
    #[default]
    Production,
    /// The vendor's staging API.
    Staging,
}

impl SmartlingEnvironment {
    /// Base URL of the API for this environment.
    #[must_use]
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Production => "https://api.smartling.com",
            Self::Staging => "https://api.stg.smartling.net",
        }
    }

    /// Short name, used to key cached project rows.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Staging => "staging",
        }
    }
}

/// Translation vendor configuration.
#[derive(Clone, Deserialize)]
pub struct SmartlingConfig {
    /// Vendor project identifier.
    pub project_id: String,
    /// API user identifier.
    pub user_identifier: String,
    /// API user secret.
    pub user_secret: String,
    /// Target API environment.
    #[serde(default)]
    pub environment: SmartlingEnvironment,
    /// Overrides the environment's base URL (proxies, tests).
    #[serde(default)]
    pub base_url: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_api_timeout_seconds")]
    pub api_timeout_seconds: f64,
    /// CMS locale code to vendor locale code overrides.
    #[serde(default)]
    pub locale_to_smartling_locale: HashMap<String, String>,
    /// Lowercase vendor locale codes when mapping them back to CMS codes.
    #[serde(default = "default_true")]
    pub reformat_language_codes: bool,
    /// Prefix for generated job names.
    #[serde(default)]
    pub job_name_prefix: Option<String>,
    /// Create a review task for each imported translation.
    #[serde(default = "default_true")]
    pub add_approval_tasks: bool,
}

impl std::fmt::Debug for SmartlingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmartlingConfig")
            .field("project_id", &self.project_id)
            .field("user_identifier", &self.user_identifier)
            .field("user_secret", &"<redacted>")
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .field("api_timeout_seconds", &self.api_timeout_seconds)
            .field("locale_to_smartling_locale", &self.locale_to_smartling_locale)
            .field("reformat_language_codes", &self.reformat_language_codes)
            .field("job_name_prefix", &self.job_name_prefix)
            .field("add_approval_tasks", &self.add_approval_tasks)
            .finish()
    }
}

impl SmartlingConfig {
    /// Base URL requests are sent to.
    #[must_use]
    pub fn resolved_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url())
    }

    /// Per-request timeout.
    #[must_use]
    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.api_timeout_seconds)
    }

    /// Check required fields and value ranges.
    pub fn validate(&self) -> AppResult<()> {
        if self.project_id.is_empty()
            || self.user_identifier.is_empty()
            || self.user_secret.is_empty()
        {
            return Err(AppError::Config(
                "smartling must declare project_id, user_identifier, and user_secret".to_string(),
            ));
        }

        if !self.api_timeout_seconds.is_finite() || self.api_timeout_seconds <= 0.0 {
            return Err(AppError::Config(
                "smartling.api_timeout_seconds must be a positive number".to_string(),
            ));
        }

        if let Some(base_url) = &self.base_url {
            url::Url::parse(base_url).map_err(|e| {
                AppError::Config(format!("smartling.base_url is not a valid URL: {e}"))
            })?;
        }

        // The table is read in reverse for imports, so targets must be unique.
        let mut targets: HashMap<&str, &str> = HashMap::new();
        for (cms, vendor) in &self.locale_to_smartling_locale {
            if let Some(other) = targets.insert(vendor.as_str(), cms.as_str()) {
                return Err(AppError::Config(format!(
                    "smartling.locale_to_smartling_locale maps both {other:?} and {cms:?} to {vendor:?}"
                )));
            }
        }

        Ok(())
    }
}

/// Periodic sync configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between sync ticks.
    #[serde(default = "default_sync_interval_seconds")]
    pub sync_interval_seconds: u64,
    /// Maximum number of jobs synced at once within a tick.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            sync_interval_seconds: default_sync_interval_seconds(),
            concurrency: default_concurrency(),
        }
    }
}

impl SchedulerConfig {
    /// Interval between sync ticks.
    #[must_use]
    pub const fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_seconds)
    }
}

/// Redis work queue configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// Redis connection URL.
    pub redis_url: String,
}

/// Log output configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

/// Filesystem content catalog configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Directory holding source exports and receiving translated files.
    #[serde(default = "default_catalog_root")]
    pub root: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            root: default_catalog_root(),
        }
    }
}

fn default_catalog_root() -> String {
    "content".to_string()
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_api_timeout_seconds() -> f64 {
    5.0
}

const fn default_sync_interval_seconds() -> u64 {
    600
}

const fn default_concurrency() -> usize {
    4
}

const fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `LOCSYNC_ENV`)
    /// 4. Environment variables with `LOCSYNC_` prefix
    pub fn load() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        let env = std::env::var("LOCSYNC_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("LOCSYNC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("LOCSYNC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints after deserialization.
    pub fn validate(&self) -> AppResult<()> {
        self.smartling.validate()?;
        if self.scheduler.concurrency == 0 {
            return Err(AppError::Config(
                "scheduler.concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Result<Config, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    const MINIMAL: &str = r#"
        [database]
        url = "postgres://localhost/locsync"

        [smartling]
        project_id = "abc123"
        user_identifier = "user"
        user_secret = "secret"
    "#;

    #[test]
    fn test_defaults() {
        let config = parse(MINIMAL).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.smartling.environment, SmartlingEnvironment::Production);
        assert_eq!(config.smartling.resolved_base_url(), "https://api.smartling.com");
        assert_eq!(config.smartling.api_timeout(), Duration::from_secs(5));
        assert!(config.smartling.reformat_language_codes);
        assert!(config.smartling.add_approval_tasks);
        assert_eq!(config.scheduler.sync_interval(), Duration::from_secs(600));
        assert!(config.queue.is_none());
        assert_eq!(config.catalog.root, "content");
    }

    #[test]
    fn test_staging_and_override() {
        let config = parse(&format!(
            "{MINIMAL}\nenvironment = \"staging\"\nbase_url = \"http://127.0.0.1:9999\"\n"
        ))
        .unwrap();
        assert_eq!(config.smartling.environment.base_url(), "https://api.stg.smartling.net");
        assert_eq!(config.smartling.resolved_base_url(), "http://127.0.0.1:9999");
    }

    #[test]
    fn test_unknown_environment_rejected() {
        let result = parse(&format!("{MINIMAL}\nenvironment = \"qa\"\n"));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let mut config = parse(MINIMAL).unwrap();
        config.smartling.user_secret = String::new();
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_non_positive_timeout_rejected() {
        let mut config = parse(MINIMAL).unwrap();
        config.smartling.api_timeout_seconds = 0.0;
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_duplicate_locale_target_rejected() {
        let mut config = parse(MINIMAL).unwrap();
        config
            .smartling
            .locale_to_smartling_locale
            .insert("fr".to_string(), "fr-FR".to_string());
        assert!(config.validate().is_ok());

        config
            .smartling
            .locale_to_smartling_locale
            .insert("fr-fr".to_string(), "fr-FR".to_string());
        assert!(matches!(config.validate(), Err(AppError::Config(msg)) if msg.contains("fr-FR")));
    }

    #[test]
    fn test_secret_redacted_in_debug() {
        let config = parse(MINIMAL).unwrap();
        let debug = format!("{:?}", config.smartling);
        assert!(!debug.contains("secret\""));
        assert!(debug.contains("<redacted>"));
    }
}
