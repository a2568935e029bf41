//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Status text fragments that mark a user as away (case-insensitive substring match)
pub const DEFAULT_AWAY_KEYWORDS: [&str; 13] = [
    "vacation",
    "holiday",
    "out of office",
    "ooo",
    "pto",
    "sick",
    "sick leave",
    "leave",
    "travelling",
    "travel",
    "pvt",
    "personal",
    "family emergency",
];

/// Status emoji codes that mark a user as away
pub const DEFAULT_AWAY_EMOJIS: [&str; 9] = [
    ":palm_tree:",
    ":airplane:",
    ":beach_with_umbrella:",
    ":island:",
    ":face_with_thermometer:",
    ":pill:",
    ":hospital:",
    ":zzz:",
    ":sleeping:",
];

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub slack: SlackConfig,
    pub summarizer: SummarizerConfig,
    pub scheduler: SchedulerConfig,
    pub availability: AvailabilityConfig,
    pub rate_limit: RateLimitConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Parse an environment name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" | "dev" => Some(Self::Development),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Slack app credentials
#[derive(Clone, Deserialize)]
pub struct SlackConfig {
    pub bot_token: String,
    pub signing_secret: String,
    #[serde(default = "default_slack_api_base_url")]
    pub api_base_url: String,
}

impl std::fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackConfig")
            .field("bot_token", &"<redacted>")
            .field("signing_secret", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

/// Text summarization (OpenAI-compatible chat completions)
#[derive(Clone, Deserialize)]
pub struct SummarizerConfig {
    /// Absent key means every summary uses the fallback
    pub api_key: Option<String>,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_summarizer_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl std::fmt::Debug for SummarizerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummarizerConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Periodic driver timers and retention
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_start_interval")]
    pub start_interval_secs: u64,
    #[serde(default = "default_reminder_sweep_interval")]
    pub reminder_interval_secs: u64,
    #[serde(default = "default_expiry_interval")]
    pub expiry_interval_secs: u64,
    /// UTC hour at which the daily retention cleanup runs
    #[serde(default = "default_cleanup_hour")]
    pub cleanup_hour_utc: u32,
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
}

/// Away detection tuning
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityConfig {
    /// Away ratio at or above which a standup is skipped
    #[serde(default = "default_away_threshold")]
    pub threshold: f64,
    #[serde(default = "default_away_keywords")]
    pub keywords: Vec<String>,
    #[serde(default = "default_away_emojis")]
    pub emojis: Vec<String>,
    /// Concurrent status lookups per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        Self {
            threshold: default_away_threshold(),
            keywords: default_away_keywords(),
            emojis: default_away_emojis(),
            batch_size: default_batch_size(),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

// Default value functions
fn default_app_name() -> String {
    "standup-bot".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_slack_api_base_url() -> String {
    "https://slack.com/api".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_summarizer_timeout() -> u64 {
    30
}

fn default_max_tokens() -> u32 {
    800
}

fn default_temperature() -> f32 {
    0.3
}

fn default_true() -> bool {
    true
}

fn default_start_interval() -> u64 {
    60
}

fn default_reminder_sweep_interval() -> u64 {
    120
}

fn default_expiry_interval() -> u64 {
    300
}

fn default_cleanup_hour() -> u32 {
    2
}

fn default_retention_days() -> i64 {
    30
}

fn default_away_threshold() -> f64 {
    0.9
}

fn default_away_keywords() -> Vec<String> {
    DEFAULT_AWAY_KEYWORDS.iter().map(ToString::to_string).collect()
}

fn default_away_emojis() -> Vec<String> {
    DEFAULT_AWAY_EMOJIS.iter().map(ToString::to_string).collect()
}

fn default_batch_size() -> usize {
    10
}

fn default_requests_per_second() -> u32 {
    50
}

fn default_burst() -> u32 {
    100
}

/// Reads variables through a lookup so tests can supply their own map
struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.get(name).ok_or(ConfigError::MissingVar(name))
    }

    fn parsed<T: FromStr>(&self, name: &'static str, default: impl FnOnce() -> T) -> Result<T, ConfigError> {
        match self.get(name) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(name, raw)),
            None => Ok(default()),
        }
    }

    fn flag(&self, name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match self.get(name) {
            Some(raw) => match raw.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::InvalidValue(name, raw)),
            },
            None => Ok(default),
        }
    }

    fn list(&self, name: &str, default: impl FnOnce() -> Vec<String>) -> Vec<String> {
        self.get(name)
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_else(default)
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        let env = match vars.get("APP_ENV") {
            Some(raw) => Environment::parse(&raw).ok_or(ConfigError::InvalidValue("APP_ENV", raw))?,
            None => default_env(),
        };

        let availability = AvailabilityConfig {
            threshold: vars.parsed("AWAY_THRESHOLD", default_away_threshold)?,
            keywords: vars.list("AWAY_KEYWORDS", default_away_keywords),
            emojis: vars.list("AWAY_EMOJIS", default_away_emojis),
            batch_size: vars.parsed("AVAILABILITY_BATCH_SIZE", default_batch_size)?,
        };
        if !(0.0..=1.0).contains(&availability.threshold) {
            return Err(ConfigError::InvalidValue(
                "AWAY_THRESHOLD",
                availability.threshold.to_string(),
            ));
        }
        if availability.batch_size == 0 {
            return Err(ConfigError::InvalidValue("AVAILABILITY_BATCH_SIZE", "0".to_string()));
        }

        let scheduler = SchedulerConfig {
            enabled: vars.flag("SCHEDULER_ENABLED", true)?,
            start_interval_secs: vars.parsed("SCHEDULER_START_INTERVAL_SECS", default_start_interval)?,
            reminder_interval_secs: vars
                .parsed("SCHEDULER_REMINDER_INTERVAL_SECS", default_reminder_sweep_interval)?,
            expiry_interval_secs: vars.parsed("SCHEDULER_EXPIRY_INTERVAL_SECS", default_expiry_interval)?,
            cleanup_hour_utc: vars.parsed("SCHEDULER_CLEANUP_HOUR_UTC", default_cleanup_hour)?,
            retention_days: vars.parsed("RETENTION_DAYS", default_retention_days)?,
        };
        if scheduler.cleanup_hour_utc > 23 {
            return Err(ConfigError::InvalidValue(
                "SCHEDULER_CLEANUP_HOUR_UTC",
                scheduler.cleanup_hour_utc.to_string(),
            ));
        }

        Ok(Self {
            app: AppSettings {
                name: vars.get("APP_NAME").unwrap_or_else(default_app_name),
                env,
            },
            server: ServerConfig {
                host: vars.get("SERVER_HOST").unwrap_or_else(default_host),
                port: vars.parsed("SERVER_PORT", default_port)?,
            },
            database: DatabaseConfig {
                url: vars.required("DATABASE_URL")?,
                max_connections: vars.parsed("DATABASE_MAX_CONNECTIONS", default_max_connections)?,
                min_connections: vars.parsed("DATABASE_MIN_CONNECTIONS", default_min_connections)?,
            },
            slack: SlackConfig {
                bot_token: vars.required("SLACK_BOT_TOKEN")?,
                signing_secret: vars.required("SLACK_SIGNING_SECRET")?,
                api_base_url: vars
                    .get("SLACK_API_BASE_URL")
                    .unwrap_or_else(default_slack_api_base_url),
            },
            summarizer: SummarizerConfig {
                api_key: vars.get("OPENAI_API_KEY"),
                model: vars.get("OPENAI_MODEL").unwrap_or_else(default_openai_model),
                base_url: vars.get("OPENAI_BASE_URL").unwrap_or_else(default_openai_base_url),
                timeout_secs: vars.parsed("SUMMARIZER_TIMEOUT_SECS", default_summarizer_timeout)?,
                max_tokens: default_max_tokens(),
                temperature: default_temperature(),
            },
            scheduler,
            availability,
            rate_limit: RateLimitConfig {
                requests_per_second: vars
                    .parsed("RATE_LIMIT_REQUESTS_PER_SECOND", default_requests_per_second)?,
                burst: vars.parsed("RATE_LIMIT_BURST", default_burst)?,
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
