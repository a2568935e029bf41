//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, AvailabilityConfig, ConfigError, DatabaseConfig, Environment,
    RateLimitConfig, SchedulerConfig, ServerConfig, SlackConfig, SummarizerConfig,
    DEFAULT_AWAY_EMOJIS, DEFAULT_AWAY_KEYWORDS,
};
