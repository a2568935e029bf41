//! # standup-common
//!
//! Shared utilities including configuration, error handling, and telemetry.

pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use config::{
    AppConfig, AppSettings, AvailabilityConfig, ConfigError, DatabaseConfig, Environment,
    RateLimitConfig, SchedulerConfig, ServerConfig, SlackConfig, SummarizerConfig,
    DEFAULT_AWAY_EMOJIS, DEFAULT_AWAY_KEYWORDS,
};
pub use error::{domain_status_code, AppError, AppResult, ErrorResponse};
pub use telemetry::{try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError};
