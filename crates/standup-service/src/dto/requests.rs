//! Request DTOs
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use chrono::Duration;
use serde::Deserialize;
use standup_core::{parse_timezone, ChannelConfig, DomainError, Schedule, TimeOfDay};
use validator::Validate;

// ============================================================================
// Channel Configuration
// ============================================================================

/// Channel configuration changes; absent fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct ChannelConfigInput {
    #[validate(length(min = 1, max = 10, message = "Between 1 and 10 questions are required"))]
    pub questions: Option<Vec<String>>,

    /// Start time, `HH:MM`
    pub time: Option<String>,

    /// Weekdays, 0 = Sunday
    #[validate(length(min = 1, max = 7, message = "At least one weekday is required"))]
    pub days: Option<Vec<u8>>,

    /// IANA timezone name
    pub timezone: Option<String>,

    /// Explicit participants; an empty list means every channel member
    #[validate(length(max = 100, message = "At most 100 participants"))]
    pub participants: Option<Vec<String>>,

    #[validate(range(min = 1, max = 1440, message = "Timeout must be 1-1440 minutes"))]
    pub timeout_minutes: Option<i64>,

    #[validate(range(min = 1, max = 720, message = "Interval must be 1-720 minutes"))]
    pub interval_minutes: Option<i64>,

    pub reminders: Option<bool>,
}

impl ChannelConfigInput {
    /// Parse slash-command text such as
    /// `time=09:30 days=1,2,3 tz=Europe/Berlin questions="Q1|Q2"`
    pub fn parse_args(text: &str) -> Result<Self, DomainError> {
        let mut input = Self::default();

        for token in tokenize(text) {
            let Some((key, value)) = token.split_once('=') else {
                return Err(invalid(format!("Expected key=value, got `{token}`")));
            };
            let value = value.trim();
            match key.trim().to_lowercase().as_str() {
                "questions" | "q" => {
                    input.questions = Some(
                        value
                            .split('|')
                            .map(str::trim)
                            .filter(|q| !q.is_empty())
                            .map(ToString::to_string)
                            .collect(),
                    );
                }
                "time" => input.time = Some(value.to_string()),
                "days" => input.days = Some(parse_days(value)?),
                "tz" | "timezone" => input.timezone = Some(value.to_string()),
                "participants" | "users" => input.participants = Some(parse_participants(value)),
                "timeout" => input.timeout_minutes = Some(parse_minutes(key, value)?),
                "interval" => input.interval_minutes = Some(parse_minutes(key, value)?),
                "reminders" => input.reminders = Some(parse_switch(value)?),
                other => return Err(invalid(format!("Unknown setting `{other}`"))),
            }
        }

        Ok(input)
    }

    /// Apply onto an existing configuration and validate the result
    pub fn apply_to(&self, mut config: ChannelConfig) -> Result<ChannelConfig, DomainError> {
        if let Some(questions) = &self.questions {
            config.questions.clone_from(questions);
        }

        if self.time.is_some() || self.days.is_some() || self.timezone.is_some() {
            let time = match &self.time {
                Some(t) => TimeOfDay::parse(t)?,
                None => config.schedule.time,
            };
            let weekdays = self
                .days
                .clone()
                .unwrap_or_else(|| config.schedule.weekdays().to_vec());
            let timezone = match &self.timezone {
                Some(tz) => parse_timezone(tz)?,
                None => config.schedule.timezone,
            };
            config.schedule = Schedule::new(time, weekdays, timezone)?;
        }

        if let Some(participants) = &self.participants {
            config.participants.clone_from(participants);
        }
        if let Some(minutes) = self.timeout_minutes {
            config.response_timeout = Duration::minutes(minutes);
        }
        if let Some(minutes) = self.interval_minutes {
            config.reminder_interval = Duration::minutes(minutes);
        }
        if let Some(enabled) = self.reminders {
            config.enable_reminders = enabled;
        }

        config.validate()?;
        Ok(config)
    }
}

fn invalid(message: String) -> DomainError {
    DomainError::ValidationError(message)
}

/// Split on whitespace, keeping double-quoted runs together
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for c in text.chars() {
        match c {
            '"' | '“' | '”' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn parse_days(value: &str) -> Result<Vec<u8>, DomainError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(|d| {
            let day = match d.to_lowercase().as_str() {
                "sun" | "sunday" => 0,
                "mon" | "monday" => 1,
                "tue" | "tuesday" => 2,
                "wed" | "wednesday" => 3,
                "thu" | "thursday" => 4,
                "fri" | "friday" => 5,
                "sat" | "saturday" => 6,
                n => n
                    .parse::<u8>()
                    .ok()
                    .filter(|n| *n <= 6)
                    .ok_or_else(|| invalid(format!("Invalid weekday `{d}`")))?,
            };
            Ok(day)
        })
        .collect()
}

/// Accepts raw ids and `<@U123|name>` mentions; `all` clears the list
fn parse_participants(value: &str) -> Vec<String> {
    if value.eq_ignore_ascii_case("all") {
        return Vec::new();
    }
    value
        .split(',')
        .map(|p| {
            let p = p.trim().trim_start_matches("<@").trim_end_matches('>');
            p.split('|').next().unwrap_or(p).trim().to_string()
        })
        .filter(|p| !p.is_empty())
        .collect()
}

fn parse_minutes(key: &str, value: &str) -> Result<i64, DomainError> {
    value
        .parse()
        .map_err(|_| invalid(format!("`{key}` must be a number of minutes")))
}

fn parse_switch(value: &str) -> Result<bool, DomainError> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(invalid(format!("Expected on/off, got `{value}`"))),
    }
}
