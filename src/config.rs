//! Operator-facing parameters.
//!
//! Loaded from environment variables (prefix `DUTY_ROSTER_`) or
//! deserialized from any serde format. Unset values fall back to the
//! defaults below.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `DUTY_ROSTER_WARN_WEEKS_IN_ADVANCE` | 2 |
//! | `DUTY_ROSTER_WEEKS_AHEAD` | warn + 4 |
//! | `DUTY_ROSTER_DAYS_UNTIL_PROPOSAL` | 3 |
//! | `DUTY_ROSTER_DAYS_UNTIL_EXECUTION` | 3 |
//! | `DUTY_ROSTER_REMINDER_DAYS` | 2 |

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Planner parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Weeks before an unfilled occurrence counts as "running out".
    pub warn_weeks_in_advance: u32,
    /// Generation horizon; `None` means `warn_weeks_in_advance + 4`.
    pub weeks_ahead: Option<u32>,
    /// Days an open switch waits before its first destination is proposed.
    pub days_until_proposal: u32,
    /// Days a proposal waits for an answer before it is executed.
    pub days_until_execution: u32,
    /// Days before the due date a reminder goes out.
    pub reminder_days: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            warn_weeks_in_advance: 2,
            weeks_ahead: None,
            days_until_proposal: 3,
            days_until_execution: 3,
            reminder_days: 2,
        }
    }
}

impl PlannerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            warn_weeks_in_advance: env_or(
                "DUTY_ROSTER_WARN_WEEKS_IN_ADVANCE",
                defaults.warn_weeks_in_advance,
            )?,
            weeks_ahead: env_opt("DUTY_ROSTER_WEEKS_AHEAD")?,
            days_until_proposal: env_or(
                "DUTY_ROSTER_DAYS_UNTIL_PROPOSAL",
                defaults.days_until_proposal,
            )?,
            days_until_execution: env_or(
                "DUTY_ROSTER_DAYS_UNTIL_EXECUTION",
                defaults.days_until_execution,
            )?,
            reminder_days: env_or("DUTY_ROSTER_REMINDER_DAYS", defaults.reminder_days)?,
        })
    }

    /// Sets an explicit generation horizon.
    pub fn with_weeks_ahead(mut self, weeks: u32) -> Self {
        self.weeks_ahead = Some(weeks);
        self
    }

    /// Number of weeks past the current one that batch generation covers.
    pub fn generation_horizon(&self) -> u32 {
        self.weeks_ahead
            .unwrap_or_else(|| self.warn_weeks_in_advance.saturating_add(4))
    }
}

fn env_opt<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        Err(_) => Ok(None),
    }
}

fn env_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    Ok(env_opt(key)?.unwrap_or(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_horizon() {
        let config = PlannerConfig::default();
        assert_eq!(config.generation_horizon(), 6);
        assert_eq!(config.with_weeks_ahead(10).generation_horizon(), 10);
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: PlannerConfig =
            serde_json::from_str(r#"{ "warn_weeks_in_advance": 3, "reminder_days": 1 }"#).unwrap();
        assert_eq!(config.warn_weeks_in_advance, 3);
        assert_eq!(config.reminder_days, 1);
        assert_eq!(config.days_until_proposal, 3);
        assert_eq!(config.generation_horizon(), 7);
    }

    #[test]
    fn test_env_parsing() {
        // Keys unique to this test; no other test touches them.
        std::env::set_var("DUTY_ROSTER_TEST_OK", " 5 ");
        std::env::set_var("DUTY_ROSTER_TEST_BAD", "five");

        assert_eq!(env_or::<u32>("DUTY_ROSTER_TEST_OK", 1).unwrap(), 5);
        assert_eq!(env_or::<u32>("DUTY_ROSTER_TEST_UNSET", 1).unwrap(), 1);
        assert!(matches!(
            env_opt::<u32>("DUTY_ROSTER_TEST_BAD"),
            Err(ConfigError::InvalidValue { key: "DUTY_ROSTER_TEST_BAD", .. })
        ));
    }
}
