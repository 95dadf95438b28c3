//! Application configuration

use super::cycle::{MAX_MINUTES, MIN_MINUTES};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub version: String,
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimerConfig {
    /// How often the countdown re-reads the clock, in milliseconds
    pub tick_interval_ms: u64,
    pub default_minutes: u32,
    pub minutes_step: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiConfig {
    pub task_suggestions: Vec<String>,
    pub mirror_title: bool,
    pub notify_on_finish: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    pub level: String,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.timer.validate()?;
        self.ui.validate()?;
        self.log.validate()?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0.0".to_string(),
            timer: TimerConfig::default(),
            ui: UiConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl TimerConfig {
    const MIN_TICK_MS: u64 = 50;
    const MAX_TICK_MS: u64 = 10_000;

    /// Validate timer configuration
    pub fn validate(&self) -> Result<()> {
        if !(Self::MIN_TICK_MS..=Self::MAX_TICK_MS).contains(&self.tick_interval_ms) {
            return Err(Error::Validation(format!(
                "Tick interval must be between {} and {} ms",
                Self::MIN_TICK_MS,
                Self::MAX_TICK_MS
            )));
        }

        if !(MIN_MINUTES..=MAX_MINUTES).contains(&self.default_minutes) {
            return Err(Error::Validation(format!(
                "Default duration must be between {} and {} minutes",
                MIN_MINUTES, MAX_MINUTES
            )));
        }

        if !(1..=MAX_MINUTES).contains(&self.minutes_step) {
            return Err(Error::Validation(format!(
                "Minutes step must be between 1 and {}",
                MAX_MINUTES
            )));
        }

        Ok(())
    }

    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            default_minutes: 25,
            minutes_step: 5,
        }
    }
}

impl UiConfig {
    pub fn validate(&self) -> Result<()> {
        if self.task_suggestions.iter().any(|s| s.trim().is_empty()) {
            return Err(Error::Validation(
                "Task suggestions cannot be blank".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            task_suggestions: vec![
                "Project 1".to_string(),
                "Project 2".to_string(),
                "Project 3".to_string(),
            ],
            mirror_title: true,
            notify_on_finish: true,
        }
    }
}

impl LogConfig {
    pub fn validate(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.level.as_str()) {
            return Err(Error::Validation(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.level,
                valid_log_levels.join(", ")
            )));
        }

        Ok(())
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, "1.0.0");
        assert_eq!(config.timer.tick_interval_ms, 1000);
        assert_eq!(config.timer.default_minutes, 25);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timer_config_validation() {
        let mut config = TimerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_interval(), std::time::Duration::from_secs(1));

        config.tick_interval_ms = 0;
        assert!(config.validate().is_err());

        config.tick_interval_ms = 1000;
        config.default_minutes = 61;
        assert!(config.validate().is_err());

        config.default_minutes = 0;
        assert!(config.validate().is_err());

        config.default_minutes = 25;
        config.minutes_step = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ui_config_rejects_blank_suggestion() {
        let config = UiConfig {
            task_suggestions: vec!["ok".to_string(), " ".to_string()],
            ..UiConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_config_validation() {
        let mut config = LogConfig::default();
        assert!(config.validate().is_ok());

        config.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = serde_json::from_str(r#"{"version":"1.0.0"}"#).unwrap();
        assert_eq!(config, Config::default());
    }
}
