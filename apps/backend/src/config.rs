//! Environment configuration

use std::env;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use thiserror::Error;
use vocab_core::algorithm::ladder::DEFAULT_INTERVAL_DAYS;
use vocab_core::{IntervalLadder, StudyClock, UserSettings, VocabularyOptions};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },

    #[error(transparent)]
    Core(#[from] vocab_core::Error),
}

#[derive(Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    /// `None` runs on in-memory storage.
    pub database_url: Option<String>,
    pub daily_goal: u32,
    pub review_intervals: Vec<u32>,
    pub daily_reset_hour: u32,
    pub utc_offset_minutes: i32,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_url", &self.database_url.as_ref().map(|_| "***REDACTED***"))
            .field("daily_goal", &self.daily_goal)
            .field("review_intervals", &self.review_intervals)
            .field("daily_reset_hour", &self.daily_reset_hour)
            .field("utc_offset_minutes", &self.utc_offset_minutes)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            database_url: None,
            daily_goal: UserSettings::default().daily_goal,
            review_intervals: DEFAULT_INTERVAL_DAYS.to_vec(),
            daily_reset_hour: 0,
            utc_offset_minutes: 0,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Unset keys take their default; malformed
    /// values are rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let review_intervals = match lookup("REVIEW_INTERVALS") {
            Some(raw) => IntervalLadder::parse(&raw)?.days().to_vec(),
            None => defaults.review_intervals,
        };
        let config = Self {
            host: parse_or(&lookup, "HOST", defaults.host)?,
            port: parse_or(&lookup, "PORT", defaults.port)?,
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            daily_goal: parse_or(&lookup, "DAILY_GOAL", defaults.daily_goal)?,
            review_intervals,
            daily_reset_hour: parse_or(&lookup, "DAILY_RESET_HOUR", defaults.daily_reset_hour)?,
            utc_offset_minutes: parse_or(&lookup, "UTC_OFFSET_MINUTES", defaults.utc_offset_minutes)?,
        };
        if config.daily_goal == 0 {
            return Err(ConfigError::Invalid {
                key: "DAILY_GOAL",
                value: "0".to_string(),
            });
        }
        config.clock()?;
        Ok(config)
    }

    pub fn clock(&self) -> Result<StudyClock, ConfigError> {
        Ok(StudyClock::new(self.utc_offset_minutes, self.daily_reset_hour)?)
    }

    pub fn ladder(&self) -> Result<IntervalLadder, ConfigError> {
        Ok(IntervalLadder::from_days(self.review_intervals.clone())?)
    }

    /// Options for opening the vocabulary workspace.
    pub fn vocabulary_options(&self) -> Result<VocabularyOptions, ConfigError> {
        Ok(VocabularyOptions {
            engine: Box::new(self.ladder()?),
            clock: self.clock()?,
            default_settings: UserSettings {
                daily_goal: self.daily_goal,
            },
            ..Default::default()
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}
