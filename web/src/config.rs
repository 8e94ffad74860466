//! Configuration management for the service desk server.
//!
//! Loads configuration from environment variables with sensible defaults.
//! The binary loads a `.env` file first, so every variable can live there.

use chrono::NaiveTime;
use servicedesk_core::config::{
    AvailabilityConfig, DEFAULT_MAX_RANGE_DAYS, DEFAULT_STORE_TIMEOUT, EngineConfig, WorkingHours,
};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// A variable was set to something that cannot be used.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The value does not parse
    #[error("{name} has an invalid value: {value}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// Raw value
        value: String,
    },

    /// Working day ends before it starts
    #[error("working day must end after it starts ({start} - {end})")]
    WorkingHours {
        /// Opening time
        start: NaiveTime,
        /// Closing time
        end: NaiveTime,
    },
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Lifecycle engine settings
    pub engine: EngineConfig,
    /// Availability calendar settings
    pub availability: AvailabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Prometheus scrape port; no exporter when unset
    pub metrics_port: Option<u16>,
}

impl ServerConfig {
    /// `host:port` to bind
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set but unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, which returns the raw value of a
    /// variable if it is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set but unusable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = WorkingHours::default();
        let start = parse_time(&lookup, "SERVICEDESK_WORKDAY_START")?.unwrap_or(defaults.start);
        let end = parse_time(&lookup, "SERVICEDESK_WORKDAY_END")?.unwrap_or(defaults.end);
        if end <= start {
            return Err(ConfigError::WorkingHours { start, end });
        }

        let store_timeout = parse::<u64>(&lookup, "SERVICEDESK_STORE_TIMEOUT_MS")?
            .map_or(DEFAULT_STORE_TIMEOUT, Duration::from_millis);

        Ok(Self {
            server: ServerConfig {
                host: lookup("SERVICEDESK_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse(&lookup, "SERVICEDESK_PORT")?.unwrap_or(8080),
                log_level: lookup("SERVICEDESK_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
                metrics_port: parse(&lookup, "SERVICEDESK_METRICS_PORT")?,
            },
            engine: EngineConfig { store_timeout },
            availability: AvailabilityConfig {
                working_hours: WorkingHours { start, end },
                weekend_closed: parse(&lookup, "SERVICEDESK_WEEKEND_CLOSED")?.unwrap_or(true),
                max_range_days: parse(&lookup, "SERVICEDESK_MAX_RANGE_DAYS")?
                    .unwrap_or(DEFAULT_MAX_RANGE_DAYS),
                store_timeout,
            },
        })
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    lookup(name)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { name, value })
        })
        .transpose()
}

fn parse_time(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<NaiveTime>, ConfigError> {
    lookup(name)
        .map(|value| {
            NaiveTime::parse_from_str(value.trim(), "%H:%M")
                .map_err(|_| ConfigError::Invalid { name, value })
        })
        .transpose()
}
