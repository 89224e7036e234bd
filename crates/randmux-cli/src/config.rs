//! Configuration read from the environment.

use std::str::FromStr;

use crate::error::AppError;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

/// Runtime configuration for the `randmux` binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base seed; stream `i` is seeded with `seed + i`. Drawn from the
    /// default stream when absent.
    pub seed: Option<u64>,
    /// Number of concurrent streams.
    pub streams: usize,
    /// Integers drawn per stream.
    pub draws: usize,
    /// Inclusive lower bound of each draw.
    pub low: i64,
    /// Exclusive upper bound of each draw.
    pub high: i64,
    /// Log output format.
    pub log_format: LogFormat,
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| AppError::Config(format!("{key} is invalid: {e}")))
        })
        .transpose()
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a value is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let seed: Option<u64> = parse(&lookup, "RANDMUX_SEED")?;
        let streams: usize = parse(&lookup, "RANDMUX_STREAMS")?.unwrap_or(4);
        let draws: usize = parse(&lookup, "RANDMUX_DRAWS")?.unwrap_or(10);
        let low: i64 = parse(&lookup, "RANDMUX_LOW")?.unwrap_or(0);
        let high: i64 = parse(&lookup, "RANDMUX_HIGH")?.unwrap_or(100);
        let log_format = match lookup("RANDMUX_LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "RANDMUX_LOG_FORMAT must be text or json, got {other:?}"
                )));
            }
        };

        if streams == 0 {
            return Err(AppError::Config(
                "RANDMUX_STREAMS must be at least 1".to_owned(),
            ));
        }
        if low >= high {
            return Err(AppError::Config(format!(
                "RANDMUX_LOW ({low}) must be below RANDMUX_HIGH ({high})"
            )));
        }

        Ok(Self {
            seed,
            streams,
            draws,
            low,
            high,
            log_format,
        })
    }
}
