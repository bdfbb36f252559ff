//! Retry backoff policy carried in workflow node configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use warden_core::{AppError, AppResult};

/// Lower bound applied after jitter so retries never fire back to back.
pub const MIN_JITTER_FLOOR_MS: u64 = 50;

/// How the wait between attempts grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffStrategy {
    /// Same interval before every retry.
    #[default]
    Fixed,
    /// Interval multiplied per retry, capped and jittered.
    Exponential,
}

impl BackoffStrategy {
    /// Returns the wire value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Exponential => "exponential",
        }
    }
}

impl std::str::FromStr for BackoffStrategy {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "fixed" => Ok(Self::Fixed),
            "exponential" => Ok(Self::Exponential),
            _ => Err(AppError::Validation(format!(
                "unknown backoff strategy '{value}'"
            ))),
        }
    }
}

/// Retry settings of one workflow node.
///
/// Configs saved before backoff support lack the strategy, multiplier and cap;
/// they deserialize with the defaults and keep their fixed interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Whether failed runs are retried at all.
    pub retry_enabled: bool,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Base interval in milliseconds.
    #[serde(rename = "retry_interval")]
    pub retry_interval_ms: u64,
    /// Growth strategy.
    pub backoff_strategy: BackoffStrategy,
    /// Growth factor for [`BackoffStrategy::Exponential`].
    pub backoff_multiplier: f64,
    /// Cap for exponential waits, in milliseconds.
    #[serde(rename = "max_backoff_interval")]
    pub max_backoff_interval_ms: u64,
}

impl RetryConfig {
    /// Accepted retry counts.
    pub const MAX_RETRIES_RANGE: (u32, u32) = (1, 10);
    /// Accepted base intervals in milliseconds.
    pub const RETRY_INTERVAL_RANGE_MS: (u64, u64) = (100, 5_000);
    /// Accepted exponential caps in milliseconds.
    pub const MAX_BACKOFF_RANGE_MS: (u64, u64) = (1_000, 60_000);

    /// Returns a copy with every field pulled into its accepted range.
    #[must_use]
    pub fn normalized(self) -> Self {
        let multiplier = if self.backoff_multiplier.is_finite() {
            self.backoff_multiplier.max(1.0)
        } else {
            Self::default().backoff_multiplier
        };

        Self {
            max_retries: self
                .max_retries
                .clamp(Self::MAX_RETRIES_RANGE.0, Self::MAX_RETRIES_RANGE.1),
            retry_interval_ms: self
                .retry_interval_ms
                .clamp(Self::RETRY_INTERVAL_RANGE_MS.0, Self::RETRY_INTERVAL_RANGE_MS.1),
            backoff_multiplier: multiplier,
            max_backoff_interval_ms: self
                .max_backoff_interval_ms
                .clamp(Self::MAX_BACKOFF_RANGE_MS.0, Self::MAX_BACKOFF_RANGE_MS.1),
            ..self
        }
    }

    /// Returns the upper bound of the wait before retry `retry_index` (zero-based).
    #[must_use]
    pub fn wait_cap(&self, retry_index: u32) -> Duration {
        match self.backoff_strategy {
            BackoffStrategy::Fixed => Duration::from_millis(self.retry_interval_ms),
            BackoffStrategy::Exponential => {
                let exponent = i32::try_from(retry_index).unwrap_or(i32::MAX);
                let grown = self.retry_interval_ms as f64 * self.backoff_multiplier.powi(exponent);
                let capped = grown.min(self.max_backoff_interval_ms as f64);
                Duration::from_millis(capped as u64)
            }
        }
    }

    /// Returns the wait before retry `retry_index` for a jitter sample in `[0, 1]`.
    ///
    /// Fixed waits ignore the sample. Exponential waits scale the cap by the
    /// sample, then apply [`MIN_JITTER_FLOOR_MS`] without exceeding the cap.
    pub fn wait_time(&self, retry_index: u32, jitter: f64) -> AppResult<Duration> {
        if !(0.0..=1.0).contains(&jitter) {
            return Err(AppError::Validation(format!(
                "jitter sample {jitter} is outside [0, 1]"
            )));
        }

        let cap = self.wait_cap(retry_index);
        if self.backoff_strategy == BackoffStrategy::Fixed {
            return Ok(cap);
        }

        let jittered = cap.mul_f64(jitter);
        Ok(jittered.max(Duration::from_millis(MIN_JITTER_FLOOR_MS)).min(cap))
    }

    /// Returns every wait cap of an enabled config, in retry order.
    #[must_use]
    pub fn schedule(&self) -> Vec<Duration> {
        if !self.retry_enabled {
            return Vec::new();
        }

        (0..self.max_retries)
            .map(|retry_index| self.wait_cap(retry_index))
            .collect()
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retry_enabled: false,
            max_retries: 3,
            retry_interval_ms: 1_000,
            backoff_strategy: BackoffStrategy::Fixed,
            backoff_multiplier: 2.0,
            max_backoff_interval_ms: 60_000,
        }
    }
}
