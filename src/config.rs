//! Configuration for `Retry-After` construction.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The largest integer an IEEE-754 double represents exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Controls how numeric delays are validated.
///
/// The ceiling only applies to numeric input ([`f64`], integers, [`Duration`]).
/// A digit-only header string is never checked against it; such a value only fails if
/// the resulting instant cannot be represented.
///
/// # Examples
///
/// ```
/// use retry_after::{RetryAfter, RetryAfterConfig};
/// use std::time::Duration;
///
/// let config = RetryAfterConfig::builder()
///     .max_delay(Duration::from_secs(3600))
///     .build();
///
/// assert!(RetryAfter::with_config(60u64, &config).is_ok());
/// assert!(RetryAfter::with_config(7200u64, &config).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryAfterConfig {
    /// Maximum accepted numeric delay in seconds.
    ///
    /// `None` disables the ceiling. Defaults to [`MAX_SAFE_INTEGER`].
    pub max_delay_secs: Option<f64>,
}

impl Default for RetryAfterConfig {
    fn default() -> Self {
        Self {
            max_delay_secs: Some(MAX_SAFE_INTEGER),
        }
    }
}

impl RetryAfterConfig {
    /// Creates a new builder for configuring construction.
    pub fn builder() -> RetryAfterConfigBuilder {
        RetryAfterConfigBuilder::default()
    }

    /// Creates a configuration without a numeric ceiling.
    pub fn unbounded() -> Self {
        Self {
            max_delay_secs: None,
        }
    }
}

/// Builder for `RetryAfterConfig`.
#[derive(Default)]
pub struct RetryAfterConfigBuilder {
    max_delay_secs: Option<Option<f64>>,
}

impl RetryAfterConfigBuilder {
    /// Sets the maximum numeric delay in seconds.
    pub fn max_delay_secs(mut self, secs: f64) -> Self {
        self.max_delay_secs = Some(Some(secs));
        self
    }

    /// Sets the maximum numeric delay.
    pub fn max_delay(self, max: Duration) -> Self {
        self.max_delay_secs(max.as_secs_f64())
    }

    /// Removes the numeric ceiling.
    pub fn unbounded(mut self) -> Self {
        self.max_delay_secs = Some(None);
        self
    }

    /// Builds the `RetryAfterConfig`.
    pub fn build(self) -> RetryAfterConfig {
        let default = RetryAfterConfig::default();
        RetryAfterConfig {
            max_delay_secs: self.max_delay_secs.unwrap_or(default.max_delay_secs),
        }
    }
}
