//! The resolved `Retry-After` value.
//!
//! A [`RetryAfter`] holds a single absolute instant with millisecond precision. However it
//! was built (from a delay, a date or a header), every query works off that instant and
//! the wall clock at the time of the call.

use crate::{
    grammar,
    input::{Classified, RetryAfterInput},
    Error, Result, RetryAfterConfig,
};
use chrono::{DateTime, Utc};
use http::{HeaderMap, HeaderValue};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// The `Retry-After` header name.
pub const RETRY_AFTER: http::HeaderName = http::header::RETRY_AFTER;

/// A parsed `Retry-After` header, resolved to an absolute point in time.
///
/// Any instant `chrono` can represent (roughly ±262 000 years around the epoch) is
/// accepted, including instants before 1970.
///
/// # Examples
///
/// ```
/// use retry_after::RetryAfter;
///
/// // HTTP-date form
/// let value = RetryAfter::new("Wed, 21 Oct 2015 07:28:00 GMT").unwrap();
/// assert_eq!(value.timestamp_millis(), 1_445_412_480_000);
/// assert_eq!(value.remaining_millis(), 0);
/// assert_eq!(value.to_string(), "Wed, 21 Oct 2015 07:28:00 GMT");
///
/// // delay-seconds form
/// let value = RetryAfter::new("120").unwrap();
/// assert!(value.remaining_secs() > 0.0 && value.remaining_secs() <= 120.0);
///
/// // Malformed headers can be treated as "no value"
/// assert!(RetryAfter::parse_safe("soon").is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RetryAfter {
    timestamp: DateTime<Utc>,
}

impl RetryAfter {
    /// Builds a value from any accepted input using the default configuration.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidDelay`] if a numeric delay is negative, NaN or infinite
    /// * [`Error::DelayTooLarge`] if a numeric delay exceeds the safe-integer ceiling
    /// * [`Error::OutOfRange`] if the resolved instant is too far from the epoch to represent
    /// * [`Error::Malformed`] if a string matches neither grammar or names no real date
    /// * [`Error::UnsupportedInput`] if header bytes are not visible ASCII
    pub fn new<'a>(input: impl Into<RetryAfterInput<'a>>) -> Result<Self> {
        Self::with_config(input, &RetryAfterConfig::default())
    }

    /// Builds a value from any accepted input using the given configuration.
    pub fn with_config<'a>(
        input: impl Into<RetryAfterInput<'a>>,
        config: &RetryAfterConfig,
    ) -> Result<Self> {
        Self::resolve(input.into(), config, SystemTime::now())
    }

    /// Builds a value, returning `None` instead of an error.
    ///
    /// Use this when a malformed header should mean "retry-after unspecified".
    ///
    /// # Examples
    ///
    /// ```
    /// use retry_after::RetryAfter;
    ///
    /// assert!(RetryAfter::parse_safe("120").is_some());
    /// assert!(RetryAfter::parse_safe("2011-10-05T14:48:00.000Z").is_none());
    /// assert!(RetryAfter::parse_safe(-1.0).is_none());
    /// ```
    pub fn parse_safe<'a>(input: impl Into<RetryAfterInput<'a>>) -> Option<Self> {
        Self::parse_safe_with_config(input, &RetryAfterConfig::default())
    }

    /// Like [`RetryAfter::parse_safe`], with an explicit configuration.
    pub fn parse_safe_with_config<'a>(
        input: impl Into<RetryAfterInput<'a>>,
        config: &RetryAfterConfig,
    ) -> Option<Self> {
        match Self::with_config(input, config) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(error = %e, "Discarding invalid Retry-After value");
                None
            }
        }
    }

    fn resolve(
        input: RetryAfterInput<'_>,
        config: &RetryAfterConfig,
        now: SystemTime,
    ) -> Result<Self> {
        match input.classify()? {
            Classified::Seconds(secs) => {
                tracing::trace!(secs, "Resolving Retry-After from numeric delay");
                Self::from_delay_secs(secs, config, now)
            }
            Classified::Delay(delay) => {
                tracing::trace!(
                    delay_ms = delay.as_millis(),
                    "Resolving Retry-After from duration"
                );
                check_ceiling(delay.as_secs_f64(), config)?;
                Self::after(now, delay)
            }
            Classified::At(time) => Self::from_millis(millis_since_epoch(time)),
            Classified::Value(value) => Ok(*value),
            Classified::Text(text) => Self::from_text(text, now),
        }
    }

    fn from_delay_secs(secs: f64, config: &RetryAfterConfig, now: SystemTime) -> Result<Self> {
        if !(secs.is_finite() && secs >= 0.0) {
            return Err(Error::InvalidDelay(secs));
        }
        check_ceiling(secs, config)?;

        let millis = millis_since_epoch(now) as f64 + secs * 1000.0;
        if millis >= i64::MAX as f64 {
            return Err(Error::OutOfRange);
        }
        // Fractional milliseconds are dropped
        Self::from_millis(millis.floor() as i64)
    }

    fn from_text(text: &str, now: SystemTime) -> Result<Self> {
        if grammar::is_imf_fixdate(text) {
            tracing::trace!(value = text, "Resolving Retry-After from HTTP-date");
            let date = grammar::parse_imf_fixdate(text)
                .ok_or_else(|| Error::Malformed(text.to_string()))?;
            return Self::from_millis(date.timestamp_millis());
        }

        if grammar::is_delay_seconds(text) {
            tracing::trace!(value = text, "Resolving Retry-After from delay-seconds");
            // Only overflow can fail here; the grammar admits nothing else
            let secs: u64 = text.parse().map_err(|_| Error::OutOfRange)?;
            return Self::after(now, Duration::from_secs(secs));
        }

        Err(Error::Malformed(text.to_string()))
    }

    fn after(now: SystemTime, delay: Duration) -> Result<Self> {
        let millis = i64::try_from(delay.as_millis())
            .ok()
            .and_then(|delay| delay.checked_add(millis_since_epoch(now)))
            .ok_or(Error::OutOfRange)?;
        Self::from_millis(millis)
    }

    fn from_millis(millis: i64) -> Result<Self> {
        // `date()` converts back to `SystemTime`, which is narrower on some platforms
        system_time_at(millis).ok_or(Error::OutOfRange)?;
        DateTime::from_timestamp_millis(millis)
            .map(|timestamp| Self { timestamp })
            .ok_or(Error::OutOfRange)
    }

    /// Returns the resolved point in time.
    pub fn date(&self) -> SystemTime {
        SystemTime::from(self.timestamp)
    }

    /// Returns the resolved point in time as a `chrono` UTC date-time.
    pub fn to_datetime(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the resolved point in time as milliseconds since the Unix epoch.
    ///
    /// Negative for instants before 1970.
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }

    /// Returns how long is left until the resolved time, or zero once it has passed.
    pub fn remaining(&self) -> Duration {
        self.remaining_at(SystemTime::now())
    }

    /// Returns how long is left between `now` and the resolved time, or zero.
    ///
    /// `now` is rounded down to whole milliseconds, matching the stored precision.
    ///
    /// # Examples
    ///
    /// ```
    /// use retry_after::RetryAfter;
    /// use std::time::{Duration, UNIX_EPOCH};
    ///
    /// let value = RetryAfter::new("Wed, 21 Oct 2015 07:28:00 GMT").unwrap();
    /// let an_hour_before = value.date() - Duration::from_secs(3600);
    ///
    /// assert_eq!(value.remaining_at(an_hour_before), Duration::from_secs(3600));
    /// assert_eq!(
    ///     value.remaining_at(UNIX_EPOCH + Duration::from_secs(2_000_000_000)),
    ///     Duration::ZERO
    /// );
    /// ```
    pub fn remaining_at(&self, now: SystemTime) -> Duration {
        let millis = self
            .timestamp_millis()
            .saturating_sub(millis_since_epoch(now))
            .max(0);
        Duration::from_millis(millis as u64)
    }

    /// Returns the remaining time in whole milliseconds. Never negative.
    pub fn remaining_millis(&self) -> u64 {
        self.remaining().as_millis() as u64
    }

    /// Returns the remaining time in seconds, including the fractional part.
    pub fn remaining_secs(&self) -> f64 {
        self.remaining_millis() as f64 / 1000.0
    }

    /// Returns `true` once the resolved time has been reached.
    pub fn has_elapsed(&self) -> bool {
        self.remaining_millis() == 0
    }

    /// Returns the value as an IMF-fixdate string, e.g. `Wed, 21 Oct 2015 07:28:00 GMT`.
    ///
    /// Sub-second precision is dropped and the day name is always recomputed from the
    /// date. A value built from delay-seconds is rendered as the date it resolved to, not
    /// as the original number. Years outside `0000..=9999` carry a sign and more digits,
    /// which the date grammar does not accept back.
    pub fn stringify(&self) -> String {
        self.to_string()
    }

    /// Returns the value ready to be sent as a `Retry-After` header.
    pub fn to_header_value(&self) -> HeaderValue {
        HeaderValue::try_from(self.to_string())
            .expect("a formatted HTTP-date is always visible ASCII")
    }
}

fn check_ceiling(secs: f64, config: &RetryAfterConfig) -> Result<()> {
    match config.max_delay_secs {
        Some(max) if secs > max => Err(Error::DelayTooLarge { secs, max }),
        _ => Ok(()),
    }
}

/// Milliseconds since the Unix epoch, rounded towards the past and saturating at the
/// `i64` range.
fn millis_since_epoch(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_millis()).unwrap_or(i64::MAX),
        Err(e) => {
            let before = e.duration();
            let millis = i64::try_from(before.as_millis()).unwrap_or(i64::MAX);
            let partial = before.subsec_nanos() % 1_000_000 != 0;
            (-millis).saturating_sub(i64::from(partial))
        }
    }
}

fn system_time_at(millis: i64) -> Option<SystemTime> {
    let offset = Duration::from_millis(millis.unsigned_abs());
    if millis >= 0 {
        UNIX_EPOCH.checked_add(offset)
    } else {
        UNIX_EPOCH.checked_sub(offset)
    }
}

impl fmt::Display for RetryAfter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.timestamp.format(grammar::IMF_FIXDATE_FORMAT), f)
    }
}

impl FromStr for RetryAfter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<&HeaderValue> for RetryAfter {
    type Error = Error;

    fn try_from(value: &HeaderValue) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&HeaderMap> for RetryAfter {
    type Error = Error;

    fn try_from(headers: &HeaderMap) -> Result<Self> {
        Self::new(headers)
    }
}

impl From<RetryAfter> for SystemTime {
    fn from(value: RetryAfter) -> Self {
        value.date()
    }
}

impl From<RetryAfter> for HeaderValue {
    fn from(value: RetryAfter) -> Self {
        value.to_header_value()
    }
}

impl Serialize for RetryAfter {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RetryAfter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(RetryAfterVisitor)
    }
}

struct RetryAfterVisitor;

impl de::Visitor<'_> for RetryAfterVisitor {
    type Value = RetryAfter;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an HTTP-date, a delay-seconds string or a non-negative number of seconds")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<RetryAfter, E> {
        RetryAfter::new(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<RetryAfter, E> {
        RetryAfter::new(v).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<RetryAfter, E> {
        RetryAfter::new(v).map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<RetryAfter, E> {
        RetryAfter::new(v).map_err(E::custom)
    }
}
