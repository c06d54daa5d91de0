//! Accepted input shapes for building a [`RetryAfter`].
//!
//! Every way of supplying a `Retry-After` value funnels through [`RetryAfterInput`], so the
//! classification happens exactly once, at the boundary.

use crate::{Error, Result, RetryAfter};
use http::{HeaderMap, HeaderValue};
use std::fmt;
use std::time::{Duration, SystemTime};

/// Value assumed when a header carrier has no `Retry-After` field.
pub(crate) const ABSENT_HEADER_VALUE: &str = "0";

/// Anything that can look up a header by name.
///
/// Implemented for [`HeaderMap`], [`http::Response`] and [`http::response::Parts`].
/// Implement it for your own response type to pass it straight to
/// [`RetryAfter::new`].
///
/// # Examples
///
/// ```
/// use retry_after::{HeaderLookup, RetryAfter};
///
/// struct CachedResponse {
///     retry_after: Option<String>,
/// }
///
/// impl HeaderLookup for CachedResponse {
///     fn header_bytes(&self, name: &str) -> Option<&[u8]> {
///         if name.eq_ignore_ascii_case("retry-after") {
///             self.retry_after.as_deref().map(str::as_bytes)
///         } else {
///             None
///         }
///     }
/// }
///
/// let cached = CachedResponse { retry_after: Some("Wed, 21 Oct 2015 07:28:00 GMT".into()) };
/// let value = RetryAfter::new(&cached as &dyn HeaderLookup).unwrap();
/// assert_eq!(value.timestamp_millis(), 1_445_412_480_000);
/// ```
pub trait HeaderLookup {
    /// Returns the raw bytes of the first header named `name`, if any.
    fn header_bytes(&self, name: &str) -> Option<&[u8]>;
}

impl HeaderLookup for HeaderMap {
    fn header_bytes(&self, name: &str) -> Option<&[u8]> {
        self.get(name).map(HeaderValue::as_bytes)
    }
}

impl<B> HeaderLookup for http::Response<B> {
    fn header_bytes(&self, name: &str) -> Option<&[u8]> {
        self.headers().header_bytes(name)
    }
}

impl HeaderLookup for http::response::Parts {
    fn header_bytes(&self, name: &str) -> Option<&[u8]> {
        self.headers.header_bytes(name)
    }
}

/// One of the input shapes a [`RetryAfter`] can be built from.
///
/// You rarely name this type: [`RetryAfter::new`] takes `impl Into<RetryAfterInput>`, and
/// conversions exist for numbers, [`Duration`], [`SystemTime`], strings, header values,
/// header maps, responses and existing [`RetryAfter`] values.
#[derive(Clone, Copy)]
pub enum RetryAfterInput<'a> {
    /// A delay in seconds. Must be non-negative and finite.
    Seconds(f64),
    /// A delay that is already a `Duration`.
    Delay(Duration),
    /// An absolute point in time.
    At(SystemTime),
    /// A textual field value, such as `"120"` or `"Wed, 21 Oct 2015 07:28:00 GMT"`.
    Text(&'a str),
    /// A field value as raw bytes off the wire.
    Bytes(&'a [u8]),
    /// A header carrier; a missing `Retry-After` field counts as `"0"`.
    Headers(&'a dyn HeaderLookup),
    /// An existing value to copy.
    Value(&'a RetryAfter),
}

/// An input after header carriers and bytes have been reduced to text.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Classified<'a> {
    Seconds(f64),
    Delay(Duration),
    At(SystemTime),
    Text(&'a str),
    Value(&'a RetryAfter),
}

impl<'a> RetryAfterInput<'a> {
    /// Reduces header carriers and raw bytes to text. Other shapes pass through.
    pub(crate) fn classify(self) -> Result<Classified<'a>> {
        Ok(match self {
            RetryAfterInput::Seconds(secs) => Classified::Seconds(secs),
            RetryAfterInput::Delay(delay) => Classified::Delay(delay),
            RetryAfterInput::At(time) => Classified::At(time),
            RetryAfterInput::Text(text) => Classified::Text(text),
            RetryAfterInput::Value(value) => Classified::Value(value),
            RetryAfterInput::Bytes(bytes) => Classified::Text(header_text(bytes)?),
            RetryAfterInput::Headers(carrier) => {
                match carrier.header_bytes(http::header::RETRY_AFTER.as_str()) {
                    Some(bytes) => Classified::Text(header_text(bytes)?),
                    None => Classified::Text(ABSENT_HEADER_VALUE),
                }
            }
        })
    }
}

/// Reads header bytes as text, accepting what `HeaderValue::to_str` accepts.
fn header_text(bytes: &[u8]) -> Result<&str> {
    let visible = bytes
        .iter()
        .all(|&b| b == b'\t' || (0x20..0x7f).contains(&b));
    if !visible {
        return Err(Error::UnsupportedInput(
            "`Retry-After` value contains non-visible-ASCII bytes".to_string(),
        ));
    }
    std::str::from_utf8(bytes).map_err(|e| Error::UnsupportedInput(e.to_string()))
}

impl fmt::Debug for RetryAfterInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryAfterInput::Seconds(secs) => f.debug_tuple("Seconds").field(secs).finish(),
            RetryAfterInput::Delay(delay) => f.debug_tuple("Delay").field(delay).finish(),
            RetryAfterInput::At(time) => f.debug_tuple("At").field(time).finish(),
            RetryAfterInput::Text(text) => f.debug_tuple("Text").field(text).finish(),
            RetryAfterInput::Bytes(bytes) => f.debug_tuple("Bytes").field(bytes).finish(),
            RetryAfterInput::Headers(_) => f.write_str("Headers(..)"),
            RetryAfterInput::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

impl From<f64> for RetryAfterInput<'_> {
    fn from(secs: f64) -> Self {
        RetryAfterInput::Seconds(secs)
    }
}

impl From<i32> for RetryAfterInput<'_> {
    fn from(secs: i32) -> Self {
        RetryAfterInput::Seconds(f64::from(secs))
    }
}

impl From<u32> for RetryAfterInput<'_> {
    fn from(secs: u32) -> Self {
        RetryAfterInput::Seconds(f64::from(secs))
    }
}

impl From<i64> for RetryAfterInput<'_> {
    fn from(secs: i64) -> Self {
        match u64::try_from(secs) {
            Ok(secs) => RetryAfterInput::Delay(Duration::from_secs(secs)),
            // Rejected as negative; the exact magnitude does not matter
            Err(_) => RetryAfterInput::Seconds(secs as f64),
        }
    }
}

impl From<u64> for RetryAfterInput<'_> {
    fn from(secs: u64) -> Self {
        RetryAfterInput::Delay(Duration::from_secs(secs))
    }
}

impl From<Duration> for RetryAfterInput<'_> {
    fn from(delay: Duration) -> Self {
        RetryAfterInput::Delay(delay)
    }
}

impl From<SystemTime> for RetryAfterInput<'_> {
    fn from(time: SystemTime) -> Self {
        RetryAfterInput::At(time)
    }
}

impl<'a> From<&'a str> for RetryAfterInput<'a> {
    fn from(text: &'a str) -> Self {
        RetryAfterInput::Text(text)
    }
}

impl<'a> From<&'a String> for RetryAfterInput<'a> {
    fn from(text: &'a String) -> Self {
        RetryAfterInput::Text(text)
    }
}

impl<'a> From<&'a [u8]> for RetryAfterInput<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        RetryAfterInput::Bytes(bytes)
    }
}

impl<'a> From<&'a HeaderValue> for RetryAfterInput<'a> {
    fn from(value: &'a HeaderValue) -> Self {
        RetryAfterInput::Bytes(value.as_bytes())
    }
}

impl<'a> From<&'a HeaderMap> for RetryAfterInput<'a> {
    fn from(headers: &'a HeaderMap) -> Self {
        RetryAfterInput::Headers(headers)
    }
}

impl<'a, B> From<&'a http::Response<B>> for RetryAfterInput<'a> {
    fn from(response: &'a http::Response<B>) -> Self {
        RetryAfterInput::Headers(response.headers())
    }
}

impl<'a> From<&'a http::response::Parts> for RetryAfterInput<'a> {
    fn from(parts: &'a http::response::Parts) -> Self {
        RetryAfterInput::Headers(&parts.headers)
    }
}

impl<'a> From<&'a dyn HeaderLookup> for RetryAfterInput<'a> {
    fn from(carrier: &'a dyn HeaderLookup) -> Self {
        RetryAfterInput::Headers(carrier)
    }
}

impl<'a> From<&'a RetryAfter> for RetryAfterInput<'a> {
    fn from(value: &'a RetryAfter) -> Self {
        RetryAfterInput::Value(value)
    }
}
