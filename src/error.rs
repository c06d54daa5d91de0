//! Error types for `Retry-After` construction.
//!
//! Every failure happens synchronously while a [`RetryAfter`](crate::RetryAfter) is being
//! built. Once a value exists, none of its queries can fail.

/// The broad category an [`Error`] belongs to.
///
/// Useful when callers only care whether the input was out of range, syntactically
/// wrong, or of a shape the parser does not accept at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A numeric input or resolved instant outside the accepted range.
    Range,
    /// A string that matches neither accepted `Retry-After` grammar.
    Syntax,
    /// An input that cannot be read as a header value at all.
    Type,
}

/// The error type for building a [`RetryAfter`](crate::RetryAfter).
///
/// # Examples
///
/// ```
/// use retry_after::{Error, ErrorKind, RetryAfter};
///
/// let err = RetryAfter::new("2011-10-05T14:48:00.000Z").unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::Syntax);
/// assert_eq!(err.malformed_value(), Some("2011-10-05T14:48:00.000Z"));
///
/// let err = RetryAfter::new(-1.0).unwrap_err();
/// assert!(matches!(err, Error::InvalidDelay(_)));
/// ```
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A numeric delay was negative, NaN or infinite.
    #[error("Invalid delay: {0} is not a non-negative, finite number of seconds")]
    InvalidDelay(f64),

    /// A numeric delay exceeded the configured ceiling.
    ///
    /// # Fields
    ///
    /// * `secs` - The requested delay in seconds
    /// * `max` - The ceiling from [`RetryAfterConfig`](crate::RetryAfterConfig)
    #[error("Delay of {secs} seconds exceeds the maximum of {max} seconds")]
    DelayTooLarge {
        /// The requested delay in seconds
        secs: f64,
        /// The configured maximum delay in seconds
        max: f64,
    },

    /// The resolved instant is too far from the Unix epoch to be represented.
    ///
    /// The limit is roughly ±262 000 years, or less where `SystemTime` is narrower.
    #[error("Resolved time is outside the representable range")]
    OutOfRange,

    /// The header value matches neither the delay-seconds nor the IMF-fixdate grammar.
    #[error("`{0}` is not a valid HTTP header `Retry-After` value")]
    Malformed(String),

    /// The input could not be read as a textual header value.
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),
}

impl Error {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidDelay(_) => ErrorKind::Range,
            Error::DelayTooLarge { .. } => ErrorKind::Range,
            Error::OutOfRange => ErrorKind::Range,
            Error::Malformed(_) => ErrorKind::Syntax,
            Error::UnsupportedInput(_) => ErrorKind::Type,
        }
    }

    /// Returns `true` for numeric and out-of-range violations.
    pub fn is_range_error(&self) -> bool {
        self.kind() == ErrorKind::Range
    }

    /// Returns `true` when a string failed both grammars.
    pub fn is_syntax_error(&self) -> bool {
        self.kind() == ErrorKind::Syntax
    }

    /// Returns the offending header value for [`Error::Malformed`].
    pub fn malformed_value(&self) -> Option<&str> {
        match self {
            Error::Malformed(value) => Some(value),
            _ => None,
        }
    }
}

/// A specialized `Result` type for `Retry-After` construction.
///
/// This is a convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
