//! # retry-after - strict `Retry-After` header parsing
//!
//! Parses the HTTP `Retry-After` response header (RFC 9110 §10.2.3) into an absolute point
//! in time, and answers "how long until I may retry?" against the wall clock.
//!
//! ## Quick Start
//!
//! ```
//! use retry_after::RetryAfter;
//! use http::{HeaderMap, HeaderValue};
//!
//! let mut headers = HeaderMap::new();
//! headers.insert("retry-after", HeaderValue::from_static("120"));
//!
//! let value = RetryAfter::new(&headers)?;
//! assert!(value.remaining_millis() <= 120_000);
//!
//! // Re-emit the value as an HTTP-date
//! println!("Retry-After: {}", value);
//! # Ok::<(), retry_after::Error>(())
//! ```
//!
//! ## Accepted Input
//!
//! - **Numbers** (`f64`, integers, `Duration`) - a delay in seconds from now
//! - **`SystemTime`** - an absolute point in time
//! - **Strings and header values** - either `delay-seconds` (`"120"`) or an IMF-fixdate
//!   (`"Wed, 21 Oct 2015 07:28:00 GMT"`)
//! - **Header carriers** (`HeaderMap`, `http::Response`, or anything implementing
//!   [`HeaderLookup`]) - the `Retry-After` field is read, and a missing field means `"0"`
//! - **An existing [`RetryAfter`]** - copied
//!
//! Other date formats (RFC 850, asctime, ISO-8601, non-GMT zones) are rejected.
//!
//! ## Error Handling
//!
//! ```
//! use retry_after::{Error, RetryAfter};
//!
//! match RetryAfter::new("2011-10-05T14:48:00.000Z") {
//!     Ok(value) => println!("Retry at {}", value),
//!     Err(Error::Malformed(raw)) => eprintln!("Ignoring bad header: {}", raw),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//!
//! // Or collapse every failure into "unspecified"
//! assert!(RetryAfter::parse_safe("2011-10-05T14:48:00.000Z").is_none());
//! ```

mod config;
mod error;
pub mod grammar;
mod header;
pub mod input;

pub use config::{RetryAfterConfig, RetryAfterConfigBuilder, MAX_SAFE_INTEGER};
pub use error::{Error, ErrorKind, Result};
pub use header::{RetryAfter, RETRY_AFTER};
pub use input::{HeaderLookup, RetryAfterInput};
