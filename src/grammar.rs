//! The two string grammars accepted for a `Retry-After` field value.
//!
//! RFC 9110 defines `Retry-After = HTTP-date / delay-seconds`. This parser accepts
//! `delay-seconds` and only the preferred `IMF-fixdate` form of `HTTP-date`. The obsolete
//! RFC 850 and asctime forms, and any zone other than `GMT`, are rejected.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Shape of an IMF-fixdate: `A` is an ASCII uppercase letter, `a` lowercase, `0` a digit.
/// Every other byte must match literally.
const IMF_FIXDATE_TEMPLATE: &[u8; 29] = b"Aaa, 00 Aaa 0000 00:00:00 GMT";

const MONTHS: [&[u8; 3]; 12] = [
    b"Jan", b"Feb", b"Mar", b"Apr", b"May", b"Jun", b"Jul", b"Aug", b"Sep", b"Oct", b"Nov",
    b"Dec",
];

/// `chrono` format string producing an IMF-fixdate.
pub(crate) const IMF_FIXDATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Returns `true` if `value` is one or more ASCII digits and nothing else.
///
/// # Examples
///
/// ```
/// use retry_after::grammar::is_delay_seconds;
///
/// assert!(is_delay_seconds("120"));
/// assert!(!is_delay_seconds(" 120"));
/// assert!(!is_delay_seconds("-1"));
/// assert!(!is_delay_seconds(""));
/// ```
pub fn is_delay_seconds(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Returns `true` if `value` has the fixed-width shape `Day, DD Mon YYYY HH:MM:SS GMT`.
///
/// Only the shape is checked here; whether the date exists on the calendar is decided
/// by [`parse_imf_fixdate`].
///
/// # Examples
///
/// ```
/// use retry_after::grammar::is_imf_fixdate;
///
/// assert!(is_imf_fixdate("Wed, 21 Oct 2015 07:28:00 GMT"));
/// assert!(!is_imf_fixdate("Wednesday, 21-Oct-15 07:28:00 GMT"));
/// assert!(!is_imf_fixdate("Wed Oct 21 07:28:00 2015"));
/// ```
pub fn is_imf_fixdate(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == IMF_FIXDATE_TEMPLATE.len()
        && bytes
            .iter()
            .zip(IMF_FIXDATE_TEMPLATE.iter())
            .all(|(&b, &shape)| match shape {
                b'A' => b.is_ascii_uppercase(),
                b'a' => b.is_ascii_lowercase(),
                b'0' => b.is_ascii_digit(),
                literal => b == literal,
            })
}

/// Decodes an IMF-fixdate into a UTC instant.
///
/// The day name is not checked against the date. Returns `None` if the value does not
/// have the IMF-fixdate shape or names a date or time that does not exist (unknown
/// month, 31 April, hour 24, second 60).
///
/// # Examples
///
/// ```
/// use retry_after::grammar::parse_imf_fixdate;
///
/// let date = parse_imf_fixdate("Mon, 01 Jan 1900 00:00:00 GMT").unwrap();
/// assert_eq!(date.timestamp_millis(), -2_208_988_800_000);
/// ```
pub fn parse_imf_fixdate(value: &str) -> Option<DateTime<Utc>> {
    if !is_imf_fixdate(value) {
        return None;
    }
    let bytes = value.as_bytes();

    let month = MONTHS.iter().position(|name| &bytes[8..11] == *name)? as u32 + 1;
    let date = NaiveDate::from_ymd_opt(
        digits(&bytes[12..16]) as i32,
        month,
        digits(&bytes[5..7]),
    )?;
    let time = NaiveTime::from_hms_opt(
        digits(&bytes[17..19]),
        digits(&bytes[20..22]),
        digits(&bytes[23..25]),
    )?;
    Some(date.and_time(time).and_utc())
}

/// Reads ASCII digits already validated by the template.
fn digits(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(0, |acc, &b| acc * 10 + u32::from(b - b'0'))
}
