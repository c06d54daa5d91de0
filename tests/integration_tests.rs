//! Integration tests using wiremock to serve real `Retry-After` headers.

use http::{HeaderMap, HeaderValue};
use retry_after::{Error, ErrorKind, HeaderLookup, RetryAfter, RetryAfterConfig};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RFC_EXAMPLE: &str = "Wed, 21 Oct 2015 07:28:00 GMT";
const RFC_EXAMPLE_MILLIS: i64 = 1_445_412_480_000;
const ISO_8601: &str = "2011-10-05T14:48:00.000Z";

/// Serves a 429 with the given `Retry-After` value and returns the response headers.
async fn fetch_headers(retry_after: Option<&str>) -> HeaderMap {
    let mock_server = MockServer::start().await;

    let mut template = ResponseTemplate::new(429).set_body_string("Rate limited");
    if let Some(value) = retry_after {
        template = template.insert_header("retry-after", value);
    }

    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(template)
        .mount(&mock_server)
        .await;

    let response = reqwest::get(format!("{}/limited", mock_server.uri()))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 429);
    response.headers().clone()
}

/// Routes `tracing` output through the test harness; set `RUST_LOG=retry_after=trace` to see it.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn assert_pending_at_most(value: &RetryAfter, secs: u64) {
    let millis = value.remaining_millis();
    assert!(
        millis > 0 && millis <= secs * 1000,
        "Expected remaining in (0, {}], got {}ms",
        secs * 1000,
        millis
    );
    let remaining_secs = value.remaining_secs();
    assert!(remaining_secs > 0.0 && remaining_secs <= secs as f64);
}

#[tokio::test]
async fn test_response_headers_delay_seconds() {
    let headers = fetch_headers(Some("120")).await;

    let value = RetryAfter::new(&headers).unwrap();
    assert_pending_at_most(&value, 120);
    assert!(!value.has_elapsed());
}

#[tokio::test]
async fn test_response_headers_http_date() {
    let headers = fetch_headers(Some(RFC_EXAMPLE)).await;

    let value = RetryAfter::new(&headers).unwrap();
    assert_eq!(value.timestamp_millis(), RFC_EXAMPLE_MILLIS);
    assert_eq!(value.remaining_millis(), 0);
    assert_eq!(value.remaining_secs(), 0.0);
}

#[tokio::test]
async fn test_response_headers_iso_8601_rejected() {
    let headers = fetch_headers(Some(ISO_8601)).await;

    let err = RetryAfter::new(&headers).unwrap_err();
    assert_eq!(err, Error::Malformed(ISO_8601.to_string()));
    assert!(RetryAfter::parse_safe(&headers).is_none());
}

#[tokio::test]
async fn test_response_without_header_means_now() {
    let headers = fetch_headers(None).await;

    let before = SystemTime::now();
    let value = RetryAfter::new(&headers).unwrap();
    assert!(value.has_elapsed());
    assert!(value.date() <= SystemTime::now());
    assert!(value.date() + Duration::from_millis(1) > before);
}

#[test]
fn test_raw_delay_seconds() {
    let value = RetryAfter::new("120").unwrap();
    assert_pending_at_most(&value, 120);
}

#[test]
fn test_raw_http_date() {
    let value = RetryAfter::new(RFC_EXAMPLE).unwrap();
    assert_eq!(
        value.date(),
        UNIX_EPOCH + Duration::from_millis(RFC_EXAMPLE_MILLIS as u64)
    );
    assert_eq!(value.remaining_millis(), 0);
    assert_eq!(value.remaining_secs(), 0.0);
}

#[test]
fn test_raw_iso_8601_rejected() {
    let err = RetryAfter::new(ISO_8601).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(err.malformed_value(), Some(ISO_8601));
}

#[test]
fn test_other_http_date_forms_rejected() {
    for value in [
        "Wednesday, 21-Oct-15 07:28:00 GMT",
        "Wed Oct 21 07:28:00 2015",
        "Wed, 21 Oct 2015 07:28:00 UTC",
        "Wed, 21 Oct 2015 07:28:00 +0000",
        " 120",
        "120s",
        "",
    ] {
        let err = RetryAfter::new(value).unwrap_err();
        assert!(err.is_syntax_error(), "{value:?} gave {err:?}");
    }
}

#[test]
fn test_string_and_number_agree() {
    let from_string = RetryAfter::new("120").unwrap();
    let from_number = RetryAfter::new(120u64).unwrap();

    // Both resolve against the clock, so allow for the time between the two calls
    let gap = from_number
        .timestamp_millis()
        .abs_diff(from_string.timestamp_millis());
    assert!(gap < 1000, "gap was {gap}ms");
    assert_pending_at_most(&from_number, 120);
}

#[test]
fn test_duration_and_system_time_input() {
    let value = RetryAfter::new(Duration::from_secs(30)).unwrap();
    assert_pending_at_most(&value, 30);

    let at = UNIX_EPOCH + Duration::from_millis(RFC_EXAMPLE_MILLIS as u64);
    assert_eq!(RetryAfter::new(at).unwrap().to_string(), RFC_EXAMPLE);
}

#[test]
fn test_range_and_type_errors() {
    let err = RetryAfter::new(-1i32).unwrap_err();
    assert_eq!(err, Error::InvalidDelay(-1.0));
    assert!(err.is_range_error());

    let err = RetryAfter::new(f64::INFINITY).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);

    let err = RetryAfter::new(9_007_199_254_740_992.0).unwrap_err();
    assert!(matches!(err, Error::DelayTooLarge { .. }));

    let bytes = HeaderValue::from_bytes(b"\xe2\x8f\xb0").unwrap();
    let err = RetryAfter::new(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
}

#[test]
fn test_parse_safe_matches_strict_construction() {
    init_tracing();

    let failing: Vec<Box<dyn Fn() -> Option<RetryAfter>>> = vec![
        Box::new(|| RetryAfter::parse_safe(-1.0)),
        Box::new(|| RetryAfter::parse_safe(f64::NAN)),
        Box::new(|| RetryAfter::parse_safe(ISO_8601)),
        Box::new(|| RetryAfter::parse_safe("Wed, 31 Apr 2015 07:28:00 GMT")),
        Box::new(|| RetryAfter::parse_safe(&b"\x00"[..])),
    ];
    for parse in failing {
        assert!(parse().is_none());
    }

    assert_eq!(
        RetryAfter::parse_safe(RFC_EXAMPLE),
        Some(RetryAfter::new(RFC_EXAMPLE).unwrap())
    );
    assert!(RetryAfter::parse_safe("120").is_some());
    assert!(RetryAfter::parse_safe(0u32).is_some());
    assert_eq!(
        RetryAfter::parse_safe("Thu, 21 Oct 2015 07:28:00 GMT"),
        RetryAfter::parse_safe(RFC_EXAMPLE)
    );
}

#[test]
fn test_day_name_is_not_checked() {
    // 21 Oct 2015 was a Wednesday
    let value = RetryAfter::new("Thu, 21 Oct 2015 07:28:00 GMT").unwrap();
    assert_eq!(value.timestamp_millis(), RFC_EXAMPLE_MILLIS);
    assert_eq!(value.to_string(), RFC_EXAMPLE);

    let err = RetryAfter::new("Thu, 32 Oct 2015 07:28:00 GMT").unwrap_err();
    assert!(err.is_syntax_error());
    let err = RetryAfter::new("Wed, 21 Oct 2015 24:00:00 GMT").unwrap_err();
    assert!(err.is_syntax_error());
}

#[tokio::test]
async fn test_response_headers_date_before_epoch() {
    let headers = fetch_headers(Some("Mon, 01 Jan 1900 00:00:00 GMT")).await;

    let value = RetryAfter::new(&headers).unwrap();
    assert_eq!(value.timestamp_millis(), -2_208_988_800_000);
    assert!(value.has_elapsed());
    assert_eq!(value.to_string(), "Mon, 01 Jan 1900 00:00:00 GMT");
}

#[test]
fn test_system_time_before_epoch() {
    let at = UNIX_EPOCH - Duration::from_secs(1);
    let value = RetryAfter::new(at).unwrap();
    assert_eq!(value.timestamp_millis(), -1_000);
    assert_eq!(value.date(), at);
    assert_eq!(value.remaining_at(UNIX_EPOCH - Duration::from_secs(2)), Duration::from_secs(1));
}

#[test]
fn test_to_string_round_trips() {
    let original = RetryAfter::new(RFC_EXAMPLE).unwrap();
    let reparsed = RetryAfter::new(&original.to_string()).unwrap();
    assert_eq!(reparsed, original);

    // Delay-seconds re-emit as the resolved date, to the second
    let delayed = RetryAfter::new("3600").unwrap();
    let reparsed: RetryAfter = delayed.to_string().parse().unwrap();
    assert_eq!(reparsed.timestamp_millis(), delayed.timestamp_millis() / 1000 * 1000);
    assert_eq!(reparsed.to_string(), delayed.to_string());
}

#[test]
fn test_re_emit_as_header() {
    let value = RetryAfter::new(RFC_EXAMPLE).unwrap();

    let mut headers = HeaderMap::new();
    headers.insert(retry_after::RETRY_AFTER, value.to_header_value());
    assert_eq!(headers.header_bytes("Retry-After"), Some(RFC_EXAMPLE.as_bytes()));
    assert_eq!(RetryAfter::try_from(&headers).unwrap(), value);
}

#[test]
fn test_http_response_input() {
    let response = http::Response::builder()
        .status(503)
        .header("Retry-After", RFC_EXAMPLE)
        .body(String::new())
        .unwrap();

    let value = RetryAfter::new(&response).unwrap();
    assert_eq!(value.timestamp_millis(), RFC_EXAMPLE_MILLIS);
}

#[test]
fn test_custom_ceiling() {
    let config = RetryAfterConfig::builder()
        .max_delay(Duration::from_secs(300))
        .build();

    assert!(RetryAfter::with_config(300u64, &config).is_ok());
    assert!(RetryAfter::with_config(301u64, &config).is_err());
    assert!(RetryAfter::parse_safe_with_config(301u64, &config).is_none());
    assert!(RetryAfter::with_config(
        9_007_199_254_740_992.0,
        &RetryAfterConfig::unbounded()
    )
    .is_err_and(|e| e == Error::OutOfRange));
}

#[test]
fn test_shared_across_threads() {
    let value = RetryAfter::new(Duration::from_secs(60)).unwrap();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                assert!(value.remaining_millis() <= 60_000);
                assert_eq!(value.date(), RetryAfter::new(&value).unwrap().date());
            });
        }
    });
}
