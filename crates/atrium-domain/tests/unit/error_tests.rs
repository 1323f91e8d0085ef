//! Unit tests for domain error types

use atrium_domain::Error;

#[test]
fn test_invalid_argument_error() {
    let error = Error::invalid_argument("Invalid input provided");
    match error {
        Error::InvalidArgument { message } => assert_eq!(message, "Invalid input provided"),
        _ => panic!("Expected InvalidArgument error"),
    }
}

#[test]
fn test_conversion_error_display() {
    let error = Error::conversion("Widget", "abc", "invalid digit found in string");
    assert!(error.is_conversion());
    let display = error.to_string();
    assert!(display.contains("abc"));
    assert!(display.contains("Widget"));
}

#[test]
fn test_backing_store_error_keeps_source() {
    let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "db timeout");
    let error = Error::backing_store_with_source("scan failed", io);
    assert!(error.is_backing_store());
    assert!(std::error::Error::source(&error).is_some());
    assert!(error.to_string().contains("scan failed"));
}

#[test]
fn test_json_error_from_conversion() {
    let parse = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let error: Error = parse.into();
    assert!(matches!(error, Error::Json { .. }));
}

#[test]
fn test_configuration_error() {
    let error = Error::configuration("default TTL cannot be zero");
    match error {
        Error::Configuration { message, source } => {
            assert_eq!(message, "default TTL cannot be zero");
            assert!(source.is_none());
        }
        _ => panic!("Expected Configuration error"),
    }
}

#[test]
fn test_cache_error() {
    let error = Error::cache("backend unavailable");
    assert_eq!(error.to_string(), "Cache error: backend unavailable");
    assert!(!error.is_backing_store());
}
