//! Unit tests for expiration rules

use atrium_domain::{Expiration, ExpirationMode};
use chrono::{TimeZone, Utc};
use std::time::Duration;

#[test]
fn test_absolute_expiration_ignores_reads() {
    let written = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
    let expiration = Expiration::absolute(Duration::from_secs(2));
    let read = written + chrono::Duration::milliseconds(1500);

    assert!(!expiration.is_expired_at(written, read, written + chrono::Duration::seconds(1)));
    assert!(expiration.is_expired_at(
        written,
        read,
        written + chrono::Duration::milliseconds(2500)
    ));
}

#[test]
fn test_sliding_expiration_renews_on_read() {
    let written = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
    let expiration = Expiration::sliding(Duration::from_secs(2));
    let read = written + chrono::Duration::milliseconds(1500);

    assert!(!expiration.is_expired_at(
        written,
        read,
        written + chrono::Duration::milliseconds(2500)
    ));
    assert!(expiration.is_expired_at(
        written,
        read,
        written + chrono::Duration::milliseconds(3500)
    ));
}

#[test]
fn test_expired_exactly_at_deadline() {
    let written = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let expiration = Expiration::absolute(Duration::from_secs(10));
    let deadline = expiration.deadline(written, written);
    assert_eq!(deadline, written + chrono::Duration::seconds(10));
    assert!(expiration.is_expired_at(written, written, deadline));
}

#[test]
fn test_mode_from_sliding_flag() {
    assert_eq!(ExpirationMode::from_sliding(true), ExpirationMode::Sliding);
    assert_eq!(ExpirationMode::from_sliding(false), ExpirationMode::Absolute);
    assert_eq!(ExpirationMode::default(), ExpirationMode::Absolute);
}
