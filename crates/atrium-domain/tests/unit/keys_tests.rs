//! Unit tests for key derivation and id coercion

use atrium_domain::{CacheKey, KeyKind};
use serde_json::json;

#[test]
fn test_entry_key_format() {
    let key = CacheKey::for_entry("Widget", "7");
    assert_eq!(key.region, "Widget");
    assert_eq!(key.key, "Widget_7");
    assert_eq!(key.to_string(), "Widget/Widget_7");
}

#[test]
fn test_integer_ids_are_canonicalized() {
    let kind = KeyKind::Integer;
    assert_eq!(kind.coerce("Widget", "007").unwrap(), "7");
    assert_eq!(kind.coerce("Widget", " 42 ").unwrap(), "42");
    assert_eq!(kind.coerce("Widget", "-3").unwrap(), "-3");
}

#[test]
fn test_integer_coercion_rejects_text() {
    let err = KeyKind::Integer.coerce("Widget", "seven").unwrap_err();
    assert!(err.is_conversion());
}

#[test]
fn test_uuid_ids_are_lowercased() {
    let kind = KeyKind::Uuid;
    let id = kind
        .coerce("Order", "67E55044-10B1-426F-9247-BB680E5FE0C8")
        .unwrap();
    assert_eq!(id, "67e55044-10b1-426f-9247-bb680e5fe0c8");
    assert!(kind.coerce("Order", "not-a-uuid").is_err());
}

#[test]
fn test_text_ids_must_not_be_empty() {
    assert_eq!(KeyKind::Text.coerce("Tag", "blue").unwrap(), "blue");
    assert!(KeyKind::Text.coerce("Tag", "   ").is_err());
}

#[test]
fn test_coerce_json_values() {
    assert_eq!(
        KeyKind::Integer.coerce_value("Widget", &json!(9)).unwrap(),
        "9"
    );
    assert_eq!(
        KeyKind::Integer.coerce_value("Widget", &json!("9")).unwrap(),
        "9"
    );
    assert!(KeyKind::Text.coerce_value("Widget", &json!(null)).is_err());
    assert!(
        KeyKind::Text
            .coerce_value("Widget", &json!({"id": 1}))
            .is_err()
    );
}
