//! Tests for row-to-cache mapping

use atrium_application::{FieldCopyMapper, MapperRegistry};
use atrium_domain::CachePolicy;
use atrium_domain::ports::providers::{BackingRow, CacheMapper};
use serde_json::{Value, json};

fn product_row() -> BackingRow {
    json!({"id": 4, "name": "Lamp", "price": 30, "cost": 12})
}

#[test]
fn test_field_copy_keeps_listed_fields() {
    let policy = CachePolicy::new("ProductCard")
        .with_backing_source("products")
        .with_mapped_fields(["id", "name", "missing"]);

    let mapped = FieldCopyMapper
        .to_cache_representation(&product_row(), &policy)
        .unwrap();
    assert_eq!(mapped, json!({"id": 4, "name": "Lamp"}));
}

#[test]
fn test_field_copy_without_list_copies_whole_row() {
    let policy = CachePolicy::new("Product").with_backing_source("products");
    let mapped = FieldCopyMapper
        .to_cache_representation(&product_row(), &policy)
        .unwrap();
    assert_eq!(mapped, product_row());
}

#[test]
fn test_field_copy_rejects_non_object_rows() {
    let policy = CachePolicy::new("Product").with_backing_source("products");
    assert!(
        FieldCopyMapper
            .to_cache_representation(&json!([1, 2]), &policy)
            .is_err()
    );
}

#[test]
fn test_registered_mapper_wins() {
    let mappers = MapperRegistry::new().register(
        "ProductPrice",
        |row: &BackingRow, _: &CachePolicy| -> atrium_domain::Result<Value> {
            Ok(json!({"price": row["price"]}))
        },
    );
    let policy = CachePolicy::new("ProductPrice")
        .with_backing_source("products")
        .manual_mapping(true);

    assert!(mappers.has_mapper("ProductPrice"));
    assert_eq!(
        mappers.map(&policy, &product_row()).unwrap(),
        Some(json!({"price": 30}))
    );
}

#[test]
fn test_manual_mapping_without_mapper_is_unmapped() {
    let mappers = MapperRegistry::new();
    let policy = CachePolicy::new("ProductPrice")
        .with_backing_source("products")
        .manual_mapping(true);

    assert!(mappers.mapper_for(&policy).is_none());
    assert_eq!(mappers.map(&policy, &product_row()).unwrap(), None);
}

#[test]
fn test_type_without_source_is_unmapped() {
    let mappers = MapperRegistry::default();
    assert_eq!(
        mappers
            .map(&CachePolicy::new("Session"), &product_row())
            .unwrap(),
        None
    );
}
