//! Integration tests: schema-guided conversion of whole documents.

use docform_codec::{
    to_storage_format, to_value_format, transcode, ConversionError, ToStorage, ToValue,
    TranscodeError, TypeRegistry,
};
use docform_core::{Decimal128, ObjectId, StoredValue};
use serde_json::{json, Value};

fn account_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "unmodifiableProperties": "_id",
        "required": {"upsert": ["name"], "insert": ["balance"]},
        "definitions": {
            "amount": {"type": "string", "mongoType": "int128"},
            "id": {"type": "string", "mongoType": "objectId"}
        },
        "properties": {
            "_id": {"$ref": "#/definitions/id"},
            "name": {"type": "string"},
            "balance": {"$ref": "#/definitions/amount"},
            "visits": {"type": "string", "mongoType": "int32"},
            "avatar": {"type": "string", "mongoType": "binary", "encoding": "hex"},
            "history": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "amount": {"$ref": "#/definitions/amount"},
                        "at": {"type": "string", "mongoType": "date"}
                    }
                }
            }
        }
    })
}

fn account() -> Value {
    json!({
        "_id": "65f0a1b2c3d4e5f601234567",
        "name": "alice",
        "balance": "0x1a2b",
        "visits": "42",
        "avatar": "cafe",
        "history": [
            {"amount": "0xff", "at": "2024-01-01T00:00:00.000Z"},
            {"amount": "0x00", "at": "2024-01-02T00:00:00.000Z"}
        ]
    })
}

#[test]
fn test_to_storage_converts_typed_leaves() {
    let schema = account_schema();
    let stored = to_storage_format(&account(), Some(&schema)).unwrap();

    assert_eq!(
        stored.get("_id"),
        Some(&StoredValue::ObjectId(
            ObjectId::parse_str("65f0a1b2c3d4e5f601234567").unwrap()
        ))
    );
    assert_eq!(stored.get("name"), Some(&StoredValue::String("alice".into())));
    assert_eq!(stored.get("visits"), Some(&StoredValue::Int32(42)));
    assert_eq!(stored.get("avatar"), Some(&StoredValue::Binary(vec![0xca, 0xfe])));

    let mut expected = [0u8; 16];
    expected[0] = 0x2b;
    expected[1] = 0x1a;
    assert_eq!(
        stored.get("balance"),
        Some(&StoredValue::Decimal128(Decimal128::from_bytes(expected)))
    );

    let history = stored.get("history").and_then(StoredValue::as_array).unwrap();
    assert!(matches!(history[0].get("at"), Some(StoredValue::DateTime(_))));
    assert!(matches!(history[1].get("amount"), Some(StoredValue::Decimal128(_))));
}

#[test]
fn test_round_trip_is_identity_on_fixed_point() {
    let schema = account_schema();
    let original = account();
    let stored = to_storage_format(&original, Some(&schema)).unwrap();
    let back = to_value_format(&stored, Some(&schema)).unwrap();

    // visits was a numeric string; value form after one pass is the integer.
    let mut expected = original.clone();
    expected["visits"] = json!(42);
    assert_eq!(back, expected);

    let again = to_value_format(&to_storage_format(&back, Some(&schema)).unwrap(), Some(&schema)).unwrap();
    assert_eq!(again, back);
}

#[test]
fn test_absent_schema_passes_through() {
    let doc = json!({"a": {"b": [1, "0x01", {"c": null}]}});
    let stored = to_storage_format(&doc, None).unwrap();
    assert_eq!(stored, StoredValue::from(&doc));
    assert_eq!(to_value_format(&stored, None).unwrap(), doc);

    let null_schema = Value::Null;
    assert_eq!(to_storage_format(&doc, Some(&null_schema)).unwrap(), StoredValue::from(&doc));
}

#[test]
fn test_null_document_passes_through() {
    let schema = account_schema();
    assert_eq!(to_storage_format(&Value::Null, Some(&schema)).unwrap(), StoredValue::Null);
    assert_eq!(to_value_format(&StoredValue::Null, Some(&schema)).unwrap(), Value::Null);
}

#[test]
fn test_scalar_top_level_rejected() {
    let schema = account_schema();
    let err = to_storage_format(&json!("just a string"), Some(&schema)).unwrap_err();
    match err {
        TranscodeError::UnsupportedShape { path, found } => {
            assert_eq!(path, "$");
            assert_eq!(found, "string");
        }
        other => panic!("Expected UnsupportedShape, got: {other}"),
    }
}

#[test]
fn test_batch_converts_each_document() {
    let schema = account_schema();
    let batch = json!([
        {"visits": "1"},
        {"visits": 2}
    ]);
    let stored = to_storage_format(&batch, Some(&schema)).unwrap();
    let docs = stored.as_array().unwrap();
    assert_eq!(docs[0].get("visits"), Some(&StoredValue::Int32(1)));
    assert_eq!(docs[1].get("visits"), Some(&StoredValue::Int32(2)));
}

#[test]
fn test_batch_of_scalars_rejected() {
    let schema = account_schema();
    let err = to_storage_format(&json!([{"visits": "1"}, 5]), Some(&schema)).unwrap_err();
    assert!(
        matches!(&err, TranscodeError::UnsupportedShape { path, .. } if path == "$[1]"),
        "got {err}"
    );
}

#[test]
fn test_tuple_items_with_additional_items() {
    let schema = json!({
        "type": "object",
        "properties": {
            "row": {
                "type": "array",
                "items": [
                    {"mongoType": "int32"},
                    {"mongoType": "binary", "encoding": "hex"}
                ],
                "additionalItems": {"mongoType": "int64"}
            }
        }
    });
    let doc = json!({"row": ["1", "ff", "0x10", "b11"]});
    let stored = to_storage_format(&doc, Some(&schema)).unwrap();
    assert_eq!(
        stored.get("row"),
        Some(&StoredValue::Array(vec![
            StoredValue::Int32(1),
            StoredValue::Binary(vec![0xff]),
            StoredValue::Int64(16),
            StoredValue::Int64(3),
        ]))
    );
}

#[test]
fn test_tuple_items_with_additional_items_back_to_values() {
    let schema = json!({
        "type": "object",
        "properties": {
            "row": {
                "type": "array",
                "items": [
                    {"mongoType": "int32"},
                    {"mongoType": "binary", "encoding": "hex"}
                ],
                "additionalItems": {"mongoType": "int64"}
            }
        }
    });
    let row = StoredValue::Array(vec![
        StoredValue::Int32(1),
        StoredValue::Binary(vec![0xff]),
        StoredValue::Int64(16),
        StoredValue::Int64(3),
    ]);
    let stored = StoredValue::Document([("row".to_string(), row)].into_iter().collect());
    let back = to_value_format(&stored, Some(&schema)).unwrap();
    assert_eq!(back, json!({"row": [1, "ff", 16, 3]}));
}

#[test]
fn test_int128_raw_buffer_property_is_one_leaf() {
    let schema = json!({
        "properties": {"x": {"$ref": "#/definitions/amount"}},
        "definitions": {"amount": {"mongoType": "int128"}}
    });
    let mut raw = vec![0u8; 16];
    raw[0] = 0x2b;
    raw[1] = 0x1a;
    let doc = json!({ "x": raw });

    let stored = to_storage_format(&doc, Some(&schema)).unwrap();
    let mut expected = [0u8; 16];
    expected[0] = 0x2b;
    expected[1] = 0x1a;
    assert_eq!(
        stored.get("x"),
        Some(&StoredValue::Decimal128(Decimal128::from_bytes(expected)))
    );
    assert_eq!(to_value_format(&stored, Some(&schema)).unwrap(), json!({"x": "0x1a2b"}));
}

#[test]
fn test_int128_short_raw_buffer_reports_path() {
    let schema = json!({"properties": {"x": {"mongoType": "int128"}}});
    let err = to_storage_format(&json!({"x": [1, 2, 3]}), Some(&schema)).unwrap_err();
    assert!(
        matches!(&err, TranscodeError::Leaf { path, .. } if path == "$.x"),
        "got {err}"
    );
}

#[test]
fn test_typed_array_with_items_still_walks_elements() {
    let schema = json!({
        "properties": {"x": {"mongoType": "int128", "items": {"mongoType": "int32"}}}
    });
    let stored = to_storage_format(&json!({"x": ["7"]}), Some(&schema)).unwrap();
    assert_eq!(stored.get("x"), Some(&StoredValue::Array(vec![StoredValue::Int32(7)])));
}

#[test]
fn test_tuple_without_additional_items_passes_extra_elements() {
    let schema = json!({
        "properties": {"row": {"items": [{"mongoType": "int32"}]}}
    });
    let doc = json!({"row": ["1", "2"]});
    let stored = to_storage_format(&doc, Some(&schema)).unwrap();
    assert_eq!(
        stored.get("row"),
        Some(&StoredValue::Array(vec![
            StoredValue::Int32(1),
            StoredValue::String("2".into()),
        ]))
    );
}

#[test]
fn test_nested_arrays_use_item_schemas() {
    let schema = json!({
        "properties": {
            "grid": {"items": {"items": {"mongoType": "int32"}}}
        }
    });
    let doc = json!({"grid": [["1", "2"], ["3"]]});
    let stored = to_storage_format(&doc, Some(&schema)).unwrap();
    assert_eq!(
        stored.get("grid"),
        Some(&StoredValue::Array(vec![
            StoredValue::Array(vec![StoredValue::Int32(1), StoredValue::Int32(2)]),
            StoredValue::Array(vec![StoredValue::Int32(3)]),
        ]))
    );
}

#[test]
fn test_unknown_properties_pass_through() {
    let schema = account_schema();
    let doc = json!({"visits": "3", "extra": {"deep": "0x01"}});
    let stored = to_storage_format(&doc, Some(&schema)).unwrap();
    assert_eq!(
        stored.get("extra"),
        Some(&StoredValue::from(json!({"deep": "0x01"})))
    );
}

#[test]
fn test_recursive_schema_follows_document_depth() {
    // A self-referencing schema is fine here: the walk is bounded by the
    // document, not the schema.
    let schema = json!({
        "type": "object",
        "properties": {
            "weight": {"mongoType": "int32"},
            "children": {"type": "array", "items": {"$ref": "#"}}
        }
    });
    let doc = json!({
        "weight": "1",
        "children": [{"weight": "2", "children": [{"weight": "3"}]}]
    });
    let stored = to_storage_format(&doc, Some(&schema)).unwrap();
    let grandchild = &stored.get("children").unwrap().as_array().unwrap()[0]
        .get("children")
        .unwrap()
        .as_array()
        .unwrap()[0];
    assert_eq!(grandchild.get("weight"), Some(&StoredValue::Int32(3)));
}

#[test]
fn test_leaf_error_reports_path_and_aborts() {
    let schema = account_schema();
    let doc = json!({"history": [{"amount": "0x01"}, {"amount": "not a number"}]});
    let err = to_storage_format(&doc, Some(&schema)).unwrap_err();
    match err {
        TranscodeError::Leaf { path, type_name, .. } => {
            assert_eq!(path, "$.history[1].amount");
            assert_eq!(type_name, "int128");
        }
        other => panic!("Expected Leaf error, got: {other}"),
    }
}

#[test]
fn test_unresolved_reference_is_an_error() {
    let schema = json!({"properties": {"x": {"$ref": "#/definitions/nope"}}});
    let err = to_storage_format(&json!({"x": 1}), Some(&schema)).unwrap_err();
    assert!(matches!(err, TranscodeError::Reference(_)), "got {err}");
}

#[test]
fn test_explicit_registry_with_custom_type() {
    let registry = TypeRegistry::with_builtins();
    registry.register(
        "cents",
        |v: &Value, _: &str| {
            let f = v.as_f64().ok_or_else(|| ConversionError::Invalid {
                type_name: "cents".into(),
                reason: "not a number".into(),
            })?;
            Ok(StoredValue::Int64((f * 100.0).round() as i64))
        },
        |v: &StoredValue, _: &str| match v {
            StoredValue::Int64(n) => Ok(json!(*n as f64 / 100.0)),
            other => Ok(other.to_plain_json()),
        },
    );
    let schema = json!({"properties": {"price": {"mongoType": "cents"}}});
    let stored = transcode::<ToStorage>(&registry, &json!({"price": 12.5}), Some(&schema)).unwrap();
    assert_eq!(stored.get("price"), Some(&StoredValue::Int64(1250)));
    let back = transcode::<ToValue>(&registry, &stored, Some(&schema)).unwrap();
    assert_eq!(back, json!({"price": 12.5}));
}
