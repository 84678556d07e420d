//! # Built-In Types
//!
//! The six types every registry created by
//! [`TypeRegistry::with_builtins`](crate::TypeRegistry::with_builtins) knows.
//! Their value forms are fixed for interoperability with existing data:
//!
//! | type       | value form                                   | storage form   |
//! |------------|----------------------------------------------|----------------|
//! | `objectId` | 24 hex chars (or a 12-byte string)           | `ObjectId`     |
//! | `int32`    | number or decimal string                     | `Int32`        |
//! | `int64`    | number, decimal, `0x…` or `b…` string        | `Int64`        |
//! | `int128`   | number, decimal, `0x…`/`b…` string, 16 bytes | `Decimal128`   |
//! | `binary`   | string in the schema's `encoding`            | `Binary`       |
//! | `date`     | RFC 3339 / `YYYY-MM-DD` / epoch millis / null | `DateTime`    |
//!
//! Reverse conversions: `int32`/`int64` yield JSON integers, `int128` a
//! trimmed `0x` hex string (`"0x00"` for zero), `binary` a string in the
//! same encoding, `date` an RFC 3339 string with millisecond precision.
//!
//! A null leaf stays null for every type except `date`, where null means
//! "now".

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use docform_core::{
    decode_prefixed_fixed, format_instant, Decimal128, ObjectId, StoredValue, Tree,
};
use serde_json::Value;

use crate::encoding::BinaryEncoding;
use crate::error::ConversionError;
use crate::registry::TypeRegistry;

/// `mongoType` name for 12-byte identifiers.
pub const OBJECT_ID: &str = "objectId";
/// `mongoType` name for 32-bit integers.
pub const INT32: &str = "int32";
/// `mongoType` name for 64-bit integers.
pub const INT64: &str = "int64";
/// `mongoType` name for 128-bit integers held in a decimal slot.
pub const INT128: &str = "int128";
/// `mongoType` name for raw bytes.
pub const BINARY: &str = "binary";
/// `mongoType` name for timestamps.
pub const DATE: &str = "date";

/// Register every built-in type on `registry`.
pub fn register_builtins(registry: &TypeRegistry) {
    registry.register(OBJECT_ID, object_id_to_storage, object_id_from_storage);
    registry.register(INT32, int32_to_storage, int32_from_storage);
    registry.register(INT64, int64_to_storage, int64_from_storage);
    registry.register(INT128, int128_to_storage, int128_from_storage);
    registry.register(BINARY, binary_to_storage, binary_from_storage);
    registry.register(DATE, date_to_storage, date_from_storage);
}

fn unexpected(type_name: &str, expected: &'static str, found: &impl Tree) -> ConversionError {
    ConversionError::UnexpectedValue {
        type_name: type_name.to_string(),
        expected,
        found: found.kind(),
    }
}

fn invalid(type_name: &str, reason: impl Into<String>) -> ConversionError {
    ConversionError::Invalid {
        type_name: type_name.to_string(),
        reason: reason.into(),
    }
}

fn is_prefixed(s: &str) -> bool {
    s.starts_with("0x") || s.starts_with('b')
}

/// Integral JSON number as i128; fractional or non-finite numbers are rejected.
fn json_integer(type_name: &str, n: &serde_json::Number) -> Result<i128, ConversionError> {
    if let Some(i) = n.as_i64() {
        return Ok(i128::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Ok(i128::from(u));
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1.7e38 => Ok(f as i128),
        _ => Err(invalid(type_name, format!("{n} is not an integer"))),
    }
}

/// Integer held by a storage leaf, for types that accept any integer width.
fn stored_integer(type_name: &str, expected: &'static str, value: &StoredValue) -> Result<i128, ConversionError> {
    match value {
        StoredValue::Int32(n) => Ok(i128::from(*n)),
        StoredValue::Int64(n) => Ok(i128::from(*n)),
        StoredValue::Double(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1.7e38 => Ok(*f as i128),
        other => Err(unexpected(type_name, expected, other)),
    }
}

// ── objectId ───────────────────────────────────────────────────────

fn object_id_to_storage(value: &Value, _encoding: &str) -> Result<StoredValue, ConversionError> {
    match value {
        Value::Null => Ok(StoredValue::Null),
        Value::String(s) => Ok(StoredValue::ObjectId(ObjectId::parse_str(s)?)),
        other => Err(unexpected(OBJECT_ID, "a hex string", other)),
    }
}

fn object_id_from_storage(value: &StoredValue, _encoding: &str) -> Result<Value, ConversionError> {
    match value {
        StoredValue::Null => Ok(Value::Null),
        StoredValue::ObjectId(oid) => Ok(Value::String(oid.to_hex())),
        other => Err(unexpected(OBJECT_ID, "an ObjectId", other)),
    }
}

// ── int32 ──────────────────────────────────────────────────────────

fn int32_to_storage(value: &Value, _encoding: &str) -> Result<StoredValue, ConversionError> {
    let n: i128 = match value {
        Value::Null => return Ok(StoredValue::Null),
        Value::Number(n) => json_integer(INT32, n)?,
        Value::String(s) => s
            .trim()
            .parse::<i32>()
            .map_err(|e| invalid(INT32, format!("cannot parse {s:?}: {e}")))?
            .into(),
        other => return Err(unexpected(INT32, "a number or numeric string", other)),
    };
    i32::try_from(n)
        .map(StoredValue::Int32)
        .map_err(|_| invalid(INT32, format!("{n} is out of range")))
}

fn int32_from_storage(value: &StoredValue, _encoding: &str) -> Result<Value, ConversionError> {
    if matches!(value, StoredValue::Null) {
        return Ok(Value::Null);
    }
    let n = stored_integer(INT32, "an integer", value)?;
    i32::try_from(n)
        .map(Value::from)
        .map_err(|_| invalid(INT32, format!("{n} is out of range")))
}

// ── int64 ──────────────────────────────────────────────────────────

fn int64_to_storage(value: &Value, _encoding: &str) -> Result<StoredValue, ConversionError> {
    let n: i128 = match value {
        Value::Null => return Ok(StoredValue::Null),
        Value::Number(n) => json_integer(INT64, n)?,
        Value::String(s) if is_prefixed(s) => {
            let bytes: [u8; 8] = decode_prefixed_fixed(s)?;
            return Ok(StoredValue::Int64(i64::from_le_bytes(bytes)));
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| invalid(INT64, format!("cannot parse {s:?}: {e}")))?
            .into(),
        other => return Err(unexpected(INT64, "a number or numeric string", other)),
    };
    i64::try_from(n)
        .map(StoredValue::Int64)
        .map_err(|_| invalid(INT64, format!("{n} is out of range")))
}

fn int64_from_storage(value: &StoredValue, _encoding: &str) -> Result<Value, ConversionError> {
    if matches!(value, StoredValue::Null) {
        return Ok(Value::Null);
    }
    let n = stored_integer(INT64, "an integer", value)?;
    i64::try_from(n)
        .map(Value::from)
        .map_err(|_| invalid(INT64, format!("{n} is out of range")))
}

// ── int128 ─────────────────────────────────────────────────────────

fn int128_to_storage(value: &Value, _encoding: &str) -> Result<StoredValue, ConversionError> {
    let decimal = match value {
        Value::Null => return Ok(StoredValue::Null),
        Value::String(s) if is_prefixed(s) => Decimal128::from_bytes(decode_prefixed_fixed(s)?),
        Value::String(s) => Decimal128::from_i128(
            s.trim()
                .parse::<i128>()
                .map_err(|e| invalid(INT128, format!("cannot parse {s:?}: {e}")))?,
        ),
        Value::Number(n) => Decimal128::from_i128(json_integer(INT128, n)?),
        Value::Array(items) => Decimal128::from_bytes(raw_bytes(items)?),
        other => return Err(unexpected(INT128, "a number, numeric string or 16-byte buffer", other)),
    };
    Ok(StoredValue::Decimal128(decimal))
}

/// A raw buffer given as a JSON array of exactly 16 byte values.
fn raw_bytes(items: &[Value]) -> Result<[u8; 16], ConversionError> {
    if items.len() != 16 {
        return Err(invalid(
            INT128,
            format!("raw buffer must hold 16 bytes, got {}", items.len()),
        ));
    }
    let mut out = [0u8; 16];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = item
            .as_u64()
            .and_then(|b| u8::try_from(b).ok())
            .ok_or_else(|| invalid(INT128, format!("{item} is not a byte value")))?;
    }
    Ok(out)
}

fn int128_from_storage(value: &StoredValue, _encoding: &str) -> Result<Value, ConversionError> {
    match value {
        StoredValue::Null => Ok(Value::Null),
        StoredValue::Decimal128(d) => Ok(Value::String(d.to_trimmed_hex())),
        StoredValue::Int32(_) | StoredValue::Int64(_) => {
            let n = stored_integer(INT128, "a Decimal128", value)?;
            Ok(Value::String(Decimal128::from_i128(n).to_trimmed_hex()))
        }
        other => Err(unexpected(INT128, "a Decimal128", other)),
    }
}

// ── binary ─────────────────────────────────────────────────────────

fn binary_to_storage(value: &Value, encoding: &str) -> Result<StoredValue, ConversionError> {
    match value {
        Value::Null => Ok(StoredValue::Null),
        Value::String(s) => {
            let encoding: BinaryEncoding = encoding.parse()?;
            Ok(StoredValue::Binary(encoding.decode(s)?))
        }
        other => Err(unexpected(BINARY, "a string", other)),
    }
}

fn binary_from_storage(value: &StoredValue, encoding: &str) -> Result<Value, ConversionError> {
    match value {
        StoredValue::Null => Ok(Value::Null),
        StoredValue::Binary(bytes) => {
            let encoding: BinaryEncoding = encoding.parse()?;
            Ok(Value::String(encoding.encode(bytes)))
        }
        other => Err(unexpected(BINARY, "binary data", other)),
    }
}

// ── date ───────────────────────────────────────────────────────────

fn date_to_storage(value: &Value, _encoding: &str) -> Result<StoredValue, ConversionError> {
    let instant = match value {
        Value::Null => Utc::now(),
        Value::String(s) => parse_date(s)?,
        Value::Number(n) => {
            let millis = n
                .as_i64()
                .ok_or_else(|| invalid(DATE, format!("{n} is not an integer millisecond count")))?;
            Utc.timestamp_millis_opt(millis)
                .single()
                .ok_or_else(|| invalid(DATE, format!("{millis} ms is out of range")))?
        }
        other => return Err(unexpected(DATE, "a date string or epoch milliseconds", other)),
    };
    Ok(StoredValue::DateTime(instant))
}

fn parse_date(s: &str) -> Result<DateTime<Utc>, ConversionError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| invalid(DATE, format!("cannot parse {s:?} as RFC 3339 or YYYY-MM-DD")))
}

fn date_from_storage(value: &StoredValue, _encoding: &str) -> Result<Value, ConversionError> {
    match value {
        StoredValue::Null => Ok(Value::Null),
        StoredValue::DateTime(dt) => Ok(Value::String(format_instant(dt))),
        other => Err(unexpected(DATE, "a date", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> TypeRegistry {
        TypeRegistry::with_builtins()
    }

    fn round_trip(value: Value, type_name: &str, encoding: &str) -> Value {
        let r = registry();
        let stored = r.to_storage(&value, type_name, encoding).unwrap();
        r.from_storage(&stored, type_name, encoding).unwrap()
    }

    #[test]
    fn test_object_id_round_trip() {
        let hex = "65f0a1b2c3d4e5f601234567";
        let stored = registry().to_storage(&json!(hex), OBJECT_ID, "").unwrap();
        assert!(matches!(stored, StoredValue::ObjectId(_)));
        assert_eq!(round_trip(json!(hex), OBJECT_ID, ""), json!(hex));
    }

    #[test]
    fn test_object_id_rejects_number() {
        let err = registry().to_storage(&json!(5), OBJECT_ID, "").unwrap_err();
        assert!(matches!(err, ConversionError::UnexpectedValue { found: "number", .. }));
    }

    #[test]
    fn test_int32_from_string_and_number() {
        let r = registry();
        assert_eq!(r.to_storage(&json!("42"), INT32, "").unwrap(), StoredValue::Int32(42));
        assert_eq!(r.to_storage(&json!(-7), INT32, "").unwrap(), StoredValue::Int32(-7));
        assert_eq!(r.to_storage(&json!(3.0), INT32, "").unwrap(), StoredValue::Int32(3));
        assert_eq!(round_trip(json!("42"), INT32, ""), json!(42));
    }

    #[test]
    fn test_int32_out_of_range() {
        assert!(registry().to_storage(&json!(4_294_967_296i64), INT32, "").is_err());
        assert!(registry().to_storage(&json!("99999999999"), INT32, "").is_err());
        assert!(registry().to_storage(&json!(1.5), INT32, "").is_err());
    }

    #[test]
    fn test_int64_prefixed_strings() {
        let r = registry();
        assert_eq!(r.to_storage(&json!("0xff"), INT64, "").unwrap(), StoredValue::Int64(255));
        assert_eq!(r.to_storage(&json!("b101"), INT64, "").unwrap(), StoredValue::Int64(5));
        assert_eq!(
            r.to_storage(&json!("0xffffffffffffffff"), INT64, "").unwrap(),
            StoredValue::Int64(-1)
        );
        assert_eq!(
            r.to_storage(&json!("-9000000000"), INT64, "").unwrap(),
            StoredValue::Int64(-9_000_000_000)
        );
    }

    #[test]
    fn test_int64_overflowing_hex_rejected() {
        let err = registry()
            .to_storage(&json!("0x010000000000000000"), INT64, "")
            .unwrap_err();
        assert!(matches!(err, ConversionError::Radix(_)));
    }

    #[test]
    fn test_int64_reverse_keeps_full_precision() {
        let big = i64::MAX;
        assert_eq!(round_trip(json!(big.to_string()), INT64, ""), json!(big));
    }

    #[test]
    fn test_int128_hex_round_trip() {
        assert_eq!(round_trip(json!("0x1a2b"), INT128, ""), json!("0x1a2b"));
    }

    #[test]
    fn test_int128_zero_renders_0x00() {
        let stored = StoredValue::Decimal128(Decimal128::from_bytes([0; 16]));
        assert_eq!(registry().from_storage(&stored, INT128, "").unwrap(), json!("0x00"));
        assert_eq!(round_trip(json!("0x0000"), INT128, ""), json!("0x00"));
    }

    #[test]
    fn test_int128_decimal_and_number_inputs() {
        assert_eq!(round_trip(json!("255"), INT128, ""), json!("0xff"));
        assert_eq!(round_trip(json!(256), INT128, ""), json!("0x0100"));
    }

    #[test]
    fn test_int128_raw_buffer() {
        let mut raw = vec![json!(0); 16];
        raw[0] = json!(0x2b);
        raw[1] = json!(0x1a);
        let stored = registry().to_storage(&Value::Array(raw), INT128, "").unwrap();
        let StoredValue::Decimal128(d) = stored else {
            panic!("Expected Decimal128, got: {stored:?}");
        };
        assert_eq!(d.to_trimmed_hex(), "0x1a2b");
    }

    #[test]
    fn test_int128_raw_buffer_wrong_length() {
        let raw = Value::Array(vec![json!(1); 4]);
        assert!(registry().to_storage(&raw, INT128, "").is_err());
    }

    #[test]
    fn test_int128_unprefixed_non_decimal_rejected() {
        // "0o" is neither a prefix nor a decimal number.
        let err = registry().to_storage(&json!("0o17"), INT128, "").unwrap_err();
        assert!(matches!(err, ConversionError::Invalid { .. }));
    }

    #[test]
    fn test_binary_encodings() {
        assert_eq!(round_trip(json!("deadbeef"), BINARY, "hex"), json!("deadbeef"));
        assert_eq!(round_trip(json!("caf\u{e9}"), BINARY, "latin1"), json!("caf\u{e9}"));
        let stored = registry().to_storage(&json!("dead"), BINARY, "hex").unwrap();
        assert_eq!(stored, StoredValue::Binary(vec![0xde, 0xad]));
    }

    #[test]
    fn test_binary_unknown_encoding() {
        let err = registry().to_storage(&json!("x"), BINARY, "rot13").unwrap_err();
        assert_eq!(err, ConversionError::UnknownEncoding("rot13".into()));
    }

    #[test]
    fn test_date_inputs() {
        let r = registry();
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        for input in [
            json!("2024-03-01T00:00:00Z"),
            json!("2024-03-01T01:00:00+01:00"),
            json!("2024-03-01"),
            json!(expected.timestamp_millis()),
        ] {
            assert_eq!(
                r.to_storage(&input, DATE, "").unwrap(),
                StoredValue::DateTime(expected),
                "input {input}"
            );
        }
    }

    #[test]
    fn test_date_null_defaults_to_now() {
        let before = Utc::now();
        let stored = registry().to_storage(&Value::Null, DATE, "").unwrap();
        let StoredValue::DateTime(dt) = stored else {
            panic!("Expected DateTime, got: {stored:?}");
        };
        assert!(dt >= before);
    }

    #[test]
    fn test_date_round_trip_reaches_fixed_point() {
        let once = round_trip(json!("2024-03-01T00:00:00Z"), DATE, "");
        assert_eq!(once, json!("2024-03-01T00:00:00.000Z"));
        assert_eq!(round_trip(once.clone(), DATE, ""), once);
    }

    #[test]
    fn test_null_leaves_stay_null() {
        for t in [OBJECT_ID, INT32, INT64, INT128, BINARY] {
            assert_eq!(registry().to_storage(&Value::Null, t, "").unwrap(), StoredValue::Null);
            assert_eq!(registry().from_storage(&StoredValue::Null, t, "").unwrap(), Value::Null);
        }
    }
}
