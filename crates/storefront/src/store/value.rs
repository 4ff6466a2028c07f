//! Conversion between plain JSON and the REST API's typed values.
//!
//! The REST API wraps every value in a one-key object naming its type
//! (`{"stringValue": "..."}`, `{"integerValue": "42"}`, ...). Records in
//! this crate serialize to plain JSON, so documents are converted at the
//! client boundary. The record timestamp fields ([`TIMESTAMP_FIELDS`]) are
//! written as timestamps so that the console and other clients see real
//! dates; every other string is stored verbatim.

use chrono::{DateTime, SecondsFormat};
use serde_json::{Map, Number, Value, json};

use super::Fields;

/// Fields holding RFC 3339 times.
pub const TIMESTAMP_FIELDS: &[&str] = &["createdAt", "updatedAt", "timestamp"];

/// Encode plain fields as typed REST fields.
pub fn encode_fields(fields: &Fields) -> Map<String, Value> {
    fields
        .iter()
        .map(|(key, value)| (key.clone(), encode_field(key, value)))
        .collect()
}

fn encode_field(key: &str, value: &Value) -> Value {
    match value {
        Value::String(s)
            if TIMESTAMP_FIELDS.contains(&key) && DateTime::parse_from_rfc3339(s).is_ok() =>
        {
            json!({ "timestampValue": s })
        }
        _ => encode(value),
    }
}

/// Encode one plain value. Strings are always string values.
pub fn encode(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64().unwrap_or_default() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Decode typed REST fields into plain fields.
pub fn decode_fields(fields: &Map<String, Value>) -> Fields {
    fields
        .iter()
        .map(|(key, value)| (key.clone(), decode(value)))
        .collect()
}

/// Decode one typed value. Unknown shapes decode to `null`.
pub fn decode(value: &Value) -> Value {
    let Some((kind, inner)) = value.as_object().and_then(|o| o.iter().next()) else {
        return Value::Null;
    };
    match kind.as_str() {
        "booleanValue" => Value::Bool(inner.as_bool().unwrap_or_default()),
        "integerValue" => inner
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .or_else(|| inner.as_i64())
            .map_or(Value::Null, |i| Value::Number(i.into())),
        "doubleValue" => inner
            .as_f64()
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number),
        "timestampValue" => inner.as_str().map_or(Value::Null, normalize_timestamp),
        "stringValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(
            inner
                .get("fields")
                .and_then(Value::as_object)
                .map(decode_fields)
                .unwrap_or_default(),
        ),
        "geoPointValue" => inner.clone(),
        _ => Value::Null,
    }
}

fn normalize_timestamp(raw: &str) -> Value {
    DateTime::parse_from_rfc3339(raw).map_or_else(
        |_| Value::String(raw.to_string()),
        |dt| Value::String(dt.to_utc().to_rfc3339_opts(SecondsFormat::AutoSi, true)),
    )
}
