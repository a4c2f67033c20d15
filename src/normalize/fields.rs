use crate::error::{HealthError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

pub type Record = Map<String, Value>;

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

pub fn sequence<'a>(value: &'a Value, name: &str) -> Result<&'a [Value]> {
    match value {
        Value::Null => Ok(&[]),
        Value::Array(items) => Ok(items.as_slice()),
        other => Err(HealthError::Input(format!(
            "{name} must be a list of records (found {})",
            kind_of(other)
        ))),
    }
}

pub fn record<'a>(value: &'a Value, name: &str, index: usize) -> Result<&'a Record> {
    value.as_object().ok_or_else(|| {
        HealthError::Input(format!(
            "{name}[{index}] must be a mapping (found {})",
            kind_of(value)
        ))
    })
}

pub fn optional_mapping<'a>(value: &'a Value, name: &str) -> Result<Option<&'a Record>> {
    match value {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        other => Err(HealthError::Input(format!(
            "{name} must be a mapping (found {})",
            kind_of(other)
        ))),
    }
}

/// String-ish identifier or free text. Blank strings count as absent.
pub fn text(record: &Record, key: &str) -> Result<Option<String>> {
    match record.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => {
            let trimmed = value.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(HealthError::Input(format!(
            "field '{key}' must be a string (found {})",
            kind_of(other)
        ))),
    }
}

/// Non-negative integer; integral floats and numeric strings are accepted.
pub fn optional_count(record: &Record, key: &str) -> Result<Option<u64>> {
    let invalid = |found: &str| {
        HealthError::Input(format!(
            "field '{key}' must be a non-negative integer (found {found})"
        ))
    };
    match record.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => {
            if let Some(value) = number.as_u64() {
                return Ok(Some(value));
            }
            match number.as_f64() {
                Some(value) if value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 => {
                    Ok(Some(value as u64))
                }
                _ => Err(invalid(&number.to_string())),
            }
        }
        Some(Value::String(value)) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| invalid(&format!("\"{value}\""))),
        Some(other) => Err(invalid(kind_of(other))),
    }
}

pub fn count(record: &Record, key: &str) -> Result<u64> {
    Ok(optional_count(record, key)?.unwrap_or(0))
}

pub fn flag(record: &Record, key: &str) -> Result<bool> {
    match record.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(value)) => Ok(*value),
        Some(Value::String(value)) if value.eq_ignore_ascii_case("true") => Ok(true),
        Some(Value::String(value)) if value.eq_ignore_ascii_case("false") => Ok(false),
        Some(other) => Err(HealthError::Input(format!(
            "field '{key}' must be a boolean (found {})",
            kind_of(other)
        ))),
    }
}

/// Unparsable or absent timestamps are `None`; the caller decides whether
/// that drops the record.
pub fn timestamp(record: &Record, key: &str) -> Option<DateTime<Utc>> {
    record
        .get(key)
        .and_then(Value::as_str)
        .and_then(parse_timestamp)
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|parsed| parsed.and_utc())
}

/// Accepts `["a", "b"]` or the hosting API shape `[{"name": "a"}]`.
pub fn string_list(record: &Record, key: &str) -> Result<Option<Vec<String>>> {
    let items = match record.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(HealthError::Input(format!(
                "field '{key}' must be a list (found {})",
                kind_of(other)
            )))
        }
    };

    let mut values = Vec::with_capacity(items.len());
    for item in items {
        let value = match item {
            Value::String(value) => Some(value.trim().to_string()),
            Value::Object(map) => map
                .get("name")
                .or_else(|| map.get("login"))
                .and_then(Value::as_str)
                .map(|value| value.trim().to_string()),
            Value::Null => None,
            other => {
                return Err(HealthError::Input(format!(
                    "field '{key}' entries must be strings (found {})",
                    kind_of(other)
                )))
            }
        };
        if let Some(value) = value.filter(|value| !value.is_empty()) {
            values.push(value);
        }
    }
    Ok(Some(values))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}
