//! Loose accessors over decoded JSON bodies
//!
//! StarLine responses are only partly stable: fields go missing, numbers
//! arrive as strings and the other way round. These helpers never panic;
//! absence or a type mismatch yields `None` and the caller picks the
//! fallback.

use serde_json::{Map, Value};

/// Follow `path` through nested objects
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, key| current.as_object()?.get(*key))
}

/// String at `path`, only when the value really is a JSON string
pub fn str_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    lookup(value, path)?.as_str()
}

/// Render a scalar as text
///
/// Strings pass through, numbers use their JSON spelling except that
/// integral floats drop the fraction (`42.0` gives `"42"`), `true` becomes
/// `"1"`, `false` and `null` become `""`. Arrays and objects have no text
/// form.
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                Some((f as i64).to_string())
            }
            _ => Some(n.to_string()),
        },
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) | Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Text at `path`, see [`as_text`]
pub fn text_at(value: &Value, path: &[&str]) -> Option<String> {
    as_text(lookup(value, path)?)
}

/// Coerce a scalar to an integer
///
/// Floats truncate, numeric strings parse their leading integer part
/// (`"200"` and `"200 OK"` both give 200, `"abc"` gives 0), booleans give
/// 0 or 1 and `null` gives 0.
pub fn as_loose_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|v| v as i64))
            .or_else(|| n.as_f64().map(|v| v as i64)),
        Value::String(s) => Some(leading_int(s)),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Null => Some(0),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Strict integer check: the JSON value must be an integer literal equal
/// to `expected`. `"1"` and `1.0` do not match `1`.
pub fn is_int(value: Option<&Value>, expected: i64) -> bool {
    matches!(value, Some(Value::Number(n)) if n.is_i64() || n.is_u64())
        && value.and_then(Value::as_i64) == Some(expected)
}

/// Emptiness as the StarLine backend treats it: `""` and `"0"`
pub fn is_blank(text: &str) -> bool {
    text.is_empty() || text == "0"
}

/// Parse a body into an object, `None` for malformed JSON or a non-object
/// top level
pub fn parse_object(body: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(body).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn leading_int(s: &str) -> i64 {
    let trimmed = s.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map(|v| sign * v).unwrap_or(0)
}
