// src/provider/parse.rs

//! Turning provider text into signal updates.
//!
//! Accepted forms:
//! - a JSON object: `{"motion": 1, "wifi": "home"}`
//! - `name=value` lines; the value is read as JSON when it parses
//!   (`1`, `2.5`, `true`, `{"latitude": 1, "longitude": 2}`), otherwise as
//!   text. Blank lines and `#` comments are skipped.

use crate::errors::{Result, SignalError};
use crate::types::{SignalBatch, Value};

/// Parse a whole document (file contents, HTTP body).
pub fn parse_document(text: &str) -> Result<SignalBatch> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') {
        return parse_json_object(trimmed);
    }

    let mut batch = SignalBatch::new();
    for (idx, line) in trimmed.lines().enumerate() {
        if let Some((name, value)) = parse_pair(line)
            .map_err(|e| SignalError::Config(format!("line {}: {}", idx + 1, e)))?
        {
            batch.insert(name, value);
        }
    }
    Ok(batch)
}

/// Parse one line from a stream (socket, process stdout).
///
/// Returns an empty batch for blank and comment lines.
pub fn parse_line(line: &str) -> Result<SignalBatch> {
    let trimmed = line.trim();
    if trimmed.starts_with('{') {
        return parse_json_object(trimmed);
    }

    let mut batch = SignalBatch::new();
    if let Some((name, value)) = parse_pair(trimmed).map_err(SignalError::Config)? {
        batch.insert(name, value);
    }
    Ok(batch)
}

/// Convert an already-decoded JSON value (e.g. an HTTP response) into updates.
pub fn from_json(json: serde_json::Value) -> Result<SignalBatch> {
    match json {
        serde_json::Value::Object(map) => Ok(map
            .into_iter()
            .map(|(name, value)| (name, Value::from_json(value)))
            .collect()),
        other => Err(SignalError::Config(format!(
            "expected a JSON object of signal values, got {}",
            json_kind(&other)
        ))),
    }
}

fn parse_json_object(text: &str) -> Result<SignalBatch> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    from_json(json)
}

fn parse_pair(line: &str) -> std::result::Result<Option<(String, Value)>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (name, raw) = line
        .split_once('=')
        .ok_or_else(|| format!("expected `name=value`, got '{}'", line))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing signal name in '{}'", line));
    }

    let raw = raw.trim();
    let value = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json) => Value::from_json(json),
        Err(_) => Value::Text(raw.to_string()),
    };

    Ok(Some((name.to_string(), value)))
}

fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
