// src/config/duration.rs

use std::time::Duration;

use serde::Deserialize;

/// A duration as written in config: either integer milliseconds or a string
/// with a unit suffix (`"250ms"`, `"5s"`, `"1m"`, `"2h"`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DurationSpec {
    Millis(u64),
    Text(String),
}

impl Default for DurationSpec {
    fn default() -> Self {
        DurationSpec::Millis(0)
    }
}

impl DurationSpec {
    pub fn to_duration(&self) -> Result<Duration, String> {
        match self {
            DurationSpec::Millis(ms) => Ok(Duration::from_millis(*ms)),
            DurationSpec::Text(s) => parse_duration(s),
        }
    }
}

impl From<&str> for DurationSpec {
    fn from(s: &str) -> Self {
        DurationSpec::Text(s.to_string())
    }
}

/// Parse a duration string such as `"250ms"`, `"5s"`, `"1m"` or `"2h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, unit) = s.split_at(split);

    if digits.is_empty() {
        return Err(format!("duration '{s}' must start with a number"));
    }
    let unit = unit.trim();
    if unit.is_empty() {
        return Err(format!("duration '{s}' is missing a unit (ms, s, m or h)"));
    }

    let value: u64 = digits
        .parse()
        .map_err(|e| format!("invalid duration number '{digits}': {e}"))?;
    let secs = |per_unit: u64| {
        value
            .checked_mul(per_unit)
            .map(Duration::from_secs)
            .ok_or_else(|| format!("duration '{s}' is too large"))
    };

    match unit.to_ascii_lowercase().as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => secs(1),
        "m" => secs(60),
        "h" => secs(3600),
        other => Err(format!(
            "unsupported duration unit '{other}' in '{s}'; expected ms, s, m or h"
        )),
    }
}
