// src/engine/table.rs

//! Per-name signal state and change detection.

use std::collections::HashMap;
use std::time::Instant;

use crate::config::Signal;
use crate::types::Value;

/// Last known reading of one signal name plus emission bookkeeping.
///
/// `last_emitted_*` are written only when the value is emitted, never at
/// ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalValue {
    pub value: Value,
    pub time: Instant,
    pub last_emitted_value: Option<Value>,
    pub last_emitted_time: Option<Instant>,
}

impl SignalValue {
    /// Fresh entry for a first sighting.
    pub fn new(value: Value, time: Instant) -> Self {
        Self {
            value,
            time,
            last_emitted_value: None,
            last_emitted_time: None,
        }
    }

    /// Whether enough time has passed since the last emission.
    ///
    /// The comparison is strict: an update exactly `timeout` after the last
    /// emission is still suppressed.
    pub fn debounced(&self, signal: &Signal, now: Instant) -> bool {
        match self.last_emitted_time {
            None => true,
            Some(last) => now.saturating_duration_since(last) > signal.timeout,
        }
    }

    fn mark_emitted(&mut self, now: Instant) {
        self.last_emitted_value = Some(self.value.clone());
        self.last_emitted_time = Some(now);
    }
}

/// Table of signal state keyed by signal name.
///
/// One entry per distinct name, shared by every group that references it.
#[derive(Debug, Default)]
pub struct SignalTable {
    entries: HashMap<String, SignalValue>,
}

impl SignalTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&SignalValue> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Record a new reading. Emission bookkeeping of existing entries is kept.
    pub fn record(&mut self, name: &str, value: Value, now: Instant) {
        match self.entries.get_mut(name) {
            Some(entry) => {
                entry.value = value;
                entry.time = now;
            }
            None => {
                self.entries
                    .insert(name.to_string(), SignalValue::new(value, now));
            }
        }
    }

    /// Evaluate `signal` against its current entry.
    ///
    /// Returns the value to emit if the signal qualifies and is debounced,
    /// updating (or, for one-shot signals, removing) the entry. Returns
    /// `None` when the name has no entry or the signal does not fire.
    pub fn try_fire(&mut self, signal: &Signal, now: Instant) -> Option<Value> {
        let entry = self.entries.get_mut(&signal.name)?;

        if !(changed(signal, entry) && entry.debounced(signal, now)) {
            return None;
        }

        let value = entry.value.clone();
        if signal.reset_value {
            self.entries.remove(&signal.name);
        } else {
            entry.mark_emitted(now);
        }
        Some(value)
    }
}

/// Decide whether the current reading qualifies under `signal`'s policy.
///
/// - `required_value` set: qualifies iff the reading equals it.
/// - never emitted: qualifies.
/// - otherwise compare against the last emitted value by tag. A threshold of
///   zero makes the numeric and location branches always qualify.
pub fn changed(signal: &Signal, state: &SignalValue) -> bool {
    if let Some(required) = &signal.required_value {
        return state.value == *required;
    }

    let Some(last) = &state.last_emitted_value else {
        return true;
    };

    match (&state.value, last) {
        (Value::Int(value), Value::Int(last)) => {
            let threshold = signal.threshold.trunc();
            (value.abs_diff(*last) as f64) >= threshold
        }
        (Value::Float(value), Value::Float(last)) => (value - last).abs() >= signal.threshold,
        (
            Value::Location {
                latitude,
                longitude,
            },
            Value::Location {
                latitude: last_lat,
                longitude: last_lon,
            },
        ) => {
            (latitude - last_lat).abs() >= signal.threshold
                || (longitude - last_lon).abs() >= signal.threshold
        }
        // Mismatched tags or non-numeric readings.
        (value, last) => value != last,
    }
}
