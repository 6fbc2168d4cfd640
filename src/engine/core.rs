// src/engine/core.rs

//! Pure core of the signal engine.
//!
//! `SignalCore` owns the signal table and the group list and turns one batch
//! of updates into a list of [`Emission`]s. It takes the timestamp as an
//! argument and performs no IO, so it can be tested without Tokio, clocks
//! or locks. The async shell (`engine::runtime`) wraps it in a mutex and
//! calls the emitter.

use std::collections::HashSet;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, trace};

use crate::config::{ConfigFile, EngineSection, SignalGroup};
use crate::engine::table::{SignalTable, SignalValue};
use crate::types::SignalBatch;

/// One group firing: the group's action plus every signal that qualified.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Emission {
    pub group: String,
    pub action: String,
    pub values: SignalBatch,
}

#[derive(Debug)]
pub struct SignalCore {
    groups: Vec<SignalGroup>,
    table: SignalTable,
    /// Names referenced by at least one group; `None` when every name is kept.
    referenced: Option<HashSet<String>>,
}

impl SignalCore {
    pub fn new(groups: Vec<SignalGroup>, engine: &EngineSection) -> Self {
        let referenced = if engine.track_unreferenced {
            None
        } else {
            Some(
                groups
                    .iter()
                    .flat_map(|g| g.signals.iter().map(|s| s.name.clone()))
                    .collect(),
            )
        };

        Self {
            groups,
            table: SignalTable::new(),
            referenced,
        }
    }

    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self::new(cfg.groups.clone(), &cfg.engine)
    }

    /// Current state for a signal name, if any.
    pub fn state(&self, name: &str) -> Option<&SignalValue> {
        self.table.get(name)
    }

    /// Number of tracked signal names.
    pub fn tracked(&self) -> usize {
        self.table.len()
    }

    /// Record `updates` at time `now`, then evaluate every group in declared
    /// order.
    ///
    /// Returns at most one emission per group, in group order.
    pub fn ingest_at(&mut self, updates: SignalBatch, now: Instant) -> Vec<Emission> {
        for (name, value) in updates {
            if let Some(referenced) = &self.referenced {
                if !referenced.contains(&name) {
                    trace!(signal = %name, "dropping unreferenced signal");
                    continue;
                }
            }
            debug!(signal = %name, %value, kind = value.kind(), "signal update");
            self.table.record(&name, value, now);
        }

        self.evaluate(now)
    }

    fn evaluate(&mut self, now: Instant) -> Vec<Emission> {
        let mut emissions = Vec::new();

        for group in &self.groups {
            let mut values = SignalBatch::new();

            for signal in &group.signals {
                if let Some(value) = self.table.try_fire(signal, now) {
                    debug!(
                        group = %group.name,
                        signal = %signal.name,
                        reset = signal.reset_value,
                        "signal qualified"
                    );
                    values.insert(signal.name.clone(), value);
                }
            }

            if !values.is_empty() {
                info!(
                    "signal group '{}' action {} values {}",
                    group.name,
                    group.action,
                    format_batch(&values)
                );
                emissions.push(Emission {
                    group: group.name.clone(),
                    action: group.action.clone(),
                    values,
                });
            }
        }

        emissions
    }
}

/// `{name=value, ...}` rendering for logs.
pub fn format_batch(values: &SignalBatch) -> String {
    let parts: Vec<String> = values
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect();
    format!("{{{}}}", parts.join(", "))
}
