// src/engine/emitter.rs

//! Outbound side of the engine.
//!
//! The engine hands every emission to an [`Emitter`] supplied at bind time.
//! Closures implement the trait directly; [`ChannelEmitter`] forwards into a
//! Tokio channel for consumers that want to handle emissions on their own
//! task; [`JsonLinesEmitter`] writes one JSON object per emission.

use std::io::Write;
use std::sync::Mutex;

use anyhow::anyhow;
use tokio::sync::mpsc;

use crate::engine::core::Emission;
use crate::types::SignalBatch;

/// Receiver of `(action, values)` callbacks.
///
/// Called synchronously on the provider task that triggered the evaluation,
/// outside the engine lock. An error is propagated back to that provider.
pub trait Emitter: Send + Sync {
    fn emit(&self, action: &str, values: &SignalBatch) -> anyhow::Result<()>;

    /// Entry point used by the engine. Override to see the group name too.
    fn dispatch(&self, emission: &Emission) -> anyhow::Result<()> {
        self.emit(&emission.action, &emission.values)
    }
}

impl<F> Emitter for F
where
    F: Fn(&str, &SignalBatch) -> anyhow::Result<()> + Send + Sync,
{
    fn emit(&self, action: &str, values: &SignalBatch) -> anyhow::Result<()> {
        self(action, values)
    }
}

/// Emitter that forwards emissions into an unbounded channel.
///
/// Unbounded so that `emit` never blocks the provider task.
#[derive(Debug, Clone)]
pub struct ChannelEmitter {
    tx: mpsc::UnboundedSender<Emission>,
}

impl ChannelEmitter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Emission>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Emitter for ChannelEmitter {
    fn emit(&self, action: &str, values: &SignalBatch) -> anyhow::Result<()> {
        self.dispatch(&Emission {
            group: String::new(),
            action: action.to_string(),
            values: values.clone(),
        })
    }

    fn dispatch(&self, emission: &Emission) -> anyhow::Result<()> {
        self.tx
            .send(emission.clone())
            .map_err(|_| anyhow!("emission receiver dropped"))
    }
}

/// Writes each emission as one JSON line:
/// `{"group":"presence","action":"wake","values":{"motion":1}}`.
#[derive(Debug)]
pub struct JsonLinesEmitter<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonLinesEmitter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl JsonLinesEmitter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> Emitter for JsonLinesEmitter<W> {
    fn emit(&self, action: &str, values: &SignalBatch) -> anyhow::Result<()> {
        self.dispatch(&Emission {
            group: String::new(),
            action: action.to_string(),
            values: values.clone(),
        })
    }

    fn dispatch(&self, emission: &Emission) -> anyhow::Result<()> {
        let line = serde_json::to_string(emission)?;
        let mut out = self
            .out
            .lock()
            .map_err(|_| anyhow!("output writer poisoned"))?;
        writeln!(out, "{line}")?;
        out.flush()?;
        Ok(())
    }
}
