// src/engine/mod.rs

//! The signal engine.
//!
//! - [`table`]: per-name state and the change-detection policy.
//! - [`core`]: pure ingest + evaluate pass over all groups.
//! - [`emitter`]: where emissions go.
//! - [`runtime`]: staged construction, shared state behind a mutex, the
//!   ingest handle used by providers, and provider lifecycle.

pub mod core;
pub mod emitter;
pub mod runtime;
pub mod table;

pub use core::{format_batch, Emission, SignalCore};
pub use emitter::{ChannelEmitter, Emitter};
pub use runtime::{BoundEngine, IngestHandle, RunningEngine, SignalEngine};
pub use table::{changed, SignalTable, SignalValue};
