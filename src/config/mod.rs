// src/config/mod.rs

//! Configuration loading and validation.
//!
//! - `model.rs`: serde-backed raw model and the validated types the engine uses.
//! - `loader.rs`: read TOML or JSON from disk or memory.
//! - `validate.rs`: `RawConfigFile` -> `ConfigFile`.
//! - `duration.rs`: `"5s"`-style duration strings.

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::{parse_duration, DurationSpec};
pub use loader::{load_and_validate, load_from_path, load_from_str, ConfigFormat};
pub use model::{
    ConfigFile, EngineSection, ProviderConfig, ProviderKind, RawConfigFile, RawFileProvider,
    RawGroupConfig, RawProcessProvider, RawProviderConfig, RawSignalConfig, RawSocketProvider,
    RawUrlProvider, Signal, SignalGroup,
};
