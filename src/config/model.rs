// src/config/model.rs

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::config::duration::DurationSpec;
use crate::types::Value;

/// Configuration as read from disk, before validation.
///
/// ```toml
/// [engine]
/// track_unreferenced = true
///
/// [[group]]
/// name = "presence"
/// action = "wake"
///
/// [[group.signal]]
/// name = "motion"
/// threshold = 1
/// reset_value = true
/// timeout = "5s"
///
/// [[provider]]
/// type = "process"
/// command = "./read-sensors.sh"
/// ```
///
/// JSON documents use the same keys. The plural, camelCase form (`groups`,
/// `signals`, `providers`, `requiredValue`, `resetValue`, ...) is accepted
/// as well.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub engine: EngineSection,

    /// Signal groups, in dispatch order.
    #[serde(default, alias = "groups")]
    pub group: Vec<RawGroupConfig>,

    #[serde(default, alias = "providers")]
    pub provider: Vec<RawProviderConfig>,
}

/// `[engine]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
    /// Keep table entries for names that no group references.
    ///
    /// `true` (default) stores every ingested name. `false` drops names that
    /// no configured signal uses, so the table stays bounded.
    #[serde(default = "default_track_unreferenced", alias = "trackUnreferenced")]
    pub track_unreferenced: bool,
}

fn default_track_unreferenced() -> bool {
    true
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            track_unreferenced: default_track_unreferenced(),
        }
    }
}

/// `[[group]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RawGroupConfig {
    pub name: String,
    pub action: String,
    #[serde(default, alias = "signals")]
    pub signal: Vec<RawSignalConfig>,
}

/// `[[group.signal]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSignalConfig {
    pub name: String,

    /// Minimum absolute change for numeric and location readings.
    #[serde(default)]
    pub threshold: f64,

    /// When set, the signal qualifies exactly when the reading equals this.
    #[serde(default, alias = "requiredValue")]
    pub required_value: Option<Value>,

    /// Forget the reading after it fires (one-shot).
    #[serde(default, alias = "resetValue")]
    pub reset_value: bool,

    /// Minimum time between two emissions of this signal.
    #[serde(default)]
    pub timeout: DurationSpec,
}

/// `[[provider]]` entry, discriminated by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RawProviderConfig {
    Url(RawUrlProvider),
    File(RawFileProvider),
    Socket(RawSocketProvider),
    Process(RawProcessProvider),
}

impl RawProviderConfig {
    pub fn name(&self) -> Option<&str> {
        match self {
            RawProviderConfig::Url(p) => p.name.as_deref(),
            RawProviderConfig::File(p) => p.name.as_deref(),
            RawProviderConfig::Socket(p) => p.name.as_deref(),
            RawProviderConfig::Process(p) => p.name.as_deref(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            RawProviderConfig::Url(_) => "url",
            RawProviderConfig::File(_) => "file",
            RawProviderConfig::Socket(_) => "socket",
            RawProviderConfig::Process(_) => "process",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawUrlProvider {
    #[serde(default)]
    pub name: Option<String>,
    pub url: String,
    #[serde(default = "default_poll_interval")]
    pub interval: DurationSpec,
    #[serde(default = "default_request_timeout", alias = "requestTimeout")]
    pub request_timeout: DurationSpec,
}

fn default_poll_interval() -> DurationSpec {
    DurationSpec::from("10s")
}

fn default_request_timeout() -> DurationSpec {
    DurationSpec::from("5s")
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFileProvider {
    #[serde(default)]
    pub name: Option<String>,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSocketProvider {
    #[serde(default)]
    pub name: Option<String>,
    pub bind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawProcessProvider {
    #[serde(default)]
    pub name: Option<String>,
    pub command: String,
    /// Restart the command this long after it exits. No restart when unset.
    #[serde(default, alias = "restartDelay")]
    pub restart_delay: Option<DurationSpec>,
}

/// Validated configuration. Built from [`RawConfigFile`] via `TryFrom`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub engine: EngineSection,
    pub groups: Vec<SignalGroup>,
    pub providers: Vec<ProviderConfig>,
}

impl ConfigFile {
    /// Build a config without running validation (tests, embedding).
    pub fn new_unchecked(
        engine: EngineSection,
        groups: Vec<SignalGroup>,
        providers: Vec<ProviderConfig>,
    ) -> Self {
        Self {
            engine,
            groups,
            providers,
        }
    }
}

/// A named action bound to an ordered list of signals.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalGroup {
    pub name: String,
    pub action: String,
    pub signals: Vec<Signal>,
}

/// Change-detection policy for one named value inside a group.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub name: String,
    pub threshold: f64,
    pub required_value: Option<Value>,
    pub reset_value: bool,
    pub timeout: Duration,
}

impl Signal {
    /// Level signal with the given threshold and no timeout.
    pub fn new(name: impl Into<String>, threshold: f64) -> Self {
        Self {
            name: name.into(),
            threshold,
            required_value: None,
            reset_value: false,
            timeout: Duration::ZERO,
        }
    }
}

/// A validated provider entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    /// Label used in logs and status events.
    pub name: String,
    pub kind: ProviderKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderKind {
    Url {
        url: String,
        interval: Duration,
        request_timeout: Duration,
    },
    File {
        path: PathBuf,
    },
    Socket {
        bind: SocketAddr,
    },
    Process {
        command: String,
        restart_delay: Option<Duration>,
    },
}

impl ProviderKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ProviderKind::Url { .. } => "url",
            ProviderKind::File { .. } => "file",
            ProviderKind::Socket { .. } => "socket",
            ProviderKind::Process { .. } => "process",
        }
    }
}
