#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use signalwatch::config::{
    ConfigFile, EngineSection, ProviderConfig, ProviderKind, Signal, SignalGroup,
};
use signalwatch::Value;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    engine: EngineSection,
    groups: Vec<SignalGroup>,
    providers: Vec<ProviderConfig>,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            engine: EngineSection::default(),
            groups: Vec::new(),
            providers: Vec::new(),
        }
    }

    pub fn with_group(mut self, group: SignalGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn with_provider(mut self, name: &str, kind: ProviderKind) -> Self {
        self.providers.push(ProviderConfig {
            name: name.to_string(),
            kind,
        });
        self
    }

    pub fn with_process(self, name: &str, command: &str) -> Self {
        self.with_provider(
            name,
            ProviderKind::Process {
                command: command.to_string(),
                restart_delay: None,
            },
        )
    }

    pub fn with_file(self, name: &str, path: impl Into<PathBuf>) -> Self {
        self.with_provider(name, ProviderKind::File { path: path.into() })
    }

    pub fn track_unreferenced(mut self, val: bool) -> Self {
        self.engine.track_unreferenced = val;
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::new_unchecked(self.engine, self.groups, self.providers)
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `SignalGroup`.
pub struct GroupBuilder {
    group: SignalGroup,
}

impl GroupBuilder {
    pub fn new(name: &str, action: &str) -> Self {
        Self {
            group: SignalGroup {
                name: name.to_string(),
                action: action.to_string(),
                signals: Vec::new(),
            },
        }
    }

    pub fn signal(mut self, signal: Signal) -> Self {
        self.group.signals.push(signal);
        self
    }

    pub fn build(self) -> SignalGroup {
        self.group
    }
}

/// Builder for `Signal`.
pub struct SignalBuilder {
    signal: Signal,
}

impl SignalBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            signal: Signal::new(name, 0.0),
        }
    }

    pub fn threshold(mut self, val: f64) -> Self {
        self.signal.threshold = val;
        self
    }

    pub fn required(mut self, val: impl Into<Value>) -> Self {
        self.signal.required_value = Some(val.into());
        self
    }

    pub fn reset(mut self, val: bool) -> Self {
        self.signal.reset_value = val;
        self
    }

    pub fn timeout(mut self, val: Duration) -> Self {
        self.signal.timeout = val;
        self
    }

    pub fn build(self) -> Signal {
        self.signal
    }
}
