// src/config/validate.rs

use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

use crate::config::duration::DurationSpec;
use crate::config::model::{
    ConfigFile, ProviderConfig, ProviderKind, RawConfigFile, RawGroupConfig,
    RawProviderConfig, RawSignalConfig, Signal, SignalGroup,
};
use crate::errors::{Result, SignalError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = SignalError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_groups(&raw)?;
        ensure_unique_group_names(&raw)?;

        let groups = raw
            .group
            .iter()
            .map(validate_group)
            .collect::<Result<Vec<_>>>()?;

        let providers = validate_providers(&raw.provider)?;

        Ok(ConfigFile::new_unchecked(raw.engine, groups, providers))
    }
}

fn config_err(msg: impl Into<String>) -> SignalError {
    SignalError::Config(msg.into())
}

fn ensure_has_groups(cfg: &RawConfigFile) -> Result<()> {
    if cfg.group.is_empty() {
        return Err(config_err(
            "config must contain at least one [[group]] section",
        ));
    }
    Ok(())
}

fn ensure_unique_group_names(cfg: &RawConfigFile) -> Result<()> {
    let mut seen = HashSet::new();
    for group in &cfg.group {
        if !seen.insert(group.name.as_str()) {
            return Err(config_err(format!(
                "group '{}' is defined more than once",
                group.name
            )));
        }
    }
    Ok(())
}

fn validate_group(group: &RawGroupConfig) -> Result<SignalGroup> {
    if group.name.trim().is_empty() {
        return Err(config_err("group name must not be empty"));
    }
    if group.action.trim().is_empty() {
        return Err(config_err(format!(
            "group '{}' has an empty action",
            group.name
        )));
    }
    if group.signal.is_empty() {
        return Err(config_err(format!(
            "group '{}' must contain at least one [[group.signal]]",
            group.name
        )));
    }

    let signals = group
        .signal
        .iter()
        .map(|s| validate_signal(&group.name, s))
        .collect::<Result<Vec<_>>>()?;

    Ok(SignalGroup {
        name: group.name.clone(),
        action: group.action.clone(),
        signals,
    })
}

fn validate_signal(group: &str, signal: &RawSignalConfig) -> Result<Signal> {
    if signal.name.trim().is_empty() {
        return Err(config_err(format!(
            "group '{}' has a signal with an empty name",
            group
        )));
    }
    if !signal.threshold.is_finite() || signal.threshold < 0.0 {
        return Err(config_err(format!(
            "signal '{}' in group '{}' has invalid threshold {} (must be finite and >= 0)",
            signal.name, group, signal.threshold
        )));
    }

    let timeout = resolve_duration(&signal.timeout, || {
        format!("timeout of signal '{}' in group '{}'", signal.name, group)
    })?;

    Ok(Signal {
        name: signal.name.clone(),
        threshold: signal.threshold,
        required_value: signal.required_value.clone(),
        reset_value: signal.reset_value,
        timeout,
    })
}

fn validate_providers(raw: &[RawProviderConfig]) -> Result<Vec<ProviderConfig>> {
    let mut seen = HashSet::new();
    let mut providers = Vec::with_capacity(raw.len());

    for (index, provider) in raw.iter().enumerate() {
        let name = provider
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}#{}", provider.type_name(), index));

        if !seen.insert(name.clone()) {
            return Err(config_err(format!(
                "provider '{}' is defined more than once",
                name
            )));
        }

        let kind = validate_provider_kind(&name, provider)?;
        providers.push(ProviderConfig { name, kind });
    }

    Ok(providers)
}

fn validate_provider_kind(name: &str, provider: &RawProviderConfig) -> Result<ProviderKind> {
    match provider {
        RawProviderConfig::Url(p) => {
            if p.url.trim().is_empty() {
                return Err(config_err(format!("url provider '{}' has an empty url", name)));
            }
            let interval = resolve_duration(&p.interval, || {
                format!("interval of provider '{}'", name)
            })?;
            if interval.is_zero() {
                return Err(config_err(format!(
                    "url provider '{}' must have a non-zero interval",
                    name
                )));
            }
            let request_timeout = resolve_duration(&p.request_timeout, || {
                format!("request_timeout of provider '{}'", name)
            })?;
            Ok(ProviderKind::Url {
                url: p.url.clone(),
                interval,
                request_timeout,
            })
        }
        RawProviderConfig::File(p) => {
            if p.path.as_os_str().is_empty() {
                return Err(config_err(format!("file provider '{}' has an empty path", name)));
            }
            Ok(ProviderKind::File {
                path: p.path.clone(),
            })
        }
        RawProviderConfig::Socket(p) => {
            let bind: SocketAddr = p.bind.trim().parse().map_err(|e| {
                config_err(format!(
                    "socket provider '{}' has invalid bind address '{}': {}",
                    name, p.bind, e
                ))
            })?;
            Ok(ProviderKind::Socket { bind })
        }
        RawProviderConfig::Process(p) => {
            if p.command.trim().is_empty() {
                return Err(config_err(format!(
                    "process provider '{}' has an empty command",
                    name
                )));
            }
            let restart_delay = p
                .restart_delay
                .as_ref()
                .map(|d| resolve_duration(d, || format!("restart_delay of provider '{}'", name)))
                .transpose()?;
            Ok(ProviderKind::Process {
                command: p.command.clone(),
                restart_delay,
            })
        }
    }
}

fn resolve_duration(spec: &DurationSpec, what: impl FnOnce() -> String) -> Result<Duration> {
    spec.to_duration()
        .map_err(|e| config_err(format!("invalid {}: {}", what(), e)))
}
