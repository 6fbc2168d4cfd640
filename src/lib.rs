// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod provider;
pub mod types;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, ProviderKind};
use crate::engine::emitter::JsonLinesEmitter;
use crate::engine::SignalEngine;
use crate::provider::ProviderStatus;

pub use crate::engine::{Emission, Emitter, IngestHandle};
pub use crate::errors::SignalError;
pub use crate::types::{SignalBatch, Value};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the engine, bound to a JSON-lines emitter on stdout
/// - the configured providers
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let engine = SignalEngine::from_path(&args.config)?;

    if args.dry_run {
        print_dry_run(engine.config());
        return Ok(());
    }

    info!(
        groups = engine.config().groups.len(),
        providers = engine.config().providers.len(),
        config = %args.config.display(),
        "configuration loaded"
    );

    let mut engine = engine.bind(JsonLinesEmitter::stdout()).run();

    loop {
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                if let Err(e) = res {
                    warn!(error = %e, "failed to listen for Ctrl+C");
                }
                info!("shutdown requested");
                break;
            }
            event = engine.next_status() => {
                let Some(event) = event else {
                    info!("all providers finished");
                    break;
                };
                match event.status {
                    ProviderStatus::Failed(msg) => {
                        warn!(provider = %event.provider, error = %msg, "provider reported failure");
                    }
                    status => debug!(provider = %event.provider, ?status, "provider status"),
                }
            }
        }
    }

    engine.shutdown().await?;
    Ok(())
}

/// Simple dry-run output: print groups, signals and providers.
fn print_dry_run(cfg: &ConfigFile) {
    println!("signalwatch dry-run");
    println!(
        "  engine.track_unreferenced = {}",
        cfg.engine.track_unreferenced
    );
    println!();

    println!("groups ({}):", cfg.groups.len());
    for group in &cfg.groups {
        println!("  - {} -> action '{}'", group.name, group.action);
        for signal in &group.signals {
            println!("      signal: {}", signal.name);
            println!("        threshold: {}", signal.threshold);
            println!("        timeout: {:?}", signal.timeout);
            if let Some(ref required) = signal.required_value {
                println!("        required_value: {required}");
            }
            if signal.reset_value {
                println!("        reset_value: true");
            }
        }
    }
    println!();

    println!("providers ({}):", cfg.providers.len());
    for provider in &cfg.providers {
        let detail = match &provider.kind {
            ProviderKind::Url {
                url,
                interval,
                request_timeout,
            } => format!("{url} every {interval:?}, timeout {request_timeout:?}"),
            ProviderKind::File { path } => path.display().to_string(),
            ProviderKind::Socket { bind } => bind.to_string(),
            ProviderKind::Process {
                command,
                restart_delay: None,
            } => command.clone(),
            ProviderKind::Process {
                command,
                restart_delay: Some(delay),
            } => format!("{command} (restart after {delay:?})"),
        };
        println!(
            "  - {} ({}): {detail}",
            provider.name,
            provider.kind.type_name()
        );
    }

    debug!("dry-run complete (no providers started)");
}
