// src/engine/runtime.rs

use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{load_and_validate, ConfigFile, ProviderConfig};
use crate::engine::core::{Emission, SignalCore};
use crate::engine::emitter::Emitter;
use crate::engine::table::SignalValue;
use crate::errors::{Result, SignalError};
use crate::provider::{ProviderContext, ProviderEvent, SignalProvider};
use crate::types::SignalBatch;

/// A configured engine with no emitter attached yet.
///
/// Construction is staged: `SignalEngine::new(cfg)` → [`SignalEngine::bind`]
/// → [`BoundEngine::run`]. Each stage is its own type, so an engine cannot
/// run before an emitter is bound.
#[derive(Debug)]
pub struct SignalEngine {
    config: ConfigFile,
}

impl SignalEngine {
    pub fn new(config: ConfigFile) -> Self {
        Self { config }
    }

    /// Load and validate a config file, then build the engine from it.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(load_and_validate(path)?))
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Attach the emitter.
    pub fn bind<E: Emitter + 'static>(self, emitter: E) -> BoundEngine {
        let core = SignalCore::from_config(&self.config);
        let shared = Arc::new(Shared {
            core: Mutex::new(core),
            emitter: Box::new(emitter),
            token: CancellationToken::new(),
        });

        BoundEngine {
            handle: IngestHandle { shared },
            providers: self.config.providers,
        }
    }
}

/// Engine with an emitter, ready to start its providers.
#[derive(Debug)]
pub struct BoundEngine {
    handle: IngestHandle,
    providers: Vec<ProviderConfig>,
}

impl BoundEngine {
    /// Ingest handle usable before (and after) `run`.
    pub fn handle(&self) -> IngestHandle {
        self.handle.clone()
    }

    /// Start every configured provider as its own Tokio task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn run(self) -> RunningEngine {
        let token = self.handle.shared.token.clone();
        let (status_tx, status_rx) = mpsc::unbounded_channel();

        let tasks = self
            .providers
            .iter()
            .map(|cfg| {
                let provider = SignalProvider::from_config(cfg);
                let ctx = ProviderContext::new(
                    cfg.name.clone(),
                    self.handle.clone(),
                    token.child_token(),
                    status_tx.clone(),
                );
                provider.spawn(ctx)
            })
            .collect::<Vec<_>>();

        info!(providers = tasks.len(), "signal engine running");

        RunningEngine {
            handle: self.handle,
            token,
            tasks,
            status_rx,
        }
    }
}

/// Engine whose providers are running.
pub struct RunningEngine {
    handle: IngestHandle,
    token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
    status_rx: mpsc::UnboundedReceiver<ProviderEvent>,
}

impl fmt::Debug for RunningEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunningEngine")
            .field("providers", &self.tasks.len())
            .field("stopped", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl RunningEngine {
    pub fn handle(&self) -> IngestHandle {
        self.handle.clone()
    }

    /// Next provider status event.
    ///
    /// Returns `None` once every provider task has finished.
    pub async fn next_status(&mut self) -> Option<ProviderEvent> {
        self.status_rx.recv().await
    }

    /// Ask providers to stop and reject further `ingest` calls.
    ///
    /// Cancels while holding the engine lock: once this returns, no ingest
    /// call touches the signal table again.
    pub fn stop(&self) {
        let _core = self.handle.shared.lock();
        if !self.token.is_cancelled() {
            info!("signal engine stopping");
        }
        self.token.cancel();
    }

    /// Stop and wait for all provider tasks to finish.
    pub async fn shutdown(mut self) -> Result<()> {
        self.stop();

        for task in self.tasks.drain(..) {
            if let Err(err) = task.await {
                warn!(error = %err, "provider task ended abnormally");
                if err.is_panic() {
                    return Err(SignalError::Other(anyhow::Error::new(err)));
                }
            }
        }

        info!("signal engine stopped");
        Ok(())
    }
}

struct Shared {
    core: Mutex<SignalCore>,
    emitter: Box<dyn Emitter>,
    token: CancellationToken,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SignalCore> {
        // A panicking emitter never holds the lock, so a poisoned core is
        // still consistent.
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cloneable entry point through which producers push updates.
///
/// Holds no reference into the signal table; every call locks the engine
/// for the duration of one ingest + evaluate pass.
#[derive(Clone)]
pub struct IngestHandle {
    shared: Arc<Shared>,
}

impl fmt::Debug for IngestHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestHandle")
            .field("stopped", &self.is_stopped())
            .finish_non_exhaustive()
    }
}

impl IngestHandle {
    /// Record `updates`, evaluate all groups and emit the resulting batches.
    ///
    /// The table update and evaluation happen under the engine lock; the
    /// emitter runs after the lock is released, in group order, on the
    /// caller's task. Every batch is offered to the emitter even when an
    /// earlier one fails, since the table already counts it as emitted. The
    /// first failure is returned.
    pub fn ingest(&self, updates: SignalBatch) -> Result<Vec<Emission>> {
        let emissions = {
            let mut core = self.shared.lock();
            if self.shared.token.is_cancelled() {
                return Err(SignalError::Stopped);
            }
            core.ingest_at(updates, Instant::now())
        };

        let mut first_failure = None;
        for emission in &emissions {
            debug!(action = %emission.action, group = %emission.group, "emitting");
            if let Err(source) = self.shared.emitter.dispatch(emission) {
                warn!(
                    action = %emission.action,
                    group = %emission.group,
                    error = %source,
                    "emitter rejected batch"
                );
                first_failure.get_or_insert(SignalError::Emit {
                    action: emission.action.clone(),
                    source,
                });
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(emissions),
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.token.is_cancelled()
    }

    /// Snapshot of the current state for a signal name.
    pub fn state(&self, name: &str) -> Option<SignalValue> {
        self.shared.lock().state(name).cloned()
    }

    /// Number of tracked signal names.
    pub fn tracked(&self) -> usize {
        self.shared.lock().tracked()
    }
}
