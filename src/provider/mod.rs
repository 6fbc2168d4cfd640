// src/provider/mod.rs

//! Signal providers: independent sources of raw updates.
//!
//! Exactly four variants exist (url, file, socket, process); the variant is
//! picked once from config. Each provider runs as its own Tokio task, pushes
//! updates through an [`IngestHandle`], observes a cancellation token, and
//! reports its health on the status channel.

pub mod file;
pub mod parse;
pub mod process;
pub mod socket;
pub mod url;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{ProviderConfig, ProviderKind};
use crate::engine::IngestHandle;
use crate::errors::{Result, SignalError};
use crate::types::SignalBatch;

pub use file::FileProvider;
pub use process::ProcessProvider;
pub use socket::SocketProvider;
pub use url::UrlProvider;

/// Health of a provider as reported on the status channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderStatus {
    Started,
    /// A recoverable or fatal failure; the message is human readable.
    Failed(String),
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEvent {
    pub provider: String,
    pub status: ProviderStatus,
}

/// Everything a provider task needs from the engine.
#[derive(Debug, Clone)]
pub struct ProviderContext {
    name: String,
    ingest: IngestHandle,
    token: CancellationToken,
    status_tx: mpsc::UnboundedSender<ProviderEvent>,
}

/// What a provider should do after pushing updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

impl ProviderContext {
    pub fn new(
        name: String,
        ingest: IngestHandle,
        token: CancellationToken,
        status_tx: mpsc::UnboundedSender<ProviderEvent>,
    ) -> Self {
        Self {
            name,
            ingest,
            token,
            status_tx,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Push updates into the engine.
    ///
    /// Emitter failures are reported and logged, and the provider keeps
    /// going. Returns `Flow::Stop` once the engine no longer accepts updates.
    pub fn push(&self, updates: SignalBatch) -> Flow {
        if updates.is_empty() {
            return Flow::Continue;
        }
        debug!(provider = %self.name, count = updates.len(), "pushing updates");

        match self.ingest.ingest(updates) {
            Ok(_) => Flow::Continue,
            Err(SignalError::Stopped) => {
                debug!(provider = %self.name, "engine stopped; provider exiting");
                Flow::Stop
            }
            Err(err) => {
                self.fail(&err);
                Flow::Continue
            }
        }
    }

    /// Log and report a failure without stopping the provider.
    pub fn fail(&self, err: &SignalError) {
        warn!(provider = %self.name, error = %err, "provider failure");
        self.report(ProviderStatus::Failed(err.to_string()));
    }

    pub fn report(&self, status: ProviderStatus) {
        // Nobody listening is fine.
        let _ = self.status_tx.send(ProviderEvent {
            provider: self.name.clone(),
            status,
        });
    }
}

/// Closed set of provider variants.
#[derive(Debug, Clone)]
pub enum SignalProvider {
    Url(UrlProvider),
    File(FileProvider),
    Socket(SocketProvider),
    Process(ProcessProvider),
}

impl SignalProvider {
    pub fn from_config(cfg: &ProviderConfig) -> Self {
        match &cfg.kind {
            ProviderKind::Url {
                url,
                interval,
                request_timeout,
            } => SignalProvider::Url(UrlProvider::new(url.clone(), *interval, *request_timeout)),
            ProviderKind::File { path } => SignalProvider::File(FileProvider::new(path.clone())),
            ProviderKind::Socket { bind } => SignalProvider::Socket(SocketProvider::new(*bind)),
            ProviderKind::Process {
                command,
                restart_delay,
            } => SignalProvider::Process(ProcessProvider::new(command.clone(), *restart_delay)),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            SignalProvider::Url(_) => "url",
            SignalProvider::File(_) => "file",
            SignalProvider::Socket(_) => "socket",
            SignalProvider::Process(_) => "process",
        }
    }

    /// Run the provider on its own Tokio task.
    ///
    /// The task reports `Started`, then `Failed` if the provider ends with an
    /// error, and always `Stopped` last.
    pub fn spawn(self, ctx: ProviderContext) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(provider = %ctx.name(), kind = self.type_name(), "provider started");
            ctx.report(ProviderStatus::Started);

            if let Err(err) = self.run(&ctx).await {
                ctx.fail(&err);
            }

            info!(provider = %ctx.name(), "provider stopped");
            ctx.report(ProviderStatus::Stopped);
        })
    }

    async fn run(self, ctx: &ProviderContext) -> Result<()> {
        match self {
            SignalProvider::Url(p) => p.run(ctx).await,
            SignalProvider::File(p) => p.run(ctx).await,
            SignalProvider::Socket(p) => p.run(ctx).await,
            SignalProvider::Process(p) => p.run(ctx).await,
        }
    }
}
