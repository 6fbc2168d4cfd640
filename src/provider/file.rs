// src/provider/file.rs

use std::path::{Path, PathBuf};

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::provider::parse;
use crate::provider::{Flow, ProviderContext};

/// Watches one file and ingests its contents whenever it changes.
#[derive(Debug, Clone)]
pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub async fn run(self, ctx: &ProviderContext) -> Result<()> {
        // Best-effort canonicalization so event paths compare equal.
        let path = absolute(&self.path);

        // Watch the parent directory so replacing the file (write to temp +
        // rename) is still seen.
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        // Channel from the blocking notify callback into the async world.
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                // Receiver gone means the provider is shutting down.
                let _ = event_tx.send(res);
            },
            Config::default(),
        )?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        info!(provider = %ctx.name(), path = ?path, "file watcher started");

        if path.exists() && self.read_and_push(ctx, &path).await == Flow::Stop {
            return Ok(());
        }

        loop {
            let event = tokio::select! {
                _ = ctx.token().cancelled() => break,
                ev = event_rx.recv() => ev,
            };

            let event = match event {
                Some(Ok(event)) => event,
                Some(Err(err)) => {
                    ctx.fail(&err.into());
                    continue;
                }
                None => break,
            };

            if !touches(&event, &path) {
                continue;
            }
            debug!(provider = %ctx.name(), kind = ?event.kind, "watched file changed");

            if !path.exists() {
                debug!(provider = %ctx.name(), "watched file removed; waiting for it to reappear");
                continue;
            }

            if self.read_and_push(ctx, &path).await == Flow::Stop {
                break;
            }
        }

        debug!(provider = %ctx.name(), "file watcher loop ended");
        Ok(())
    }

    async fn read_and_push(&self, ctx: &ProviderContext, path: &Path) -> Flow {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(c) => c,
            Err(err) => {
                ctx.fail(&err.into());
                return Flow::Continue;
            }
        };

        match parse::parse_document(&contents) {
            Ok(updates) => ctx.push(updates),
            Err(err) => {
                warn!(provider = %ctx.name(), path = ?path, "could not parse signal file");
                ctx.fail(&err);
                Flow::Continue
            }
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    // The file may not exist yet: canonicalize the directory instead.
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            parent
                .canonicalize()
                .map(|p| p.join(name))
                .unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}

fn touches(event: &Event, path: &Path) -> bool {
    event.paths.iter().any(|p| p == path)
}
