// src/provider/process.rs

use std::process::Stdio;
use std::time::Duration;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::errors::{Result, SignalError};
use crate::provider::parse;
use crate::provider::{Flow, ProviderContext};

/// Runs a command and ingests each line it prints on stdout.
#[derive(Debug, Clone)]
pub struct ProcessProvider {
    command: String,
    restart_delay: Option<Duration>,
}

/// How one run of the child ended.
enum Exit {
    Finished,
    Cancelled,
}

impl ProcessProvider {
    pub fn new(command: String, restart_delay: Option<Duration>) -> Self {
        Self {
            command,
            restart_delay,
        }
    }

    pub async fn run(self, ctx: &ProviderContext) -> Result<()> {
        loop {
            match self.run_once(ctx).await {
                Ok(Exit::Cancelled) => return Ok(()),
                Ok(Exit::Finished) => {}
                Err(err) => ctx.fail(&err),
            }

            let Some(delay) = self.restart_delay else {
                return Ok(());
            };

            debug!(provider = %ctx.name(), ?delay, "restarting command after delay");
            tokio::select! {
                _ = ctx.token().cancelled() => return Ok(()),
                _ = sleep(delay) => {}
            }
        }
    }

    async fn run_once(&self, ctx: &ProviderContext) -> Result<Exit> {
        info!(provider = %ctx.name(), cmd = %self.command, "starting provider process");

        // Build a shell command appropriate for the platform.
        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(&self.command);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(&self.command);
            c
        };

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning provider command '{}'", self.command))?;

        // Always consume stderr so buffers don't fill; log at debug.
        if let Some(stderr) = child.stderr.take() {
            let name = ctx.name().to_string();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(provider = %name, "stderr: {}", line);
                }
            });
        }

        if let Some(stdout) = child.stdout.take() {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                let line = tokio::select! {
                    _ = ctx.token().cancelled() => {
                        // kill_on_drop reaps the child.
                        return Ok(Exit::Cancelled);
                    }
                    line = lines.next_line() => line?,
                };

                let Some(line) = line else { break };

                match parse::parse_line(&line) {
                    Ok(updates) => {
                        if ctx.push(updates) == Flow::Stop {
                            return Ok(Exit::Cancelled);
                        }
                    }
                    Err(err) => ctx.fail(&err),
                }
            }
        }

        let status = tokio::select! {
            _ = ctx.token().cancelled() => return Ok(Exit::Cancelled),
            status = child.wait() => status?,
        };

        info!(
            provider = %ctx.name(),
            exit_code = status.code().unwrap_or(-1),
            success = status.success(),
            "provider process exited"
        );

        if !status.success() {
            return Err(SignalError::Other(anyhow::anyhow!(
                "command '{}' exited with {}",
                self.command,
                status
            )));
        }

        Ok(Exit::Finished)
    }
}
