// src/provider/url.rs

use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use crate::errors::Result;
use crate::provider::parse;
use crate::provider::{Flow, ProviderContext};
use crate::types::SignalBatch;

/// Polls a URL and ingests the JSON object it returns.
#[derive(Debug, Clone)]
pub struct UrlProvider {
    url: String,
    interval: Duration,
    request_timeout: Duration,
}

impl UrlProvider {
    pub fn new(url: String, interval: Duration, request_timeout: Duration) -> Self {
        Self {
            url,
            interval,
            request_timeout,
        }
    }

    pub async fn run(self, ctx: &ProviderContext) -> Result<()> {
        let client = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()?;

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ctx.token().cancelled() => return Ok(()),
                _ = ticker.tick() => {}
            }

            let fetched = tokio::select! {
                _ = ctx.token().cancelled() => return Ok(()),
                res = self.fetch(&client) => res,
            };

            match fetched {
                Ok(updates) => {
                    if ctx.push(updates) == Flow::Stop {
                        return Ok(());
                    }
                }
                // Keep polling; the next tick is the retry.
                Err(err) => ctx.fail(&err),
            }
        }
    }

    async fn fetch(&self, client: &reqwest::Client) -> Result<SignalBatch> {
        debug!(url = %self.url, "polling");
        let body: serde_json::Value = client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        parse::from_json(body)
    }
}
