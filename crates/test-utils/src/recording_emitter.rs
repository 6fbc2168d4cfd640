use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use signalwatch::engine::{Emission, Emitter};
use signalwatch::SignalBatch;
use tokio::sync::Notify;

/// An emitter that:
/// - records every emission (with its group name)
/// - wakes waiters on each emission
/// - can be switched to fail, to exercise error propagation.
#[derive(Clone, Default)]
pub struct RecordingEmitter {
    emitted: Arc<Mutex<Vec<Emission>>>,
    notify: Arc<Notify>,
    fail_actions: Arc<Mutex<Vec<String>>>,
}

impl RecordingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `emit` fail for this action.
    pub fn fail_on(&self, action: &str) {
        self.fail_actions.lock().unwrap().push(action.to_string());
    }

    pub fn emissions(&self) -> Vec<Emission> {
        self.emitted.lock().unwrap().clone()
    }

    pub fn actions(&self) -> Vec<String> {
        self.emissions().into_iter().map(|e| e.action).collect()
    }

    /// Wait until at least `count` emissions were recorded.
    pub async fn wait_for(&self, count: usize) -> Vec<Emission> {
        loop {
            let notified = self.notify.notified();
            {
                let guard = self.emitted.lock().unwrap();
                if guard.len() >= count {
                    return guard.clone();
                }
            }
            notified.await;
        }
    }
}

impl Emitter for RecordingEmitter {
    fn emit(&self, action: &str, values: &SignalBatch) -> anyhow::Result<()> {
        self.dispatch(&Emission {
            group: String::new(),
            action: action.to_string(),
            values: values.clone(),
        })
    }

    fn dispatch(&self, emission: &Emission) -> anyhow::Result<()> {
        if self
            .fail_actions
            .lock()
            .unwrap()
            .iter()
            .any(|a| a == &emission.action)
        {
            return Err(anyhow!("refusing action '{}'", emission.action));
        }

        self.emitted.lock().unwrap().push(emission.clone());
        self.notify.notify_waiters();
        Ok(())
    }
}
