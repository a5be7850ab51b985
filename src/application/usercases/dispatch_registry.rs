use std::collections::HashMap;
use std::sync::Mutex;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use uuid::Uuid;

struct RunningDispatch {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

/// Tracks the dispatch task of every campaign currently running in this
/// process. One slot per campaign id: `begin` refuses a second run, `finish`
/// releases the slot, `shutdown` winds everything down for a clean exit.
#[derive(Default)]
pub struct DispatchRegistry {
    running: Mutex<HashMap<Uuid, RunningDispatch>>,
}

impl DispatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the campaign's dispatch slot and hands back its cancellation
    /// token. `None` when a run is already registered.
    pub fn begin(&self, campaign_id: Uuid) -> Option<CancellationToken> {
        let mut running = self.running.lock().unwrap();
        if running.contains_key(&campaign_id) {
            return None;
        }

        let cancel = CancellationToken::new();
        running.insert(
            campaign_id,
            RunningDispatch {
                cancel: cancel.clone(),
                handle: None,
            },
        );
        Some(cancel)
    }

    /// Stores the spawned task's handle so `shutdown` can await it.
    pub fn attach(&self, campaign_id: Uuid, handle: JoinHandle<()>) {
        if let Some(entry) = self.running.lock().unwrap().get_mut(&campaign_id) {
            entry.handle = Some(handle);
        }
    }

    /// Fires the campaign's cancellation token. Returns whether a run was
    /// registered.
    pub fn cancel(&self, campaign_id: Uuid) -> bool {
        match self.running.lock().unwrap().get(&campaign_id) {
            Some(entry) => {
                entry.cancel.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self, campaign_id: Uuid) -> bool {
        self.running.lock().unwrap().contains_key(&campaign_id)
    }

    /// Releases the slot; the dispatch task calls this as its last step.
    pub fn finish(&self, campaign_id: Uuid) {
        self.running.lock().unwrap().remove(&campaign_id);
    }

    /// Cancels every running dispatch and waits for the tasks to stop.
    pub async fn shutdown(&self) {
        let drained: Vec<RunningDispatch> = {
            let mut running = self.running.lock().unwrap();
            running.drain().map(|(_, entry)| entry).collect()
        };

        for entry in &drained {
            entry.cancel.cancel();
        }

        for entry in drained {
            if let Some(handle) = entry.handle {
                if let Err(error) = handle.await {
                    warn!(error = ?error, "dispatch task join failed during shutdown");
                }
            }
        }
    }
}
