//! Mutation watcher.
//!
//! A spawned task turns the document's mutation records into debounced
//! `RescanRequest`s on a single-consumer queue. It never touches the document;
//! whoever owns the document drains the queue and runs one pass per request.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
use tracing::debug;

use crate::dom::{Document, MutationRecord};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// One coalesced burst of field-bearing insertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RescanRequest {
    pub coalesced_records: usize,
}

/// Receiving end of the rescan queue. Dropping it stops the watcher.
#[derive(Debug)]
pub struct ObserverHandle {
    requests: mpsc::UnboundedReceiver<RescanRequest>,
    task: JoinHandle<()>,
}

impl ObserverHandle {
    /// Waits for the next request; `None` once the watcher has stopped and the
    /// queue is drained.
    pub async fn next_rescan(&mut self) -> Option<RescanRequest> {
        self.requests.recv().await
    }

    pub fn try_next_rescan(&mut self) -> Option<RescanRequest> {
        self.requests.try_recv().ok()
    }

    pub fn disconnect(self) {}
}

impl Drop for ObserverHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Starts watching `document` for inserted inputs, selects and textareas.
/// Must be called from within a tokio runtime.
pub fn watch(document: &mut Document, debounce: Duration) -> ObserverHandle {
    let mutations = document.subscribe();
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(debounce_loop(mutations, tx, debounce));
    ObserverHandle { requests: rx, task }
}

async fn debounce_loop(
    mut mutations: mpsc::UnboundedReceiver<MutationRecord>,
    requests: mpsc::UnboundedSender<RescanRequest>,
    debounce: Duration,
) {
    loop {
        // Idle until a record adds at least one form field.
        loop {
            match mutations.recv().await {
                Some(record) if record.adds_form_fields() => break,
                Some(_) => continue,
                None => return,
            }
        }

        let mut coalesced_records = 1;
        let mut deadline = Instant::now() + debounce;
        let closed = loop {
            match timeout_at(deadline, mutations.recv()).await {
                Ok(Some(record)) if record.adds_form_fields() => {
                    coalesced_records += 1;
                    deadline = Instant::now() + debounce;
                }
                Ok(Some(_)) => {}
                Ok(None) => break true,
                Err(_) => break false,
            }
        };

        debug!(coalesced_records, "Rescan requested");
        if requests.send(RescanRequest { coalesced_records }).is_err() || closed {
            return;
        }
    }
}
