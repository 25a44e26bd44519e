// src/engine/queue.rs

use tokio::sync::mpsc;
use tracing::trace;

/// Coalescing run-trigger mailbox with capacity one.
///
/// Semantics:
/// - [`TriggerQueue::notify`] never blocks. If a trigger is already pending
///   it is a no-op, so any burst of notifications between two consumptions
///   collapses into a single pending run. Triggers carry no payload; the
///   command line is re-read when the run actually starts.
/// - [`TriggerQueue::next`] suspends until a trigger is pending, then
///   consumes exactly one.
///
/// This is the debounce mechanism: saving a dozen files at once produces
/// one rerun, not twelve.
#[derive(Debug)]
pub struct TriggerQueue {
    tx: mpsc::Sender<()>,
    rx: mpsc::Receiver<()>,
}

impl TriggerQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(1);
        Self { tx, rx }
    }

    /// Record that a run is desired. Non-blocking and idempotent while a
    /// trigger is already pending.
    pub fn notify(&self) {
        match self.tx.try_send(()) {
            Ok(()) => trace!("trigger enqueued"),
            Err(mpsc::error::TrySendError::Full(())) => {
                trace!("trigger already pending; coalesced");
            }
            // The receiver lives in this same struct, so the channel can
            // only close once the queue itself is gone.
            Err(mpsc::error::TrySendError::Closed(())) => unreachable!(),
        }
    }

    /// A cheap handle for other tasks (e.g. the file watcher bridge) to
    /// notify through.
    pub fn handle(&self) -> TriggerHandle {
        TriggerHandle {
            tx: self.tx.clone(),
        }
    }

    /// Wait for the next trigger and consume it.
    pub async fn next(&mut self) {
        // `self.tx` keeps the channel open for the queue's whole lifetime.
        let _ = self.rx.recv().await;
    }
}

impl Default for TriggerQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Clonable notifier half of a [`TriggerQueue`].
#[derive(Debug, Clone)]
pub struct TriggerHandle {
    tx: mpsc::Sender<()>,
}

impl TriggerHandle {
    /// Same contract as [`TriggerQueue::notify`].
    pub fn notify(&self) {
        let _ = self.tx.try_send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn burst_of_notifies_yields_one_trigger() {
        let mut queue = TriggerQueue::new();
        for _ in 0..100 {
            queue.notify();
        }
        queue.next().await;

        // Nothing left pending: a second `next` must not complete.
        let pending = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            queue.next(),
        )
        .await;
        assert!(pending.is_err(), "queue should be empty after one next()");
    }

    #[tokio::test]
    async fn notify_after_consumption_wakes_waiter() {
        let mut queue = TriggerQueue::new();
        queue.notify();
        queue.next().await;

        let handle = queue.handle();
        let waiter = tokio::spawn(async move {
            queue.next().await;
            queue
        });
        handle.notify();
        waiter.await.expect("waiter task panicked");
    }
}
