//! Inbound mutation batches.
//!
//! Batches are produced on the runtime side of the boundary and consumed by a
//! [`Session`]. Each batch is applied under one write lock, in the order it was
//! sent.

use log::debug;
use tokio::sync::mpsc;

use crate::session::Session;
use crate::store::MutationOp;

/// One batch as delivered by the runtime.
pub type Batch = Vec<MutationOp>;

/// Sender half of the batch channel.
#[derive(Clone, Debug)]
pub struct BatchSender {
    tx: mpsc::UnboundedSender<Batch>,
}

impl BatchSender {
    /// Queue a batch. Returns false if the receiving session is gone.
    pub fn send(&self, batch: Batch) -> bool {
        self.tx.send(batch).is_ok()
    }
}

/// Receiver half of the batch channel.
#[derive(Debug)]
pub struct BatchReceiver {
    rx: mpsc::UnboundedReceiver<Batch>,
}

impl BatchReceiver {
    /// Wait for the next batch.
    pub async fn recv(&mut self) -> Option<Batch> {
        self.rx.recv().await
    }

    /// Apply every batch already queued, one at a time. Returns how many were
    /// applied.
    pub fn drain_into(&mut self, session: &Session) -> usize {
        let mut count = 0;
        while let Ok(batch) = self.rx.try_recv() {
            session.apply_batch(batch);
            count += 1;
        }
        count
    }

    /// Apply batches as they arrive until every sender is dropped.
    pub async fn run(mut self, session: Session) {
        while let Some(batch) = self.recv().await {
            session.apply_batch(batch);
            self.drain_into(&session);
        }
        debug!("[inbox] channel closed");
    }
}

/// Create a new batch channel pair.
pub fn channel() -> (BatchSender, BatchReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (BatchSender { tx }, BatchReceiver { rx })
}
