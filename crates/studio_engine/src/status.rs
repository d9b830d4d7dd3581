use tokio::sync::watch;

use crate::Status;

/// Current-value slot for one job's status.
///
/// Holds only the latest snapshot; observers that fall behind see the most
/// recent value, never a backlog.
#[derive(Debug)]
pub struct StatusSlot {
    tx: watch::Sender<Option<Status>>,
}

impl StatusSlot {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    pub fn publish(&self, status: Status) {
        self.tx.send_replace(Some(status));
    }

    pub fn latest(&self) -> Option<Status> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Status>> {
        self.tx.subscribe()
    }
}

impl Default for StatusSlot {
    fn default() -> Self {
        Self::new()
    }
}
