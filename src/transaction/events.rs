//! Status change events for push delivery.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::chain::TxId;
use crate::transaction::phase::{FlowKind, Phase};
use crate::transaction::status::TransactionStatus;

/// Flow-erased view of a status, as pushed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub flow: FlowKind,
    pub key: String,
    pub state: &'static str,
    pub status_string: String,
    pub tx_id: Option<TxId>,
}

impl StatusSnapshot {
    pub fn from_status<P: Phase>(key: &str, status: &TransactionStatus<P>) -> Self {
        Self {
            flow: P::FLOW,
            key: key.to_string(),
            state: status.state().as_str(),
            status_string: status.status_string().to_string(),
            tx_id: status.tx_id().cloned(),
        }
    }
}

/// Broadcast of every status change across all flows.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<StatusSnapshot>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusSnapshot> {
        self.tx.subscribe()
    }

    pub fn publish(&self, snapshot: StatusSnapshot) {
        // No receivers is normal when nobody is connected.
        let _ = self.tx.send(snapshot);
    }
}
