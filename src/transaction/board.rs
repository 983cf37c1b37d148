//! Keyed status storage with exclusive per-key ownership.

use dashmap::DashMap;
use std::sync::Arc;

use crate::chain::TxId;
use crate::observability::metrics;
use crate::transaction::events::{EventBus, StatusSnapshot};
use crate::transaction::phase::Phase;
use crate::transaction::status::{TransactionStatus, TransitionError};

const INTERRUPTED_MESSAGE: &str = "Operation interrupted before completion";
const FALLBACK_ERROR_MESSAGE: &str = "Operation failed";

/// Statuses of one flow, keyed by the entity each operation targets
/// (account, bond id, listing id). Keys are independent of each other.
#[derive(Debug, Clone)]
pub struct StatusBoard<P: Phase> {
    entries: Arc<DashMap<String, TransactionStatus<P>>>,
    events: EventBus,
}

impl<P: Phase> StatusBoard<P> {
    pub fn new(events: EventBus) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            events,
        }
    }

    /// Current status; idle when the key was never used.
    pub fn get(&self, key: &str) -> TransactionStatus<P> {
        self.entries
            .get(key)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    pub fn snapshot(&self, key: &str) -> StatusSnapshot {
        StatusSnapshot::from_status(key, &self.get(key))
    }

    /// Every non-idle status on the board.
    pub fn snapshots(&self) -> Vec<StatusSnapshot> {
        self.entries
            .iter()
            .filter(|entry| entry.value().state() != P::IDLE)
            .map(|entry| StatusSnapshot::from_status(entry.key(), entry.value()))
            .collect()
    }

    pub fn in_flight_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().is_in_flight())
            .count()
    }

    /// Claim `key` and move it to `first`.
    ///
    /// Fails with [`TransitionError::InFlight`] while another operation
    /// owns the key. The check and the claim happen under the same lock.
    pub fn try_begin(
        &self,
        key: impl Into<String>,
        first: P,
        message: impl Into<String>,
    ) -> Result<FlowHandle<P>, TransitionError> {
        let key = key.into();
        let started = {
            let mut entry = self.entries.entry(key.clone()).or_default();
            entry
                .start(first, message)
                .map(|()| StatusSnapshot::from_status(&key, entry.value()))
        };
        let snapshot = match started {
            Ok(snapshot) => snapshot,
            Err(e) => {
                // Drop the placeholder a refused claim may have created.
                self.entries.remove_if(&key, |_, status| status.state() == P::IDLE);
                return Err(e);
            }
        };
        self.changed(snapshot);
        Ok(FlowHandle {
            board: self.clone(),
            key,
            finished: false,
        })
    }

    /// Clear a finished result back to idle.
    pub fn dismiss(&self, key: &str) -> Result<TransactionStatus<P>, TransitionError> {
        let snapshot = match self.entries.get_mut(key) {
            Some(mut entry) => {
                entry.reset()?;
                StatusSnapshot::from_status(key, entry.value())
            }
            None => return Ok(TransactionStatus::new()),
        };
        self.entries.remove_if(key, |_, status| status.state() == P::IDLE);
        self.changed(snapshot);
        Ok(TransactionStatus::new())
    }

    fn update<F>(&self, key: &str, apply: F) -> Result<TransactionStatus<P>, TransitionError>
    where
        F: FnOnce(&mut TransactionStatus<P>) -> Result<(), TransitionError>,
    {
        let (status, snapshot) = {
            let mut entry = self.entries.entry(key.to_string()).or_default();
            apply(entry.value_mut())?;
            (entry.value().clone(), StatusSnapshot::from_status(key, entry.value()))
        };
        self.changed(snapshot);
        Ok(status)
    }

    // Must not be called while holding an entry guard.
    fn changed(&self, snapshot: StatusSnapshot) {
        tracing::info!(
            flow = %P::FLOW,
            key = %snapshot.key,
            phase = snapshot.state,
            tx_id = ?snapshot.tx_id.as_ref().map(TxId::as_str),
            status = %snapshot.status_string,
            "Status changed"
        );
        metrics::record_phase_transition(P::FLOW.as_str(), snapshot.state);
        metrics::set_in_flight(P::FLOW.as_str(), self.in_flight_count());
        self.events.publish(snapshot);
    }
}

/// Exclusive writer for one key while an operation runs.
///
/// Dropping the handle before a terminal transition (task cancelled,
/// panic) records an error so the key never stays locked.
#[derive(Debug)]
pub struct FlowHandle<P: Phase> {
    board: StatusBoard<P>,
    key: String,
    finished: bool,
}

impl<P: Phase> FlowHandle<P> {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn status(&self) -> TransactionStatus<P> {
        self.board.get(&self.key)
    }

    pub fn advance(&self, next: P, message: impl Into<String>) -> Result<(), TransitionError> {
        self.board
            .update(&self.key, |status| status.advance(next, message))
            .map(|_| ())
    }

    pub fn record_tx_id(&self, tx_id: TxId) -> Result<(), TransitionError> {
        self.board
            .update(&self.key, |status| status.record_tx_id(tx_id))
            .map(|_| ())
    }

    pub fn succeed(mut self, message: impl Into<String>) -> Result<TransactionStatus<P>, TransitionError> {
        let status = self
            .board
            .update(&self.key, |status| status.succeed(message))?;
        self.finished = true;
        metrics::record_workflow_outcome(P::FLOW.as_str(), "success");
        Ok(status)
    }

    /// Record a failure and release the key.
    pub fn fail(mut self, message: impl Into<String>) -> TransactionStatus<P> {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = FALLBACK_ERROR_MESSAGE.to_string();
        }
        self.finished = true;
        metrics::record_workflow_outcome(P::FLOW.as_str(), "error");
        match self.board.update(&self.key, |status| status.fail(message)) {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(flow = %P::FLOW, key = %self.key, error = %e, "Failure not recorded");
                self.board.get(&self.key)
            }
        }
    }
}

impl<P: Phase> Drop for FlowHandle<P> {
    fn drop(&mut self) {
        if self.finished || !self.board.get(&self.key).is_in_flight() {
            return;
        }
        tracing::warn!(flow = %P::FLOW, key = %self.key, "Operation dropped while in flight");
        metrics::record_workflow_outcome(P::FLOW.as_str(), "interrupted");
        let _ = self
            .board
            .update(&self.key, |status| status.fail(INTERRUPTED_MESSAGE));
    }
}
