//! Per-operation status record and its transition rules.

use serde::Serialize;
use thiserror::Error;

use crate::chain::TxId;
use crate::transaction::phase::{Phase, Stage};

/// Misuse of the state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("an operation is already in progress ({current})")]
    InFlight { current: &'static str },

    #[error("cannot move from {from} to {to}")]
    Invalid {
        from: &'static str,
        to: &'static str,
    },

    #[error("transaction id can only be recorded while submitting (currently {current})")]
    TxIdOutsideSubmission { current: &'static str },

    #[error("transaction id already recorded")]
    TxIdAlreadySet,

    #[error("error transitions require a message")]
    MissingErrorMessage,
}

/// Observable status of one operation.
///
/// Fields are only writable through the transition methods, which enforce:
/// forward-only stage moves, a message on every transition, a non-empty
/// message on error, and a transaction id recorded at most once and only
/// while submitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatus<P: Phase> {
    state: P,
    status_string: String,
    tx_id: Option<TxId>,
}

impl<P: Phase> Default for TransactionStatus<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Phase> TransactionStatus<P> {
    pub fn new() -> Self {
        Self {
            state: P::IDLE,
            status_string: String::new(),
            tx_id: None,
        }
    }

    pub fn state(&self) -> P {
        self.state
    }

    pub fn status_string(&self) -> &str {
        &self.status_string
    }

    pub fn tx_id(&self) -> Option<&TxId> {
        self.tx_id.as_ref()
    }

    pub fn stage(&self) -> Stage {
        self.state.stage()
    }

    pub fn is_in_flight(&self) -> bool {
        self.stage().is_in_flight()
    }

    /// Begin a new operation. A previous terminal result is discarded.
    pub fn start(&mut self, first: P, message: impl Into<String>) -> Result<(), TransitionError> {
        if self.is_in_flight() {
            return Err(TransitionError::InFlight {
                current: self.state.as_str(),
            });
        }
        if !first.stage().is_in_flight() {
            return Err(TransitionError::Invalid {
                from: self.state.as_str(),
                to: first.as_str(),
            });
        }
        self.state = first;
        self.status_string = message.into();
        self.tx_id = None;
        Ok(())
    }

    /// Move to a later phase. Moving between two phases of the same stage is
    /// rejected except for the no-op of re-entering the current phase.
    pub fn advance(&mut self, next: P, message: impl Into<String>) -> Result<(), TransitionError> {
        if next == P::ERROR {
            return self.fail(message);
        }
        if next != self.state && !self.stage().can_advance_to(next.stage()) {
            return Err(TransitionError::Invalid {
                from: self.state.as_str(),
                to: next.as_str(),
            });
        }
        self.state = next;
        self.status_string = message.into();
        Ok(())
    }

    pub fn record_tx_id(&mut self, tx_id: TxId) -> Result<(), TransitionError> {
        if self.stage() != Stage::Submitting {
            return Err(TransitionError::TxIdOutsideSubmission {
                current: self.state.as_str(),
            });
        }
        if self.tx_id.is_some() {
            return Err(TransitionError::TxIdAlreadySet);
        }
        self.tx_id = Some(tx_id);
        Ok(())
    }

    pub fn succeed(&mut self, message: impl Into<String>) -> Result<(), TransitionError> {
        if self.stage() != Stage::Submitting {
            return Err(TransitionError::Invalid {
                from: self.state.as_str(),
                to: P::SUCCESS.as_str(),
            });
        }
        self.state = P::SUCCESS;
        self.status_string = message.into();
        Ok(())
    }

    /// Record a failure. The transaction id, if any, is kept for reference.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), TransitionError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(TransitionError::MissingErrorMessage);
        }
        if !self.is_in_flight() {
            return Err(TransitionError::Invalid {
                from: self.state.as_str(),
                to: P::ERROR.as_str(),
            });
        }
        self.state = P::ERROR;
        self.status_string = message;
        Ok(())
    }

    /// Return to idle (the user dismissed a result).
    pub fn reset(&mut self) -> Result<(), TransitionError> {
        if self.is_in_flight() {
            return Err(TransitionError::InFlight {
                current: self.state.as_str(),
            });
        }
        *self = Self::new();
        Ok(())
    }
}
