//! Workflow orchestrator.
//!
//! # Data Flow
//! ```text
//! *Request (raw)
//!     → validate()                  ✗ WorkflowError::Validation, nothing else happens
//!     → quote (mint with USDC)      ✗ WorkflowError::QuoteUnavailable
//!     → Flight::launch(key)         ✗ WorkflowError::Busy
//!     → Flight::run
//!         pre-check → setup? → submit (txId) → await finality
//!         → success | error
//!     → background read-cache refresh
//! ```
//!
//! `begin_*` methods stop after the launch so callers can answer before
//! the chain work finishes; the plain methods run to completion.

mod holdings;
mod marketplace;
mod mint;
mod pipeline;
mod redeem;

use std::sync::Arc;
use thiserror::Error;

use crate::bonds::ParamError;
use crate::cache::ReadCache;
use crate::chain::{ChainError, ChainGateway};
use crate::quoting::QuoteClient;
use crate::transaction::{
    EventBus, FlowKind, HoldingsPhase, MarketplacePhase, MintPhase, Phase, RedeemPhase,
    StatusBoard, StatusSnapshot, TransitionError,
};

pub use pipeline::Flight;
pub use redeem::RedeemBatch;

/// Errors returned before an operation takes ownership of its key.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ParamError),

    #[error("a {flow} operation is already in progress for {key}")]
    Busy { flow: FlowKind, key: String },

    #[error("{0}")]
    QuoteUnavailable(String),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Entry point for every user operation.
#[derive(Clone)]
pub struct Workflows {
    gateway: Arc<dyn ChainGateway>,
    quotes: QuoteClient,
    cache: ReadCache,
    events: EventBus,
    mint: StatusBoard<MintPhase>,
    redeem: StatusBoard<RedeemPhase>,
    marketplace: StatusBoard<MarketplacePhase>,
    holdings: StatusBoard<HoldingsPhase>,
    default_slippage_bps: u32,
}

impl Workflows {
    pub fn new(
        gateway: Arc<dyn ChainGateway>,
        quotes: QuoteClient,
        events: EventBus,
        default_slippage_bps: u32,
    ) -> Self {
        Self {
            cache: ReadCache::new(gateway.clone()),
            gateway,
            quotes,
            mint: StatusBoard::new(events.clone()),
            redeem: StatusBoard::new(events.clone()),
            marketplace: StatusBoard::new(events.clone()),
            holdings: StatusBoard::new(events.clone()),
            events,
            default_slippage_bps,
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn cache(&self) -> &ReadCache {
        &self.cache
    }

    pub fn quotes(&self) -> &QuoteClient {
        &self.quotes
    }

    pub fn mint_board(&self) -> &StatusBoard<MintPhase> {
        &self.mint
    }

    pub fn redeem_board(&self) -> &StatusBoard<RedeemPhase> {
        &self.redeem
    }

    pub fn marketplace_board(&self) -> &StatusBoard<MarketplacePhase> {
        &self.marketplace
    }

    pub fn holdings_board(&self) -> &StatusBoard<HoldingsPhase> {
        &self.holdings
    }

    /// Current status of `key` in `flow`.
    pub fn snapshot(&self, flow: FlowKind, key: &str) -> StatusSnapshot {
        match flow {
            FlowKind::Mint => self.mint.snapshot(key),
            FlowKind::Redeem => self.redeem.snapshot(key),
            FlowKind::Marketplace => self.marketplace.snapshot(key),
            FlowKind::Holdings => self.holdings.snapshot(key),
        }
    }

    /// Every non-idle status across all flows.
    pub fn snapshots(&self) -> Vec<StatusSnapshot> {
        let mut all = self.mint.snapshots();
        all.extend(self.redeem.snapshots());
        all.extend(self.marketplace.snapshots());
        all.extend(self.holdings.snapshots());
        all
    }

    /// Clear a finished result.
    pub fn dismiss(&self, flow: FlowKind, key: &str) -> Result<StatusSnapshot, WorkflowError> {
        fn reset<P: Phase>(board: &StatusBoard<P>, key: &str) -> Result<StatusSnapshot, WorkflowError> {
            let status = board.dismiss(key)?;
            Ok(StatusSnapshot::from_status(key, &status))
        }
        match flow {
            FlowKind::Mint => reset(&self.mint, key),
            FlowKind::Redeem => reset(&self.redeem, key),
            FlowKind::Marketplace => reset(&self.marketplace, key),
            FlowKind::Holdings => reset(&self.holdings, key),
        }
    }

    fn ensure_idle<P: Phase>(board: &StatusBoard<P>, key: &str) -> Result<(), WorkflowError> {
        if board.get(key).is_in_flight() {
            return Err(WorkflowError::Busy {
                flow: P::FLOW,
                key: key.to_string(),
            });
        }
        Ok(())
    }
}
