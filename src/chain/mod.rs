//! Chain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Workflow step
//!     → gateway.rs (ChainGateway trait)
//!     → client.rs (HttpChainGateway: JSON over HTTP to the wallet bridge)
//!         reads:  primary → failover → failover
//!         writes: primary only
//!     → finality.rs (poll transaction result until sealed / reverted / expired)
//! ```
//!
//! # Design Decisions
//! - Signing and key custody stay in the wallet bridge
//! - Submissions are never retried
//! - User-declined signatures are a distinct error from contract rejections

pub mod client;
pub mod finality;
pub mod gateway;
pub mod types;

pub use client::HttpChainGateway;
pub use gateway::ChainGateway;
pub use types::{
    ChainError, ChainOperation, ChainResult, FinalityOutcome, Payment, TransactionResult,
    TxId, TxLifecycle,
};
