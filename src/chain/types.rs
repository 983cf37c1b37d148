//! Chain-facing types and error definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::bonds::{Amount, StrategyId};

/// Identifier the chain assigns to a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(String);

impl TxId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors that can occur while talking to the chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// Bridge connection or request failed.
    #[error("bridge request failed: {0}")]
    Transport(String),

    /// Bridge request timed out.
    #[error("bridge request timed out after {0} seconds")]
    Timeout(u64),

    /// The user declined to sign in their wallet.
    #[error("transaction cancelled by user")]
    UserRejected,

    /// The wallet, network or contract refused the transaction.
    #[error("transaction rejected: {0}")]
    Rejected(String),

    /// The transaction did not reach finality before the deadline.
    #[error("transaction not finalized within {0} seconds")]
    FinalityTimeout(u64),

    /// The bridge answered with something we could not interpret.
    #[error("unexpected bridge response: {0}")]
    InvalidResponse(String),

    /// Gateway not configured or disabled.
    #[error("chain gateway not available: {0}")]
    NotAvailable(String),
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// Lifecycle codes reported for a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum TxLifecycle {
    Unknown = 0,
    Pending = 1,
    Finalized = 2,
    Executed = 3,
    Sealed = 4,
    Expired = 5,
}

impl From<u8> for TxLifecycle {
    fn from(val: u8) -> Self {
        match val {
            1 => TxLifecycle::Pending,
            2 => TxLifecycle::Finalized,
            3 => TxLifecycle::Executed,
            4 => TxLifecycle::Sealed,
            5 => TxLifecycle::Expired,
            _ => TxLifecycle::Unknown,
        }
    }
}

impl From<TxLifecycle> for u8 {
    fn from(status: TxLifecycle) -> Self {
        status as u8
    }
}

/// Transaction result as polled from the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResult {
    pub status: TxLifecycle,
    #[serde(default)]
    pub status_code: u32,
    #[serde(default)]
    pub error_message: String,
}

impl TransactionResult {
    /// Terminal outcome, or `None` while the transaction is still moving.
    pub fn outcome(&self) -> Option<FinalityOutcome> {
        if self.status_code != 0 || !self.error_message.is_empty() {
            let reason = if self.error_message.is_empty() {
                format!("status code {}", self.status_code)
            } else {
                self.error_message.clone()
            };
            return Some(FinalityOutcome::Reverted(reason));
        }
        match self.status {
            TxLifecycle::Sealed => Some(FinalityOutcome::Sealed),
            TxLifecycle::Expired => Some(FinalityOutcome::Expired),
            _ => None,
        }
    }
}

/// How a transaction ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalityOutcome {
    /// Settled successfully.
    Sealed,
    /// Executed but reverted by the contract.
    Reverted(String),
    /// Dropped before inclusion.
    Expired,
}

impl fmt::Display for FinalityOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinalityOutcome::Sealed => f.write_str("sealed"),
            FinalityOutcome::Reverted(reason) => write!(f, "reverted: {}", reason),
            FinalityOutcome::Expired => f.write_str("expired before being sealed"),
        }
    }
}

/// How the bond purchase is paid for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "token", rename_all = "UPPERCASE")]
pub enum Payment {
    Flow,
    Usdc {
        #[serde(rename = "maxInput")]
        max_input: Amount,
    },
}

/// A write operation submitted on behalf of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "operation", content = "args", rename_all = "camelCase")]
pub enum ChainOperation {
    #[serde(rename_all = "camelCase")]
    MintBond {
        amount: Amount,
        lockup_days: u32,
        strategy: StrategyId,
        payment: Payment,
    },
    #[serde(rename_all = "camelCase")]
    RedeemBond { bond_id: u64 },
    #[serde(rename_all = "camelCase")]
    ListBond { bond_id: u64, price: Amount },
    #[serde(rename_all = "camelCase")]
    PurchaseListing { listing_id: u64 },
    #[serde(rename_all = "camelCase")]
    WithdrawListing { listing_id: u64 },
    #[serde(rename_all = "camelCase")]
    SplitBond { bond_id: u64, amount: Amount },
}

impl ChainOperation {
    pub fn name(&self) -> &'static str {
        match self {
            ChainOperation::MintBond { .. } => "mint_bond",
            ChainOperation::RedeemBond { .. } => "redeem_bond",
            ChainOperation::ListBond { .. } => "list_bond",
            ChainOperation::PurchaseListing { .. } => "purchase_listing",
            ChainOperation::WithdrawListing { .. } => "withdraw_listing",
            ChainOperation::SplitBond { .. } => "split_bond",
        }
    }
}
