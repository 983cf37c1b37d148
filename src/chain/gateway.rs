//! The seam between the workflow engine and the chain.

use async_trait::async_trait;

use crate::bonds::{Address, Bond, Listing};
use crate::chain::types::{ChainOperation, ChainResult, FinalityOutcome, TxId};

/// Everything the workflows need from the wallet/chain layer.
///
/// Implementations own signing and transport. Workflows only sequence
/// these calls and interpret their results.
#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Whether the account already holds the collections a bond needs.
    async fn check_account_setup(&self, account: &Address) -> ChainResult<bool>;

    /// Submit the one-time account setup transaction.
    async fn submit_setup_transaction(&self, account: &Address) -> ChainResult<TxId>;

    /// Submit a write operation signed by `account`.
    async fn submit_transaction(
        &self,
        account: &Address,
        operation: &ChainOperation,
    ) -> ChainResult<TxId>;

    /// Wait until the transaction is sealed, reverted or expired.
    async fn await_finalization(&self, tx_id: &TxId) -> ChainResult<FinalityOutcome>;

    async fn query_user_bonds(&self, account: &Address) -> ChainResult<Vec<Bond>>;

    async fn query_listings(&self) -> ChainResult<Vec<Listing>>;
}
