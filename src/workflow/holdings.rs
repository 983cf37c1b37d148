use crate::bonds::SplitRequest;
use crate::cache::RefreshTarget;
use crate::chain::ChainOperation;
use crate::transaction::{HoldingsPhase, TransactionStatus};
use crate::workflow::pipeline::{Flight, WritePlan};
use crate::workflow::{WorkflowError, Workflows};

impl Workflows {
    /// Split `amount` of principal off a bond into a new bond. Whether the
    /// bond can cover it is the contract's call.
    pub fn begin_split(&self, request: &SplitRequest) -> Result<Flight<HoldingsPhase>, WorkflowError> {
        let params = request.validate()?;
        let plan = WritePlan {
            refresh: Some(RefreshTarget::Bonds(params.account.clone())),
            account: params.account,
            setup: None,
            submit: HoldingsPhase::Splitting,
            submit_message: format!("Splitting {} FLOW off bond #{}...", params.amount, params.bond_id),
            success_message: format!("Bond #{} split", params.bond_id),
            operation: ChainOperation::SplitBond {
                bond_id: params.bond_id,
                amount: params.amount,
            },
            quote_expires_at: None,
        };
        Flight::launch(
            &self.holdings,
            params.bond_id.to_string(),
            plan,
            self.gateway.clone(),
            self.cache.clone(),
        )
    }

    pub async fn split(&self, request: &SplitRequest) -> Result<TransactionStatus<HoldingsPhase>, WorkflowError> {
        Ok(self.begin_split(request)?.run().await)
    }
}
