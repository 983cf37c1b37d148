//! The shared write pipeline every flow runs through.

use std::sync::Arc;
use thiserror::Error;

use crate::bonds::{unix_now, Address};
use crate::cache::{ReadCache, RefreshTarget};
use crate::chain::{ChainError, ChainGateway, ChainOperation, FinalityOutcome};
use crate::transaction::{
    FlowHandle, Phase, StatusBoard, StatusSnapshot, TransactionStatus, TransitionError,
};
use crate::workflow::WorkflowError;

const CHECKING_MESSAGE: &str = "Checking account setup...";
const SETUP_MESSAGE: &str = "Setting up your account...";
const SEALING_MESSAGE: &str = "Waiting for the transaction to be sealed...";

/// Everything a flow decides before the pipeline starts.
#[derive(Debug, Clone)]
pub(crate) struct WritePlan<P> {
    pub account: Address,
    /// `(checking, setup)` phases when the flow needs account setup.
    pub setup: Option<(P, P)>,
    pub submit: P,
    pub submit_message: String,
    pub success_message: String,
    pub operation: ChainOperation,
    /// Deadline of the quote the operation was priced with.
    pub quote_expires_at: Option<u64>,
    /// Re-read after the run; `None` when the caller refreshes itself.
    pub refresh: Option<RefreshTarget>,
}

fn describe(error: &ChainError) -> String {
    match error {
        ChainError::UserRejected => "you declined to sign in your wallet".to_string(),
        ChainError::Rejected(reason) => format!("rejected by the network: {}", reason),
        ChainError::FinalityTimeout(secs) => {
            format!("not sealed within {} seconds and did not complete on-chain", secs)
        }
        other => other.to_string(),
    }
}

/// Why a pipeline ended in error. The display text is the status string.
#[derive(Debug, Error)]
pub(crate) enum StepFailure {
    #[error("Account check failed: {}", describe(.0))]
    PreCheck(ChainError),

    #[error("Account setup failed: {}", describe(.0))]
    Setup(ChainError),

    #[error("Account setup transaction {0}; the operation was not submitted")]
    SetupNotSealed(FinalityOutcome),

    #[error("The USDC quote expired before submission. Request a new quote and try again")]
    QuoteExpired,

    #[error("Transaction cancelled: you declined to sign in your wallet")]
    Cancelled,

    #[error("Transaction not submitted: {}", describe(.0))]
    Submit(ChainError),

    #[error("Transaction status unknown: {}", describe(.0))]
    Finality(ChainError),

    #[error("Transaction reverted and did not complete on-chain: {0}")]
    Reverted(String),

    #[error("Transaction expired and did not complete on-chain")]
    Expired,

    #[error("Internal state error: {0}")]
    Transition(#[from] TransitionError),
}

impl StepFailure {
    fn submit(error: ChainError) -> Self {
        match error {
            ChainError::UserRejected => StepFailure::Cancelled,
            other => StepFailure::Submit(other),
        }
    }
}

/// A claimed operation, ready to run.
///
/// Holding a `Flight` means the key is owned; dropping it without calling
/// [`Flight::run`] records an interruption error.
pub struct Flight<P: Phase> {
    handle: FlowHandle<P>,
    board: StatusBoard<P>,
    plan: WritePlan<P>,
    gateway: Arc<dyn ChainGateway>,
    cache: ReadCache,
}

impl<P: Phase> Flight<P> {
    pub(crate) fn launch(
        board: &StatusBoard<P>,
        key: String,
        plan: WritePlan<P>,
        gateway: Arc<dyn ChainGateway>,
        cache: ReadCache,
    ) -> Result<Self, WorkflowError> {
        let (first, message) = match plan.setup {
            Some((checking, _)) => (checking, CHECKING_MESSAGE.to_string()),
            None => (plan.submit, plan.submit_message.clone()),
        };
        let handle = board
            .try_begin(key.clone(), first, message)
            .map_err(|e| match e {
                TransitionError::InFlight { .. } => WorkflowError::Busy { flow: P::FLOW, key },
                other => WorkflowError::Transition(other),
            })?;
        Ok(Self {
            handle,
            board: board.clone(),
            plan,
            gateway,
            cache,
        })
    }

    pub fn key(&self) -> &str {
        self.handle.key()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.board.snapshot(self.handle.key())
    }

    /// Drive the operation to a terminal status, then refresh the read
    /// cache in the background whatever the outcome.
    pub async fn run(self) -> TransactionStatus<P> {
        let Flight {
            handle,
            board,
            plan,
            gateway,
            cache,
        } = self;
        let key = handle.key().to_string();

        let status = match execute(&handle, &plan, gateway.as_ref()).await {
            Ok(()) => match handle.succeed(plan.success_message.clone()) {
                Ok(status) => status,
                Err(e) => {
                    tracing::error!(flow = %P::FLOW, key = %key, error = %e, "Could not record success");
                    board.get(&key)
                }
            },
            Err(failure) => {
                tracing::warn!(flow = %P::FLOW, key = %key, error = %failure, "Operation failed");
                handle.fail(failure.to_string())
            }
        };

        if let Some(target) = plan.refresh {
            cache.spawn_refresh(target);
        }
        status
    }
}

async fn execute<P: Phase>(
    handle: &FlowHandle<P>,
    plan: &WritePlan<P>,
    gateway: &dyn ChainGateway,
) -> Result<(), StepFailure> {
    if let Some((_, setup_phase)) = plan.setup {
        let ready = gateway
            .check_account_setup(&plan.account)
            .await
            .map_err(StepFailure::PreCheck)?;
        if !ready {
            handle.advance(setup_phase, SETUP_MESSAGE)?;
            let setup_tx = gateway
                .submit_setup_transaction(&plan.account)
                .await
                .map_err(StepFailure::Setup)?;
            tracing::info!(account = %plan.account, tx_id = %setup_tx, "Account setup submitted");
            match gateway
                .await_finalization(&setup_tx)
                .await
                .map_err(StepFailure::Setup)?
            {
                FinalityOutcome::Sealed => {}
                other => return Err(StepFailure::SetupNotSealed(other)),
            }
        }
        handle.advance(plan.submit, plan.submit_message.clone())?;
    }

    if plan.quote_expires_at.is_some_and(|expires_at| unix_now() >= expires_at) {
        return Err(StepFailure::QuoteExpired);
    }

    let tx_id = gateway
        .submit_transaction(&plan.account, &plan.operation)
        .await
        .map_err(StepFailure::submit)?;
    handle.record_tx_id(tx_id.clone())?;
    handle.advance(plan.submit, SEALING_MESSAGE)?;

    match gateway
        .await_finalization(&tx_id)
        .await
        .map_err(StepFailure::Finality)?
    {
        FinalityOutcome::Sealed => Ok(()),
        FinalityOutcome::Reverted(reason) => Err(StepFailure::Reverted(reason)),
        FinalityOutcome::Expired => Err(StepFailure::Expired),
    }
}
