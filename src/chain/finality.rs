//! Finality monitoring for submitted transactions.

use std::future::Future;
use std::time::Duration;
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::chain::types::{ChainError, ChainResult, FinalityOutcome, TransactionResult, TxId};

/// Poll `poll` every `poll_interval` until the transaction reaches a
/// terminal outcome or `deadline` elapses.
///
/// Transport hiccups and per-call timeouts are logged and polled again;
/// any other error ends the wait.
pub async fn wait_for_finality<F, Fut>(
    tx_id: &TxId,
    mut poll: F,
    poll_interval: Duration,
    deadline: Duration,
) -> ChainResult<FinalityOutcome>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ChainResult<TransactionResult>>,
{
    let result = timeout(deadline, async {
        let mut ticker = interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let result = match poll().await {
                Ok(result) => result,
                Err(e @ (ChainError::Transport(_) | ChainError::Timeout(_))) => {
                    tracing::debug!(tx_id = %tx_id, error = %e, "Transaction poll failed, retrying");
                    continue;
                }
                Err(e) => return Err(e),
            };

            if let Some(outcome) = result.outcome() {
                return Ok(outcome);
            }

            tracing::debug!(
                tx_id = %tx_id,
                status = ?result.status,
                "Waiting for transaction to seal"
            );
        }
    })
    .await;

    match result {
        Ok(outcome) => outcome,
        Err(_) => Err(ChainError::FinalityTimeout(deadline.as_secs())),
    }
}
