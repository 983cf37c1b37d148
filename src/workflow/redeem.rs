use futures_util::future::join_all;

use crate::bonds::{unix_now, AccountRequest, Address, RedeemRequest};
use crate::cache::{ReadCache, RefreshTarget};
use crate::chain::ChainOperation;
use crate::transaction::{RedeemPhase, StatusSnapshot, TransactionStatus};
use crate::workflow::pipeline::{Flight, WritePlan};
use crate::workflow::{WorkflowError, Workflows};

/// Independent redemptions started together, one per matured bond.
pub struct RedeemBatch {
    account: Address,
    flights: Vec<Flight<RedeemPhase>>,
    /// Bonds skipped because another operation owns them.
    busy: Vec<StatusSnapshot>,
    cache: ReadCache,
}

impl RedeemBatch {
    pub fn is_empty(&self) -> bool {
        self.flights.is_empty() && self.busy.is_empty()
    }

    /// Status of every bond in the batch right now.
    pub fn snapshots(&self) -> Vec<StatusSnapshot> {
        self.flights
            .iter()
            .map(Flight::snapshot)
            .chain(self.busy.iter().cloned())
            .collect()
    }

    /// Run every redemption concurrently. One bond's failure does not
    /// affect the others. The account's bonds are refreshed once, after
    /// the last redemption ends.
    pub async fn run(self) -> Vec<StatusSnapshot> {
        let RedeemBatch {
            account,
            flights,
            busy,
            cache,
        } = self;
        let submitted_any = !flights.is_empty();
        let runs = flights.into_iter().map(|flight| async move {
            let key = flight.key().to_string();
            let status = flight.run().await;
            StatusSnapshot::from_status(&key, &status)
        });
        let mut outcomes = join_all(runs).await;
        if submitted_any {
            cache.spawn_refresh(RefreshTarget::Bonds(account));
        }
        outcomes.extend(busy);
        outcomes
    }
}

fn redeem_plan(account: Address, bond_id: u64, refresh: Option<RefreshTarget>) -> WritePlan<RedeemPhase> {
    WritePlan {
        refresh,
        account,
        setup: None,
        submit: RedeemPhase::Pending,
        submit_message: format!("Redeeming bond #{}...", bond_id),
        success_message: format!("Bond #{} redeemed", bond_id),
        operation: ChainOperation::RedeemBond { bond_id },
        quote_expires_at: None,
    }
}

impl Workflows {
    pub fn begin_redeem(&self, request: &RedeemRequest) -> Result<Flight<RedeemPhase>, WorkflowError> {
        let params = request.validate()?;
        Flight::launch(
            &self.redeem,
            params.bond_id.to_string(),
            redeem_plan(
                params.account.clone(),
                params.bond_id,
                Some(RefreshTarget::Bonds(params.account)),
            ),
            self.gateway.clone(),
            self.cache.clone(),
        )
    }

    pub async fn redeem(&self, request: &RedeemRequest) -> Result<TransactionStatus<RedeemPhase>, WorkflowError> {
        Ok(self.begin_redeem(request)?.run().await)
    }

    /// Claim every matured bond of the account for redemption.
    ///
    /// Bonds are read from the chain, not the cache, so maturity is judged
    /// on current data.
    pub async fn begin_redeem_all(&self, request: &AccountRequest) -> Result<RedeemBatch, WorkflowError> {
        let account = request.validate()?;
        let now = unix_now();
        let bonds = self.gateway.query_user_bonds(&account).await?;

        let mut batch = RedeemBatch {
            account: account.clone(),
            flights: Vec::new(),
            busy: Vec::new(),
            cache: self.cache.clone(),
        };
        for bond in bonds.iter().filter(|bond| bond.is_matured(now)) {
            let key = bond.id.to_string();
            match Flight::launch(
                &self.redeem,
                key.clone(),
                redeem_plan(account.clone(), bond.id, None),
                self.gateway.clone(),
                self.cache.clone(),
            ) {
                Ok(flight) => batch.flights.push(flight),
                Err(WorkflowError::Busy { .. }) => batch.busy.push(self.redeem.snapshot(&key)),
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            account = %account,
            matured = batch.flights.len() + batch.busy.len(),
            busy = batch.busy.len(),
            "Redeem-all started"
        );
        Ok(batch)
    }

    pub async fn redeem_all(&self, request: &AccountRequest) -> Result<Vec<StatusSnapshot>, WorkflowError> {
        Ok(self.begin_redeem_all(request).await?.run().await)
    }
}
