use crate::bonds::{ListRequest, ListingRequest};
use crate::cache::RefreshTarget;
use crate::chain::ChainOperation;
use crate::transaction::{MarketplacePhase, TransactionStatus};
use crate::workflow::pipeline::{Flight, WritePlan};
use crate::workflow::{WorkflowError, Workflows};

// Listing is keyed by bond, purchase and withdraw by listing. The prefixes
// keep the two id spaces apart on one board.
fn bond_key(bond_id: u64) -> String {
    format!("bond-{}", bond_id)
}

fn listing_key(listing_id: u64) -> String {
    format!("listing-{}", listing_id)
}

impl Workflows {
    pub fn begin_list(&self, request: &ListRequest) -> Result<Flight<MarketplacePhase>, WorkflowError> {
        let params = request.validate()?;
        let plan = WritePlan {
            refresh: Some(RefreshTarget::BondsAndListings(params.account.clone())),
            account: params.account,
            setup: None,
            submit: MarketplacePhase::Listing,
            submit_message: format!("Listing bond #{} for {} FLOW...", params.bond_id, params.price),
            success_message: format!("Bond #{} listed for {} FLOW", params.bond_id, params.price),
            operation: ChainOperation::ListBond {
                bond_id: params.bond_id,
                price: params.price,
            },
            quote_expires_at: None,
        };
        Flight::launch(
            &self.marketplace,
            bond_key(params.bond_id),
            plan,
            self.gateway.clone(),
            self.cache.clone(),
        )
    }

    pub fn begin_purchase(&self, request: &ListingRequest) -> Result<Flight<MarketplacePhase>, WorkflowError> {
        let params = request.validate()?;
        let plan = WritePlan {
            refresh: Some(RefreshTarget::BondsAndListings(params.account.clone())),
            account: params.account,
            setup: None,
            submit: MarketplacePhase::Purchasing,
            submit_message: format!("Purchasing listing #{}...", params.listing_id),
            success_message: format!("Listing #{} purchased", params.listing_id),
            operation: ChainOperation::PurchaseListing {
                listing_id: params.listing_id,
            },
            quote_expires_at: None,
        };
        Flight::launch(
            &self.marketplace,
            listing_key(params.listing_id),
            plan,
            self.gateway.clone(),
            self.cache.clone(),
        )
    }

    pub fn begin_withdraw(&self, request: &ListingRequest) -> Result<Flight<MarketplacePhase>, WorkflowError> {
        let params = request.validate()?;
        let plan = WritePlan {
            refresh: Some(RefreshTarget::BondsAndListings(params.account.clone())),
            account: params.account,
            setup: None,
            submit: MarketplacePhase::Withdrawing,
            submit_message: format!("Withdrawing listing #{}...", params.listing_id),
            success_message: format!("Listing #{} withdrawn", params.listing_id),
            operation: ChainOperation::WithdrawListing {
                listing_id: params.listing_id,
            },
            quote_expires_at: None,
        };
        Flight::launch(
            &self.marketplace,
            listing_key(params.listing_id),
            plan,
            self.gateway.clone(),
            self.cache.clone(),
        )
    }

    pub async fn list(&self, request: &ListRequest) -> Result<TransactionStatus<MarketplacePhase>, WorkflowError> {
        Ok(self.begin_list(request)?.run().await)
    }

    pub async fn purchase(&self, request: &ListingRequest) -> Result<TransactionStatus<MarketplacePhase>, WorkflowError> {
        Ok(self.begin_purchase(request)?.run().await)
    }

    pub async fn withdraw(&self, request: &ListingRequest) -> Result<TransactionStatus<MarketplacePhase>, WorkflowError> {
        Ok(self.begin_withdraw(request)?.run().await)
    }
}
