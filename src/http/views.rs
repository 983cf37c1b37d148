//! Read endpoints: strategies, bonds, listings.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::bonds::{unix_now, Address, Amount, Bond, Listing, LockupPeriod, StrategyId, StrategyInfo};
use crate::http::error::ApiError;
use crate::http::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RefreshQuery {
    /// Bypass the cache.
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategiesView {
    strategies: Vec<StrategyInfo>,
    lockup_days: [u32; 4],
}

pub async fn strategies() -> Json<StrategiesView> {
    Json(StrategiesView {
        strategies: StrategyId::ALL.iter().map(|s| s.info()).collect(),
        lockup_days: LockupPeriod::ALLOWED_DAYS,
    })
}

/// A bond plus the figures derived from it at response time.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BondView {
    #[serde(flatten)]
    bond: Bond,
    accrued_yield: Amount,
    value_at_maturity: Option<Amount>,
    redeemable: bool,
}

impl BondView {
    fn new(bond: Bond, now: u64) -> Self {
        Self {
            accrued_yield: bond.accrued_yield(now),
            value_at_maturity: bond.value_at_maturity(),
            redeemable: bond.is_matured(now),
            bond,
        }
    }
}

pub async fn account_bonds(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<RefreshQuery>,
) -> Result<Json<Vec<BondView>>, ApiError> {
    let account: Address = address.parse()?;
    let cache = state.workflows.cache();
    let bonds = if query.refresh {
        cache.refresh_bonds(&account).await?
    } else {
        cache.bonds(&account).await?
    };
    let now = unix_now();
    Ok(Json(bonds.into_iter().map(|bond| BondView::new(bond, now)).collect()))
}

pub async fn listings(
    State(state): State<AppState>,
    Query(query): Query<RefreshQuery>,
) -> Result<Json<Vec<Listing>>, ApiError> {
    let cache = state.workflows.cache();
    let listings = if query.refresh {
        cache.refresh_listings().await?
    } else {
        cache.listings().await?
    };
    Ok(Json(listings))
}
