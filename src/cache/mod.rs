//! Read cache for bonds and marketplace listings.
//!
//! # Data Flow
//! ```text
//! GET bonds / listings
//!     → cached copy if present
//!     → otherwise ChainGateway query, stored wholesale
//!
//! after a write (success or failure)
//!     → spawn_refresh(target) re-queries and replaces the cached list
//! ```
//!
//! # Design Decisions
//! - Lists are replaced, never patched
//! - Background refresh failures are logged only

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::bonds::{unix_now, Address, Bond, Listing};
use crate::chain::{ChainGateway, ChainResult};

/// What to re-read after a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshTarget {
    Bonds(Address),
    Listings,
    BondsAndListings(Address),
}

#[derive(Debug, Clone)]
struct Cached<T> {
    items: Vec<T>,
    refreshed_at: u64,
}

/// Shared, cheaply cloneable cache.
#[derive(Clone)]
pub struct ReadCache {
    gateway: Arc<dyn ChainGateway>,
    bonds: Arc<DashMap<Address, Cached<Bond>>>,
    listings: Arc<RwLock<Option<Cached<Listing>>>>,
}

impl ReadCache {
    pub fn new(gateway: Arc<dyn ChainGateway>) -> Self {
        Self {
            gateway,
            bonds: Arc::new(DashMap::new()),
            listings: Arc::new(RwLock::new(None)),
        }
    }

    /// Bonds of `account`, querying the chain on a miss.
    pub async fn bonds(&self, account: &Address) -> ChainResult<Vec<Bond>> {
        if let Some(cached) = self.bonds.get(account) {
            return Ok(cached.items.clone());
        }
        self.refresh_bonds(account).await
    }

    pub async fn refresh_bonds(&self, account: &Address) -> ChainResult<Vec<Bond>> {
        let bonds = self.gateway.query_user_bonds(account).await?;
        self.bonds.insert(
            account.clone(),
            Cached {
                items: bonds.clone(),
                refreshed_at: unix_now(),
            },
        );
        tracing::debug!(account = %account, count = bonds.len(), "Bonds refreshed");
        Ok(bonds)
    }

    pub async fn listings(&self) -> ChainResult<Vec<Listing>> {
        if let Some(cached) = self.listings.read().await.as_ref() {
            return Ok(cached.items.clone());
        }
        self.refresh_listings().await
    }

    pub async fn refresh_listings(&self) -> ChainResult<Vec<Listing>> {
        let listings = self.gateway.query_listings().await?;
        *self.listings.write().await = Some(Cached {
            items: listings.clone(),
            refreshed_at: unix_now(),
        });
        tracing::debug!(count = listings.len(), "Listings refreshed");
        Ok(listings)
    }

    /// Unix time of the last bonds refresh for `account`.
    pub fn bonds_refreshed_at(&self, account: &Address) -> Option<u64> {
        self.bonds.get(account).map(|cached| cached.refreshed_at)
    }

    pub async fn listings_refreshed_at(&self) -> Option<u64> {
        self.listings.read().await.as_ref().map(|cached| cached.refreshed_at)
    }

    /// Fire-and-forget refresh.
    pub fn spawn_refresh(&self, target: RefreshTarget) -> tokio::task::JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let (account, listings) = match target {
                RefreshTarget::Bonds(account) => (Some(account), false),
                RefreshTarget::Listings => (None, true),
                RefreshTarget::BondsAndListings(account) => (Some(account), true),
            };
            if let Some(account) = account {
                if let Err(e) = cache.refresh_bonds(&account).await {
                    tracing::warn!(account = %account, error = %e, "Bond refresh failed");
                }
            }
            if listings {
                if let Err(e) = cache.refresh_listings().await {
                    tracing::warn!(error = %e, "Listing refresh failed");
                }
            }
        })
    }
}
