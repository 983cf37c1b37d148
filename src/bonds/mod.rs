//! Bond domain model.
//!
//! # Data Flow
//! ```text
//! Front-end JSON (*Request, strings)
//!     → params.rs (validate: amounts, lockup, strategy, token, address)
//!     → typed *Params
//!     → workflow orchestrator
//!
//! Chain bridge JSON
//!     → types.rs (Bond, Listing)
//!     → read cache / derived yield figures
//! ```

pub mod amount;
pub mod params;
pub mod types;

use std::time::{SystemTime, UNIX_EPOCH};

pub use amount::{Amount, AmountError};
pub use params::{
    AccountRequest, ListParams, ListRequest, ListingParams, ListingRequest, MintParams,
    MintRequest, ParamError, RedeemParams, RedeemRequest, SplitParams, SplitRequest,
};
pub use types::{Address, AddressError, Bond, Listing, LockupPeriod, RiskTier, StrategyId, StrategyInfo, Token};

/// Current unix time in seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
