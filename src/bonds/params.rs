//! Operation parameters.
//!
//! Each `*Request` is the raw shape submitted by the front-end. `validate()`
//! turns it into typed params; nothing reaches the chain gateway unless this
//! step succeeded.

use serde::Deserialize;
use thiserror::Error;

use crate::bonds::amount::{Amount, AmountError};
use crate::bonds::types::{Address, AddressError, LockupPeriod, StrategyId, Token};

/// Local validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("invalid {field}: {source}")]
    Amount {
        field: &'static str,
        #[source]
        source: AmountError,
    },

    #[error("invalid account: {0}")]
    Account(#[from] AddressError),

    #[error("unsupported lockup period of {0} days (allowed: 30, 90, 180, 365)")]
    Lockup(u32),

    #[error("unknown yield strategy '{0}'")]
    UnknownStrategy(String),

    #[error("unsupported payment token '{0}'")]
    UnknownToken(String),
}

fn positive(field: &'static str, value: &str) -> Result<Amount, ParamError> {
    Amount::parse_positive(value).map_err(|source| ParamError::Amount { field, source })
}

/// Raw mint request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintRequest {
    pub account: String,
    pub amount: String,
    pub lockup_period: u32,
    #[serde(rename = "strategyID")]
    pub strategy_id: String,
    #[serde(default)]
    pub payment_token: Option<String>,
}

/// Validated mint parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintParams {
    pub account: Address,
    pub amount: Amount,
    pub lockup: LockupPeriod,
    pub strategy: StrategyId,
    pub payment: Token,
}

impl MintRequest {
    pub fn validate(&self) -> Result<MintParams, ParamError> {
        let account = self.account.parse()?;
        let amount = positive("amount", &self.amount)?;
        let lockup = LockupPeriod::try_from(self.lockup_period).map_err(ParamError::Lockup)?;
        let strategy = self
            .strategy_id
            .parse()
            .map_err(ParamError::UnknownStrategy)?;
        let payment = match self.payment_token.as_deref().map(str::trim) {
            None | Some("") => Token::Flow,
            Some(symbol) => symbol.parse().map_err(ParamError::UnknownToken)?,
        };
        Ok(MintParams {
            account,
            amount,
            lockup,
            strategy,
            payment,
        })
    }
}

/// Raw redeem request for a single bond.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemRequest {
    pub account: String,
    pub bond_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedeemParams {
    pub account: Address,
    pub bond_id: u64,
}

impl RedeemRequest {
    pub fn validate(&self) -> Result<RedeemParams, ParamError> {
        Ok(RedeemParams {
            account: self.account.parse()?,
            bond_id: self.bond_id,
        })
    }
}

/// Raw request naming only an account (redeem-all).
#[derive(Debug, Clone, Deserialize)]
pub struct AccountRequest {
    pub account: String,
}

impl AccountRequest {
    pub fn validate(&self) -> Result<Address, ParamError> {
        Ok(self.account.parse()?)
    }
}

/// Raw request to list a bond on the marketplace.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest {
    pub account: String,
    pub bond_id: u64,
    pub price: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub account: Address,
    pub bond_id: u64,
    pub price: Amount,
}

impl ListRequest {
    pub fn validate(&self) -> Result<ListParams, ParamError> {
        Ok(ListParams {
            account: self.account.parse()?,
            bond_id: self.bond_id,
            price: positive("price", &self.price)?,
        })
    }
}

/// Raw purchase or withdraw request for an existing listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRequest {
    pub account: String,
    pub listing_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingParams {
    pub account: Address,
    pub listing_id: u64,
}

impl ListingRequest {
    pub fn validate(&self) -> Result<ListingParams, ParamError> {
        Ok(ListingParams {
            account: self.account.parse()?,
            listing_id: self.listing_id,
        })
    }
}

/// Raw request to split part of a bond's principal into a new bond.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitRequest {
    pub account: String,
    pub bond_id: u64,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitParams {
    pub account: Address,
    pub bond_id: u64,
    pub amount: Amount,
}

impl SplitRequest {
    pub fn validate(&self) -> Result<SplitParams, ParamError> {
        Ok(SplitParams {
            account: self.account.parse()?,
            bond_id: self.bond_id,
            amount: positive("amount", &self.amount)?,
        })
    }
}
