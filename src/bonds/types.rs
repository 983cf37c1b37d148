//! Bond domain types shared by the workflows, the chain gateway and the API.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::bonds::amount::Amount;

const SECONDS_PER_DAY: u64 = 24 * 3600;
const DAYS_PER_YEAR: u64 = 365;

/// Error for malformed account addresses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a 0x-prefixed 16 digit hex address")]
pub struct AddressError(pub String);

/// An on-chain account address (`0x` + 16 hex digits), stored lower-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| AddressError(trimmed.to_string()))?;
        if hex.len() != 16 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(AddressError(trimmed.to_string()));
        }
        Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two tokens the platform accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Token {
    #[serde(rename = "FLOW")]
    Flow,
    #[serde(rename = "USDC")]
    Usdc,
}

impl Token {
    pub fn symbol(self) -> &'static str {
        match self {
            Token::Flow => "FLOW",
            Token::Usdc => "USDC",
        }
    }
}

impl FromStr for Token {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_uppercase().as_str() {
            "FLOW" => Ok(Token::Flow),
            "USDC" => Ok(Token::Usdc),
            _ => Err(input.to_string()),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Risk tier of a yield strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

/// Known yield strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyId {
    Conservative,
    Balanced,
    Aggressive,
}

/// Published description of a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyInfo {
    pub id: StrategyId,
    pub expected_apy_bps: u32,
    pub risk: RiskTier,
}

impl StrategyId {
    pub const ALL: [StrategyId; 3] = [
        StrategyId::Conservative,
        StrategyId::Balanced,
        StrategyId::Aggressive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyId::Conservative => "Conservative",
            StrategyId::Balanced => "Balanced",
            StrategyId::Aggressive => "Aggressive",
        }
    }

    pub fn info(self) -> StrategyInfo {
        let (expected_apy_bps, risk) = match self {
            StrategyId::Conservative => (500, RiskTier::Low),
            StrategyId::Balanced => (800, RiskTier::Medium),
            StrategyId::Aggressive => (1_200, RiskTier::High),
        };
        StrategyInfo {
            id: self,
            expected_apy_bps,
            risk,
        }
    }
}

impl FromStr for StrategyId {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let wanted = input.trim();
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| wanted.to_string())
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lock-up duration in days, restricted to [`LockupPeriod::ALLOWED_DAYS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct LockupPeriod(u32);

impl LockupPeriod {
    pub const ALLOWED_DAYS: [u32; 4] = [30, 90, 180, 365];

    pub fn days(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for LockupPeriod {
    type Error = u32;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        if Self::ALLOWED_DAYS.contains(&days) {
            Ok(Self(days))
        } else {
            Err(days)
        }
    }
}

/// A bond held by an account, as reported by the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bond {
    pub id: u64,
    pub owner: Address,
    pub principal: Amount,
    pub strategy: StrategyId,
    pub apy_bps: u32,
    pub lockup_days: u32,
    /// Unix seconds.
    pub created_at: u64,
    /// Unix seconds.
    pub maturity: u64,
}

impl Bond {
    pub fn is_matured(&self, now: u64) -> bool {
        now >= self.maturity
    }

    /// Simple interest accrued so far, capped at the lock-up period.
    pub fn accrued_yield(&self, now: u64) -> Amount {
        let lockup_secs = u64::from(self.lockup_days) * SECONDS_PER_DAY;
        let elapsed = now.saturating_sub(self.created_at).min(lockup_secs);
        self.principal
            .pro_rata_bps(self.apy_bps, elapsed, DAYS_PER_YEAR * SECONDS_PER_DAY)
            .unwrap_or(Amount::ZERO)
    }

    /// Principal plus the full yield of the lock-up period.
    pub fn value_at_maturity(&self) -> Option<Amount> {
        let full_yield = self.principal.pro_rata_bps(
            self.apy_bps,
            u64::from(self.lockup_days),
            DAYS_PER_YEAR,
        )?;
        self.principal.checked_add(full_yield)
    }
}

/// A marketplace offer to sell a bond.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: u64,
    pub bond_id: u64,
    pub seller: Address,
    pub price: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bond: Option<Bond>,
}
