//! Fixed-point token amounts.
//!
//! Amounts follow the chain's `UFix64` representation: an unsigned 64-bit
//! integer of base units with 8 fractional decimal digits.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of fractional digits carried by an [`Amount`].
pub const DECIMALS: usize = 8;

const SCALE: u64 = 100_000_000;
const BPS_DENOMINATOR: u128 = 10_000;

/// Errors produced while parsing a decimal amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("'{0}' is not a decimal number")]
    Invalid(String),

    #[error("'{0}' has more than 8 decimal places")]
    TooPrecise(String),

    #[error("'{0}' is too large")]
    Overflow(String),

    #[error("amount must be greater than zero")]
    NotPositive,
}

/// A token amount in base units (1e-8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Build an amount from raw base units.
    pub const fn from_base_units(units: u64) -> Self {
        Self(units)
    }

    /// Build an amount from whole tokens.
    pub fn from_whole(tokens: u64) -> Option<Self> {
        tokens.checked_mul(SCALE).map(Self)
    }

    pub fn base_units(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Parse a decimal string and reject zero.
    pub fn parse_positive(input: &str) -> Result<Self, AmountError> {
        let amount: Amount = input.parse()?;
        if amount.is_zero() {
            return Err(AmountError::NotPositive);
        }
        Ok(amount)
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Increase the amount by `bps` basis points, rounding up.
    ///
    /// Used to turn a quoted input into a maximum the payer accepts.
    pub fn with_tolerance_bps(self, bps: u32) -> Option<Amount> {
        let scaled = u128::from(self.0) * (BPS_DENOMINATOR + u128::from(bps));
        let value = scaled.div_ceil(BPS_DENOMINATOR);
        u64::try_from(value).ok().map(Self)
    }

    /// `self * rate_bps / 10_000 * numerator / denominator`, rounded down.
    ///
    /// Returns `None` when `denominator` is zero or the result overflows.
    pub fn pro_rata_bps(self, rate_bps: u32, numerator: u64, denominator: u64) -> Option<Amount> {
        if denominator == 0 {
            return None;
        }
        let value = u128::from(self.0)
            .checked_mul(u128::from(rate_bps))?
            .checked_mul(u128::from(numerator))?
            / (BPS_DENOMINATOR * u128::from(denominator));
        u64::try_from(value).ok().map(Self)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
            return Err(AmountError::Invalid(trimmed.to_string()));
        }
        if fraction.len() > DECIMALS {
            return Err(AmountError::TooPrecise(trimmed.to_string()));
        }

        let overflow = || AmountError::Overflow(trimmed.to_string());
        let whole_units: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| overflow())?
        };
        let fraction_units: u64 = if fraction.is_empty() {
            0
        } else {
            format!("{:0<width$}", fraction, width = DECIMALS)
                .parse()
                .map_err(|_| AmountError::Invalid(trimmed.to_string()))?
        };

        whole_units
            .checked_mul(SCALE)
            .and_then(|units| units.checked_add(fraction_units))
            .map(Self)
            .ok_or_else(overflow)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:0width$}", self.0 / SCALE, self.0 % SCALE, width = DECIMALS)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Amounts arrive either as decimal strings or as plain JSON numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Text(String),
    Number(serde_json::Number),
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = match RawAmount::deserialize(deserializer)? {
            RawAmount::Text(text) => text,
            RawAmount::Number(number) => number.to_string(),
        };
        text.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_and_fraction() {
        assert_eq!("100".parse::<Amount>().unwrap().base_units(), 10_000_000_000);
        assert_eq!("0.5".parse::<Amount>().unwrap().base_units(), 50_000_000);
        assert_eq!(".25".parse::<Amount>().unwrap().base_units(), 25_000_000);
        assert_eq!("1.".parse::<Amount>().unwrap().base_units(), 100_000_000);
        assert_eq!(" 2.00000001 ".parse::<Amount>().unwrap().base_units(), 200_000_001);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!("".parse::<Amount>(), Err(AmountError::Empty));
        assert!(matches!("-1".parse::<Amount>(), Err(AmountError::Invalid(_))));
        assert!(matches!("1.2.3".parse::<Amount>(), Err(AmountError::Invalid(_))));
        assert!(matches!("abc".parse::<Amount>(), Err(AmountError::Invalid(_))));
        assert!(matches!(".".parse::<Amount>(), Err(AmountError::Invalid(_))));
        assert!(matches!("1.123456789".parse::<Amount>(), Err(AmountError::TooPrecise(_))));
        assert!(matches!("99999999999999999999".parse::<Amount>(), Err(AmountError::Overflow(_))));
    }

    #[test]
    fn test_parse_positive() {
        assert_eq!(Amount::parse_positive("0"), Err(AmountError::NotPositive));
        assert_eq!(Amount::parse_positive("0.000"), Err(AmountError::NotPositive));
        assert!(Amount::parse_positive("0.00000001").is_ok());
    }

    #[test]
    fn test_display_uses_eight_decimals() {
        let amount: Amount = "12.5".parse().unwrap();
        assert_eq!(amount.to_string(), "12.50000000");
        assert_eq!(Amount::ZERO.to_string(), "0.00000000");
    }

    #[test]
    fn test_tolerance_rounds_up() {
        let amount = Amount::from_base_units(1_000);
        assert_eq!(amount.with_tolerance_bps(50).unwrap().base_units(), 1_005);
        let odd = Amount::from_base_units(3);
        assert_eq!(odd.with_tolerance_bps(1).unwrap().base_units(), 4);
        assert_eq!(Amount::from_base_units(u64::MAX).with_tolerance_bps(100), None);
    }

    #[test]
    fn test_pro_rata() {
        let principal = Amount::from_whole(100).unwrap();
        // 10% for half a period
        let accrued = principal.pro_rata_bps(1_000, 1, 2).unwrap();
        assert_eq!(accrued, Amount::from_whole(5).unwrap());
        assert_eq!(principal.pro_rata_bps(1_000, 1, 0), None);
    }

    #[test]
    fn test_deserialize_string_or_number() {
        let from_text: Amount = serde_json::from_str("\"42.1\"").unwrap();
        let from_number: Amount = serde_json::from_str("42.1").unwrap();
        assert_eq!(from_text, from_number);
        assert_eq!(serde_json::to_string(&from_text).unwrap(), "\"42.10000000\"");
        assert!(serde_json::from_str::<Amount>("\"-3\"").is_err());
    }
}
