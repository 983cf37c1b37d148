//! Swap quote request and response types.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::bonds::{Amount, AmountError, Token};

/// Which side of the swap the request fixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum QuoteMode {
    /// The amount to spend is fixed.
    ExactInput,
    /// The amount to receive is fixed.
    ExactOutput,
}

impl QuoteMode {
    /// Backend path, relative to the configured base URL.
    pub fn path(self) -> &'static str {
        match self {
            QuoteMode::ExactInput => "quote/exact-input",
            QuoteMode::ExactOutput => "quote/exact-output",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QuoteMode::ExactInput => "exact_input",
            QuoteMode::ExactOutput => "exact_output",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteRequestError {
    #[error("supply either fromTokenAmount or toTokenAmount, not both")]
    AmbiguousAmount,

    #[error("one of fromTokenAmount or toTokenAmount is required")]
    MissingAmount,

    #[error("cannot quote {0} to itself")]
    SameToken(Token),

    #[error("unsupported token '{0}'")]
    UnknownToken(String),

    #[error("invalid amount: {0}")]
    Amount(#[from] AmountError),
}

/// A validated quote request. Exactly one amount, two distinct tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    from_token: Token,
    to_token: Token,
    mode: QuoteMode,
    amount: Amount,
}

impl QuoteRequest {
    pub fn exact_input(from: Token, to: Token, amount: Amount) -> Result<Self, QuoteRequestError> {
        Self::new(from, to, QuoteMode::ExactInput, amount)
    }

    pub fn exact_output(from: Token, to: Token, amount: Amount) -> Result<Self, QuoteRequestError> {
        Self::new(from, to, QuoteMode::ExactOutput, amount)
    }

    fn new(
        from: Token,
        to: Token,
        mode: QuoteMode,
        amount: Amount,
    ) -> Result<Self, QuoteRequestError> {
        if from == to {
            return Err(QuoteRequestError::SameToken(from));
        }
        if amount.is_zero() {
            return Err(AmountError::NotPositive.into());
        }
        Ok(Self {
            from_token: from,
            to_token: to,
            mode,
            amount,
        })
    }

    pub fn from_token(&self) -> Token {
        self.from_token
    }

    pub fn to_token(&self) -> Token {
        self.to_token
    }

    pub fn mode(&self) -> QuoteMode {
        self.mode
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }
}

/// Quote request as submitted by a client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuoteRequest {
    pub from_token: String,
    pub to_token: String,
    #[serde(default)]
    pub from_token_amount: Option<String>,
    #[serde(default)]
    pub to_token_amount: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl TryFrom<RawQuoteRequest> for QuoteRequest {
    type Error = QuoteRequestError;

    /// Empty amount strings count as absent. Supplying both amounts is
    /// rejected rather than guessing which one the caller meant.
    fn try_from(raw: RawQuoteRequest) -> Result<Self, Self::Error> {
        let from: Token = raw.from_token.parse().map_err(QuoteRequestError::UnknownToken)?;
        let to: Token = raw.to_token.parse().map_err(QuoteRequestError::UnknownToken)?;
        match (present(&raw.from_token_amount), present(&raw.to_token_amount)) {
            (Some(_), Some(_)) => Err(QuoteRequestError::AmbiguousAmount),
            (None, None) => Err(QuoteRequestError::MissingAmount),
            (Some(input), None) => Self::exact_input(from, to, Amount::parse_positive(input)?),
            (None, Some(output)) => Self::exact_output(from, to, Amount::parse_positive(output)?),
        }
    }
}

/// Body posted to the quote backend.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuoteRequestBody {
    pub from_token: Token,
    pub to_token: Token,
    pub amount: Amount,
}

impl From<&QuoteRequest> for QuoteRequestBody {
    fn from(request: &QuoteRequest) -> Self {
        Self {
            from_token: request.from_token,
            to_token: request.to_token,
            amount: request.amount,
        }
    }
}

fn lenient_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPrice {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<RawPrice>::deserialize(deserializer)? {
        Some(RawPrice::Number(n)) => Some(n),
        Some(RawPrice::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

/// Body returned by the quote backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuoteResponseBody {
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: Option<f64>,
    #[serde(default)]
    pub input_amount: Option<Amount>,
    #[serde(default)]
    pub output_amount: Option<Amount>,
    #[serde(default)]
    pub slippage_bps: Option<u32>,
    #[serde(default)]
    pub expires_at: Option<u64>,
}

impl QuoteResponseBody {
    /// Pair the body with its request. `None` when the amount the request
    /// mode asks for is missing or zero.
    pub fn into_quote(self, request: &QuoteRequest, fetched_at: u64) -> Option<Quote> {
        let (input_amount, output_amount) = match request.mode {
            QuoteMode::ExactOutput => (self.input_amount?, request.amount),
            QuoteMode::ExactInput => (request.amount, self.output_amount?),
        };
        if input_amount.is_zero() || output_amount.is_zero() {
            return None;
        }
        Some(Quote {
            request: request.clone(),
            input_amount,
            output_amount,
            price: self.price,
            slippage_bps: self.slippage_bps,
            expires_at: self.expires_at,
            fetched_at,
        })
    }
}

/// A quote paired with the request that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub request: QuoteRequest,
    /// Amount of `from_token` spent.
    pub input_amount: Amount,
    /// Amount of `to_token` received.
    pub output_amount: Amount,
    pub price: Option<f64>,
    pub slippage_bps: Option<u32>,
    /// Unix seconds.
    pub expires_at: Option<u64>,
    /// Unix seconds.
    pub fetched_at: u64,
}

impl Quote {
    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }

    /// Quoted input plus slippage tolerance; the most the payer accepts.
    pub fn max_input(&self, default_slippage_bps: u32) -> Option<Amount> {
        self.input_amount
            .with_tolerance_bps(self.slippage_bps.unwrap_or(default_slippage_bps))
    }
}
