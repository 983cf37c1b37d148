//! Swap quote module.
//!
//! # Data Flow
//! ```text
//! RawQuoteRequest (client JSON)
//!     → types.rs (validate: two distinct tokens, exactly one amount)
//!     → client.rs (POST {base}/quote/exact-input | exact-output)
//!     → Quote | None (+ one warning notice on failure)
//!     → tracker.rs (drop results superseded by a newer request)
//! ```

pub mod client;
pub mod tracker;
pub mod types;

pub use client::QuoteClient;
pub use tracker::{QuoteTicket, QuoteTracker};
pub use types::{Quote, QuoteMode, QuoteRequest, QuoteRequestError, RawQuoteRequest};
