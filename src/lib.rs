//! Chronobond: time-locked yield bond service.
//!
//! Accepts bond operations (mint, redeem, marketplace, split) over HTTP,
//! tracks each through a per-flow state machine, submits the resulting
//! transactions through a wallet bridge, and pushes progress, swap quotes
//! and notices to WebSocket clients.

// Domain
pub mod bonds;
pub mod transaction;
pub mod workflow;

// Integrations
pub mod cache;
pub mod chain;
pub mod quoting;

// Front end
pub mod http;
pub mod notices;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use workflow::Workflows;
