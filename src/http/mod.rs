//! HTTP and WebSocket front end.
//!
//! # Data Flow
//! ```text
//! request
//!     → server.rs (request ID, trace span, timeout)
//!     → workflow.rs  POST writes → 202 + initial status, chain work spawned
//!     → status.rs    GET/DELETE per-operation status
//!     → views.rs     strategies, bonds, listings (read cache)
//!     → quote.rs     one-shot quote
//!     → websocket.rs status + notice push, debounced quotes
//!     → error.rs     ApiError → {"error", "code"}
//! ```

pub mod error;
pub mod quote;
pub mod server;
pub mod status;
pub mod views;
pub mod websocket;
pub mod workflow;

pub use error::ApiError;
pub use server::{AppState, HttpServer};
