//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Logging/metrics → Gateway, quotes, workflows → Listener
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C → trigger → server stops accepting → in-flight requests drain → Exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
