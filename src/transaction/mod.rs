//! Transaction state machine.
//!
//! # Data Flow
//! ```text
//! workflow begins
//!     → board.rs  try_begin(key, first phase)   (Busy if key in flight)
//!     → FlowHandle advance / record_tx_id        (status.rs enforces rules)
//!     → FlowHandle succeed | fail                (key released)
//!     → events.rs StatusSnapshot broadcast       (→ WebSocket clients)
//!
//! Stage lifecycle (phase.rs):
//!     Idle → PreCheck → Setup → Submitting → Success | Error
//!            (each step optional, never backwards)
//! ```
//!
//! # Design Decisions
//! - Phase names are per flow; legality is checked on the shared stages
//! - A dropped handle turns an in-flight status into an error

pub mod board;
pub mod events;
pub mod phase;
pub mod status;

pub use board::{FlowHandle, StatusBoard};
pub use events::{EventBus, StatusSnapshot};
pub use phase::{FlowKind, HoldingsPhase, MarketplacePhase, MintPhase, Phase, RedeemPhase, Stage};
pub use status::{TransactionStatus, TransitionError};
