//! Stale-response guard for quote lookups.

use std::sync::atomic::{AtomicU64, Ordering};

/// Ticket identifying one issued quote lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct QuoteTicket(u64);

impl QuoteTicket {
    pub fn seq(self) -> u64 {
        self.0
    }
}

/// Issues increasing tickets and only accepts results for the latest one.
#[derive(Debug, Default)]
pub struct QuoteTracker {
    latest: AtomicU64,
}

impl QuoteTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supersede every earlier ticket.
    pub fn issue(&self) -> QuoteTicket {
        QuoteTicket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, ticket: QuoteTicket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }

    /// Pass `value` through only if `ticket` has not been superseded.
    pub fn accept<T>(&self, ticket: QuoteTicket, value: T) -> Option<T> {
        self.is_current(ticket).then_some(value)
    }
}
