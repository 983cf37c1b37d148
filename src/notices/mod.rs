//! Transient user-facing notices.
//!
//! Notices are fire-and-forget: published on a broadcast channel, forwarded
//! to connected WebSocket clients, and dismissed client-side by id or when
//! their TTL lapses. Nothing is stored.
//!
//! The process-wide channel reaches every client. A notice caused by one
//! client's request goes on that client's own channel from [`Notices::detached`].

use serde::Serialize;
use std::time::Duration;
use tokio::sync::broadcast;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// A dismissible message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub id: Uuid,
    pub level: NoticeLevel,
    pub message: String,
    pub ttl_ms: u64,
}

/// Publisher for [`Notice`]s.
#[derive(Debug, Clone)]
pub struct Notices {
    tx: broadcast::Sender<Notice>,
    capacity: usize,
    ttl: Duration,
}

impl Notices {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = capacity.max(1);
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity, ttl }
    }

    /// A new, unconnected channel with the same capacity and TTL.
    pub fn detached(&self) -> Notices {
        Notices::new(self.capacity, self.ttl)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    /// Publish a warning and return it. Having no subscribers is fine.
    pub fn warn(&self, message: impl Into<String>) -> Notice {
        self.publish(NoticeLevel::Warning, message.into())
    }

    pub fn info(&self, message: impl Into<String>) -> Notice {
        self.publish(NoticeLevel::Info, message.into())
    }

    fn publish(&self, level: NoticeLevel, message: String) -> Notice {
        let notice = Notice {
            id: Uuid::new_v4(),
            level,
            message,
            ttl_ms: self.ttl.as_millis() as u64,
        };
        let _ = self.tx.send(notice.clone());
        notice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_notice() {
        let notices = Notices::new(8, Duration::from_secs(5));
        let mut rx = notices.subscribe();
        let sent = notices.warn("Swap quote unavailable");
        let received = rx.recv().await.unwrap();
        assert_eq!(received, sent);
        assert_eq!(received.level, NoticeLevel::Warning);
        assert_eq!(received.ttl_ms, 5_000);
    }

    #[tokio::test]
    async fn test_detached_channel_is_separate() {
        let shared = Notices::new(4, Duration::from_secs(2));
        let mut shared_rx = shared.subscribe();
        let session = shared.detached();
        let mut session_rx = session.subscribe();

        let sent = session.warn("only for this client");
        assert_eq!(session_rx.recv().await.unwrap(), sent);
        assert_eq!(sent.ttl_ms, 2_000);
        assert!(shared_rx.try_recv().is_err());
    }

    #[test]
    fn test_publish_without_subscribers() {
        let notices = Notices::new(1, Duration::from_millis(100));
        let a = notices.info("hello");
        let b = notices.info("hello");
        assert_ne!(a.id, b.id);
    }
}
