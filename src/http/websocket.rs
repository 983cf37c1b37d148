//! WebSocket push channel.
//!
//! # Data Flow
//! ```text
//! connect → one `status` message per non-idle operation
//!
//! EventBus ──────────┐
//! shared Notices ────┤
//! session Notices ───┼──→ send task ──→ client
//! quote results ─────┘
//!
//! client {"type":"quote",...}
//!     → wait debounce window
//!     → still the latest request? otherwise dropped
//!     → QuoteClient::quote
//!     → still the latest request? otherwise dropped
//!     → {"type":"quote","seq":n,"quote":{...}|null}
//! ```
//!
//! # Design Decisions
//! - Status and notice broadcasts are shared by every connection
//! - Quote debouncing is per connection; each connection has its own tracker
//! - Quote failure notices go only to the connection that asked
//! - A lagging receiver skips missed broadcasts instead of disconnecting

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

use crate::http::server::AppState;
use crate::notices::{Notice, Notices};
use crate::quoting::{Quote, QuoteClient, QuoteRequest, QuoteTracker, RawQuoteRequest};
use crate::transaction::StatusSnapshot;

/// Messages accepted from the client.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    Quote(RawQuoteRequest),
}

/// Messages pushed to the client.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    Status(StatusSnapshot),
    Notice(Notice),
    Quote { seq: u64, quote: Option<Quote> },
    Error { message: String },
}

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before the initial snapshot so no change falls in between.
    let mut status_rx = state.workflows.events().subscribe();
    let mut notice_rx = state.notices.subscribe();
    let session_notices = state.notices.detached();
    let mut session_notice_rx = session_notices.subscribe();
    let (out_tx, mut out_rx) = mpsc::channel::<ServerMessage>(32);

    tracing::debug!("WebSocket client connected");

    for snapshot in state.workflows.snapshots() {
        if send(&mut sender, &ServerMessage::Status(snapshot)).await.is_err() {
            return;
        }
    }

    let mut send_task = tokio::spawn(async move {
        loop {
            let message = tokio::select! {
                status = status_rx.recv() => match status {
                    Ok(snapshot) => ServerMessage::Status(snapshot),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "WebSocket client lagging on status events");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                notice = notice_rx.recv() => match notice {
                    Ok(notice) => ServerMessage::Notice(notice),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                notice = session_notice_rx.recv() => match notice {
                    Ok(notice) => ServerMessage::Notice(notice),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                outgoing = out_rx.recv() => match outgoing {
                    Some(message) => message,
                    None => break,
                },
            };
            if send(&mut sender, &message).await.is_err() {
                break;
            }
        }
    });

    let quotes = state.workflows.quotes().clone();
    let debounce = Duration::from_millis(state.config.swap.debounce_ms);
    let tracker = Arc::new(QuoteTracker::new());

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            match message {
                Message::Text(text) => match serde_json::from_str::<ClientMessage>(text.as_str()) {
                    Ok(ClientMessage::Quote(raw)) => {
                        spawn_quote(
                            raw,
                            quotes.clone(),
                            session_notices.clone(),
                            tracker.clone(),
                            debounce,
                            out_tx.clone(),
                        );
                    }
                    Err(e) => {
                        let _ = out_tx
                            .send(ServerMessage::Error {
                                message: format!("invalid message: {}", e),
                            })
                            .await;
                    }
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    tracing::debug!("WebSocket client disconnected");
}

/// Run one debounced quote lookup. Results of superseded requests are
/// dropped silently.
fn spawn_quote(
    raw: RawQuoteRequest,
    quotes: QuoteClient,
    notices: Notices,
    tracker: Arc<QuoteTracker>,
    debounce: Duration,
    out: mpsc::Sender<ServerMessage>,
) {
    let ticket = tracker.issue();
    tokio::spawn(async move {
        tokio::time::sleep(debounce).await;
        if !tracker.is_current(ticket) {
            return;
        }

        let request = match QuoteRequest::try_from(raw) {
            Ok(request) => request,
            Err(e) => {
                let _ = out.send(ServerMessage::Error { message: e.to_string() }).await;
                return;
            }
        };

        let quote = quotes.quote_notifying(&request, &notices).await;
        if let Some(quote) = tracker.accept(ticket, quote) {
            let _ = out
                .send(ServerMessage::Quote {
                    seq: ticket.seq(),
                    quote,
                })
                .await;
        }
    });
}

async fn send(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize WebSocket message");
            return Ok(());
        }
    };
    sender.send(Message::Text(json.into())).await
}
