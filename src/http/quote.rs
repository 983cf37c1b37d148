use axum::{extract::State, Json};

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::quoting::{Quote, QuoteRequest, RawQuoteRequest};

/// One-shot quote lookup. Callers that type amounts should prefer the
/// debounced WebSocket path.
pub async fn create_quote(
    State(state): State<AppState>,
    Json(raw): Json<RawQuoteRequest>,
) -> Result<Json<Quote>, ApiError> {
    let request = QuoteRequest::try_from(raw)?;
    let quotes = state.workflows.quotes();
    if !quotes.is_enabled() {
        return Err(ApiError::QuoteUnavailable("Swap quotes are not configured".into()));
    }
    quotes
        .quote(&request)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::QuoteUnavailable("Swap quote unavailable".into()))
}
