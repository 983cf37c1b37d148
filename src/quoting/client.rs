//! Client for the external swap-quote backend.
//!
//! # Responsibilities
//! - Issue exactly one POST per call to the exact-input or exact-output endpoint
//! - Validate the response against the request mode
//! - Turn every failure into a transient notice and "no quote"
//!
//! The client keeps no state between calls. Debouncing and discarding
//! superseded results belong to the caller (see `tracker.rs`).

use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::bonds::unix_now;
use crate::config::SwapConfig;
use crate::net::normalize_base_url;
use crate::notices::Notices;
use crate::observability::metrics;
use crate::quoting::types::{Quote, QuoteRequest, QuoteRequestBody, QuoteResponseBody};

const UNAVAILABLE_NOTICE: &str = "Swap quote unavailable. Please try again shortly.";

#[derive(Debug, Clone)]
pub struct QuoteClient {
    client: Client,
    /// `None` when quoting is disabled.
    base_url: Option<Url>,
    timeout: Duration,
    notices: Notices,
}

impl QuoteClient {
    /// Create a client. A missing or unparsable base URL disables quoting;
    /// the latter is logged.
    pub fn new(config: &SwapConfig, notices: Notices) -> Self {
        let base_url = config
            .base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .and_then(|raw| match normalize_base_url(raw) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!(url = %raw, error = %e, "Invalid swap backend URL, quotes disabled");
                    None
                }
            });

        if base_url.is_none() {
            tracing::info!("No swap backend configured, quotes unavailable");
        }

        Self {
            client: Client::new(),
            base_url,
            timeout: Duration::from_millis(config.timeout_ms),
            notices,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.base_url.is_some()
    }

    /// Fetch a quote. Never fails: any problem yields `None`, and every
    /// problem other than "not configured" publishes one warning notice.
    pub async fn quote(&self, request: &QuoteRequest) -> Option<Quote> {
        self.quote_notifying(request, &self.notices).await
    }

    /// Like [`QuoteClient::quote`], but the failure notice goes to `notices`
    /// instead of the shared channel.
    pub async fn quote_notifying(&self, request: &QuoteRequest, notices: &Notices) -> Option<Quote> {
        let mode = request.mode();
        let Some(base_url) = &self.base_url else {
            metrics::record_quote_request(mode.as_str(), "disabled");
            return None;
        };

        match self.fetch(base_url, request).await {
            Ok(quote) => {
                metrics::record_quote_request(mode.as_str(), "ok");
                Some(quote)
            }
            Err(reason) => {
                tracing::warn!(
                    mode = mode.as_str(),
                    from = %request.from_token(),
                    to = %request.to_token(),
                    reason = %reason,
                    "Quote request failed"
                );
                metrics::record_quote_request(mode.as_str(), "error");
                notices.warn(UNAVAILABLE_NOTICE);
                None
            }
        }
    }

    async fn fetch(&self, base_url: &Url, request: &QuoteRequest) -> Result<Quote, String> {
        let url = base_url
            .join(request.mode().path())
            .map_err(|e| format!("cannot build quote URL: {}", e))?;

        let response = self
            .client
            .post(url)
            .timeout(self.timeout)
            .json(&QuoteRequestBody::from(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    format!("timed out after {:?}", self.timeout)
                } else {
                    format!("transport error: {}", e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("backend answered {}", status));
        }

        let body: QuoteResponseBody = response
            .json()
            .await
            .map_err(|e| format!("malformed body: {}", e))?;

        let now = unix_now();
        let quote = body
            .into_quote(request, now)
            .ok_or_else(|| format!("response lacks a usable amount for {}", request.mode().as_str()))?;
        if quote.is_expired(now) {
            return Err("quote already expired".to_string());
        }
        Ok(quote)
    }
}
