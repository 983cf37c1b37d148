//! Wallet bridge client with timeout and failover handling.
//!
//! # Responsibilities
//! - Talk JSON to the wallet bridge that fronts the chain SDK
//! - Fail over across bridge endpoints for reads
//! - Send writes to the primary endpoint only (submissions are not idempotent)
//! - Poll transaction results until finality

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::time::timeout;
use url::Url;

use crate::bonds::{Address, Bond, Listing};
use crate::chain::finality::wait_for_finality;
use crate::chain::gateway::ChainGateway;
use crate::chain::types::{
    ChainError, ChainOperation, ChainResult, FinalityOutcome, TransactionResult, TxId,
};
use crate::config::ChainConfig;
use crate::net::normalize_base_url;
use crate::observability::metrics;

/// Error code the bridge uses when the user declines to sign.
const USER_REJECTED_CODE: &str = "USER_REJECTED";

#[derive(Deserialize)]
struct SetupStatus {
    ready: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Submitted {
    transaction_id: String,
}

#[derive(Serialize)]
struct SubmitBody<'a> {
    account: &'a Address,
    #[serde(flatten)]
    operation: &'a ChainOperation,
}

#[derive(Deserialize, Default)]
struct BridgeErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    code: Option<String>,
}

/// Map a non-success bridge response to a chain error.
fn error_from_response(status: StatusCode, body: &str) -> ChainError {
    let parsed: BridgeErrorBody = serde_json::from_str(body).unwrap_or_default();
    if parsed.code.as_deref() == Some(USER_REJECTED_CODE) {
        return ChainError::UserRejected;
    }
    let message = if parsed.error.is_empty() {
        status.to_string()
    } else {
        parsed.error
    };
    if status.is_server_error() {
        ChainError::Transport(message)
    } else {
        ChainError::Rejected(message)
    }
}

fn fails_over(error: &ChainError) -> bool {
    matches!(error, ChainError::Transport(_) | ChainError::Timeout(_))
}

/// HTTP implementation of [`ChainGateway`].
#[derive(Clone)]
pub struct HttpChainGateway {
    client: Client,
    /// Primary first, then failovers.
    endpoints: Vec<Url>,
    timeout_duration: Duration,
    finality_timeout: Duration,
    poll_interval: Duration,
}

impl HttpChainGateway {
    /// Create a new gateway.
    ///
    /// An invalid primary URL is an error; invalid failover URLs are
    /// logged and skipped.
    pub fn new(config: &ChainConfig) -> ChainResult<Self> {
        let primary = normalize_base_url(&config.bridge_url).map_err(|e| {
            ChainError::NotAvailable(format!("invalid bridge URL '{}': {}", config.bridge_url, e))
        })?;
        let mut endpoints = vec![primary];

        for url_str in &config.failover_urls {
            match normalize_base_url(url_str) {
                Ok(url) => endpoints.push(url),
                Err(e) => {
                    tracing::warn!(url = %url_str, error = %e, "Ignoring invalid failover bridge URL")
                }
            }
        }

        tracing::info!(
            bridge_url = %config.bridge_url,
            failovers = endpoints.len() - 1,
            "Chain gateway initialized"
        );

        Ok(Self {
            client: Client::new(),
            endpoints,
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
            finality_timeout: Duration::from_secs(config.finality_timeout_secs),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        })
    }

    fn endpoint(base: &Url, path: &str) -> ChainResult<Url> {
        base.join(path)
            .map_err(|e| ChainError::Transport(format!("cannot build URL for '{}': {}", path, e)))
    }

    async fn exchange<T: DeserializeOwned>(request: RequestBuilder) -> ChainResult<T> {
        let response = request
            .send()
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ChainError::InvalidResponse(e.to_string()));
        }
        let body = response.text().await.unwrap_or_default();
        Err(error_from_response(status, &body))
    }

    /// GET with failover across endpoints.
    async fn get_json<T: DeserializeOwned>(&self, call: &'static str, path: &str) -> ChainResult<T> {
        let start = Instant::now();
        let mut last_error = ChainError::NotAvailable("no bridge endpoints configured".into());

        for (i, base) in self.endpoints.iter().enumerate() {
            let url = Self::endpoint(base, path)?;
            let request = self.client.get(url);
            match timeout(self.timeout_duration, Self::exchange::<T>(request)).await {
                Ok(Ok(value)) => {
                    metrics::record_chain_call(call, "ok", start);
                    return Ok(value);
                }
                Ok(Err(e)) if fails_over(&e) => {
                    tracing::warn!(provider_idx = i, call, error = %e, "Bridge error, trying next endpoint");
                    last_error = e;
                }
                Ok(Err(e)) => {
                    metrics::record_chain_call(call, "error", start);
                    return Err(e);
                }
                Err(_) => {
                    tracing::warn!(provider_idx = i, call, "Bridge timeout, trying next endpoint");
                    last_error = ChainError::Timeout(self.timeout_duration.as_secs());
                }
            }
        }

        metrics::record_chain_call(call, "error", start);
        Err(last_error)
    }

    /// POST to the primary endpoint only.
    async fn post_json<B, T>(&self, call: &'static str, path: &str, body: &B) -> ChainResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let start = Instant::now();
        let url = Self::endpoint(&self.endpoints[0], path)?;
        let request = self.client.post(url).json(body);
        let result = match timeout(self.timeout_duration, Self::exchange::<T>(request)).await {
            Ok(result) => result,
            Err(_) => Err(ChainError::Timeout(self.timeout_duration.as_secs())),
        };
        let outcome = if result.is_ok() { "ok" } else { "error" };
        metrics::record_chain_call(call, outcome, start);
        result
    }

    fn tx_id(submitted: Submitted) -> ChainResult<TxId> {
        if submitted.transaction_id.trim().is_empty() {
            return Err(ChainError::InvalidResponse("empty transaction id".into()));
        }
        Ok(TxId::new(submitted.transaction_id))
    }

    /// Current result of a submitted transaction.
    pub async fn transaction_result(&self, tx_id: &TxId) -> ChainResult<TransactionResult> {
        self.get_json("transaction_result", &format!("transactions/{}", tx_id))
            .await
    }
}

#[async_trait]
impl ChainGateway for HttpChainGateway {
    async fn check_account_setup(&self, account: &Address) -> ChainResult<bool> {
        let status: SetupStatus = self
            .get_json("check_account_setup", &format!("accounts/{}/setup", account))
            .await?;
        Ok(status.ready)
    }

    async fn submit_setup_transaction(&self, account: &Address) -> ChainResult<TxId> {
        let submitted: Submitted = self
            .post_json(
                "submit_setup_transaction",
                &format!("accounts/{}/setup", account),
                &serde_json::json!({}),
            )
            .await?;
        Self::tx_id(submitted)
    }

    async fn submit_transaction(
        &self,
        account: &Address,
        operation: &ChainOperation,
    ) -> ChainResult<TxId> {
        let body = SubmitBody { account, operation };
        let submitted: Submitted = self
            .post_json("submit_transaction", "transactions", &body)
            .await?;
        let tx_id = Self::tx_id(submitted)?;
        tracing::info!(
            account = %account,
            operation = operation.name(),
            tx_id = %tx_id,
            "Transaction submitted"
        );
        Ok(tx_id)
    }

    async fn await_finalization(&self, tx_id: &TxId) -> ChainResult<FinalityOutcome> {
        wait_for_finality(
            tx_id,
            || self.transaction_result(tx_id),
            self.poll_interval,
            self.finality_timeout,
        )
        .await
    }

    async fn query_user_bonds(&self, account: &Address) -> ChainResult<Vec<Bond>> {
        self.get_json("query_user_bonds", &format!("accounts/{}/bonds", account))
            .await
    }

    async fn query_listings(&self) -> ChainResult<Vec<Listing>> {
        self.get_json("query_listings", "listings").await
    }
}
