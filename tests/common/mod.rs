//! Shared utilities for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use chronobond::bonds::{Address, Amount, Bond, Listing, StrategyId};
use chronobond::chain::{ChainError, ChainGateway, ChainOperation, ChainResult, FinalityOutcome, TxId};

/// A request as seen by a mock backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

pub type Recorded = Arc<Mutex<Vec<RecordedRequest>>>;

/// An address nothing listens on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Start a programmable mock backend on an ephemeral port. Every request is
/// recorded, then answered with whatever `f` returns.
pub async fn start_programmable_backend<F, Fut>(f: F) -> (SocketAddr, Recorded)
where
    F: Fn(RecordedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let recorded: Recorded = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let log = recorded.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    let log = log.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        log.lock().unwrap().push(request.clone());
                        let (status, body) = f(request).await;
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            404 => "404 Not Found",
                            422 => "422 Unprocessable Entity",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, recorded)
}

/// Start a backend that always answers with the same status and body.
pub async fn start_mock_backend(status: u16, body: &'static str) -> (SocketAddr, Recorded) {
    start_programmable_backend(move |_| async move { (status, body.to_string()) }).await
}

async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    Some(RecordedRequest { method, path, body })
}

pub fn address(hex_tail: u8) -> Address {
    format!("0x{:016x}", hex_tail).parse().unwrap()
}

pub fn bond(id: u64, owner: &Address, maturity: u64) -> Bond {
    Bond {
        id,
        owner: owner.clone(),
        principal: Amount::from_whole(100).unwrap(),
        strategy: StrategyId::Balanced,
        apy_bps: 800,
        lockup_days: 30,
        created_at: maturity.saturating_sub(30 * 86_400),
        maturity,
    }
}

/// In-memory gateway with scripted answers.
///
/// Every submission gets a fresh `tx-N` id. Finality outcomes are looked up
/// by the operation that produced the transaction, so concurrent flows get
/// deterministic results regardless of ordering.
#[derive(Default)]
pub struct ScriptedGateway {
    pub setup_ready: Mutex<bool>,
    /// Error returned by the next `check_account_setup`.
    pub setup_check_error: Mutex<Option<ChainError>>,
    /// Error returned by the next `submit_setup_transaction`.
    pub setup_submit_error: Mutex<Option<ChainError>>,
    /// Finality of setup transactions; seals when unset.
    pub setup_outcome: Mutex<Option<FinalityOutcome>>,
    /// Error returned by the next `query_user_bonds`.
    pub bond_query_error: Mutex<Option<ChainError>>,
    pub bond_queries: Mutex<u32>,
    pub bonds: Mutex<Vec<Bond>>,
    pub listings: Mutex<Vec<Listing>>,
    /// Errors returned by `submit_transaction`, consumed in order.
    pub submit_errors: Mutex<VecDeque<ChainError>>,
    /// Finality outcome per redeemed bond id; anything else seals.
    pub redeem_outcomes: Mutex<HashMap<u64, FinalityOutcome>>,
    /// Delay before finality resolves.
    pub finality_delay: Mutex<Duration>,
    pub submitted: Mutex<Vec<ChainOperation>>,
    pub setup_submissions: Mutex<u32>,
    next_tx: Mutex<u64>,
    tx_operations: Mutex<HashMap<String, Option<ChainOperation>>>,
}

impl ScriptedGateway {
    pub fn new() -> Arc<Self> {
        let gateway = Self::default();
        *gateway.setup_ready.lock().unwrap() = true;
        Arc::new(gateway)
    }

    fn next_tx(&self, operation: Option<ChainOperation>) -> TxId {
        let mut next = self.next_tx.lock().unwrap();
        *next += 1;
        let tx_id = format!("tx-{}", *next);
        self.tx_operations.lock().unwrap().insert(tx_id.clone(), operation);
        TxId::new(tx_id)
    }

    pub fn submitted(&self) -> Vec<ChainOperation> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainGateway for ScriptedGateway {
    async fn check_account_setup(&self, _account: &Address) -> ChainResult<bool> {
        if let Some(error) = self.setup_check_error.lock().unwrap().take() {
            return Err(error);
        }
        Ok(*self.setup_ready.lock().unwrap())
    }

    async fn submit_setup_transaction(&self, _account: &Address) -> ChainResult<TxId> {
        if let Some(error) = self.setup_submit_error.lock().unwrap().take() {
            return Err(error);
        }
        *self.setup_submissions.lock().unwrap() += 1;
        Ok(self.next_tx(None))
    }

    async fn submit_transaction(
        &self,
        _account: &Address,
        operation: &ChainOperation,
    ) -> ChainResult<TxId> {
        if let Some(error) = self.submit_errors.lock().unwrap().pop_front() {
            return Err(error);
        }
        self.submitted.lock().unwrap().push(operation.clone());
        Ok(self.next_tx(Some(operation.clone())))
    }

    async fn await_finalization(&self, tx_id: &TxId) -> ChainResult<FinalityOutcome> {
        let delay = *self.finality_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let operation = self
            .tx_operations
            .lock()
            .unwrap()
            .get(tx_id.as_str())
            .cloned()
            .flatten();
        let outcome = match operation {
            Some(ChainOperation::RedeemBond { bond_id }) => self
                .redeem_outcomes
                .lock()
                .unwrap()
                .get(&bond_id)
                .cloned()
                .unwrap_or(FinalityOutcome::Sealed),
            Some(_) => FinalityOutcome::Sealed,
            None => self
                .setup_outcome
                .lock()
                .unwrap()
                .clone()
                .unwrap_or(FinalityOutcome::Sealed),
        };
        Ok(outcome)
    }

    async fn query_user_bonds(&self, account: &Address) -> ChainResult<Vec<Bond>> {
        *self.bond_queries.lock().unwrap() += 1;
        if let Some(error) = self.bond_query_error.lock().unwrap().take() {
            return Err(error);
        }
        Ok(self
            .bonds
            .lock()
            .unwrap()
            .iter()
            .filter(|bond| &bond.owner == account)
            .cloned()
            .collect())
    }

    async fn query_listings(&self) -> ChainResult<Vec<Listing>> {
        Ok(self.listings.lock().unwrap().clone())
    }
}

/// Workflows over `gateway`, quoting against `swap_base` when given.
pub fn workflows(
    gateway: Arc<dyn ChainGateway>,
    swap_base: Option<String>,
) -> (chronobond::Workflows, chronobond::notices::Notices) {
    let swap = chronobond::config::SwapConfig {
        base_url: swap_base,
        timeout_ms: 1_000,
        ..Default::default()
    };
    let notices = chronobond::notices::Notices::new(64, Duration::from_secs(5));
    let quotes = chronobond::quoting::QuoteClient::new(&swap, notices.clone());
    let events = chronobond::transaction::EventBus::new(256);
    let workflows = chronobond::Workflows::new(gateway, quotes, events, swap.default_slippage_bps);
    (workflows, notices)
}
