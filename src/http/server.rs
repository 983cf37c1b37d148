//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (timeout, request ID, tracing)
//! - Serve on a bound listener until the shutdown future resolves

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, Request},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::http::{quote, status, views, websocket, workflow};
use crate::notices::Notices;
use crate::workflow::Workflows;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub workflows: Workflows,
    pub notices: Notices,
    pub config: Arc<AppConfig>,
}

/// HTTP and WebSocket front end.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: AppConfig, workflows: Workflows, notices: Notices) -> Self {
        let config = Arc::new(config);
        let state = AppState {
            workflows,
            notices,
            config: config.clone(),
        };
        Self {
            router: Self::build_router(&config, state),
        }
    }

    /// The fully layered router, for tests that drive it in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

        let api = Router::new()
            .route("/strategies", get(views::strategies))
            .route("/quote", post(quote::create_quote))
            .route("/mint", post(workflow::mint))
            .route("/redeem", post(workflow::redeem))
            .route("/redeem-all", post(workflow::redeem_all))
            .route("/marketplace/list", post(workflow::list))
            .route("/marketplace/purchase", post(workflow::purchase))
            .route("/marketplace/withdraw", post(workflow::withdraw))
            .route("/bonds/split", post(workflow::split))
            .route("/listings", get(views::listings))
            .route("/accounts/{address}/bonds", get(views::account_bonds))
            .route(
                "/status/{flow}/{key}",
                get(status::get_status).delete(status::dismiss_status),
            );

        Router::new()
            .route("/health", get(health))
            .route("/ws", get(websocket::ws_handler))
            .nest("/api/v1", api)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                    .layer(
                        TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                            let request_id = request
                                .headers()
                                .get(REQUEST_ID_HEADER)
                                .and_then(|value| value.to_str().ok())
                                .unwrap_or("-");
                            tracing::info_span!(
                                "request",
                                method = %request.method(),
                                uri = %request.uri(),
                                request_id,
                            )
                        }),
                    )
                    .layer(PropagateRequestIdLayer::new(request_id))
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.server.request_timeout_secs,
                    ))),
            )
    }

    /// Serve on `listener` until `shutdown` resolves, then drain in-flight
    /// requests.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Health {
    status: &'static str,
    quotes_enabled: bool,
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        quotes_enabled: state.workflows.quotes().is_enabled(),
    })
}
