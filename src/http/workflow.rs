//! Write endpoints.
//!
//! Each handler validates and claims the operation key synchronously,
//! answers `202 Accepted` with the initial status, and leaves the chain
//! work to a spawned task. Progress is pushed over `/ws` and can be polled
//! at `/api/v1/status/{flow}/{key}`.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::bonds::{AccountRequest, ListRequest, ListingRequest, MintRequest, RedeemRequest, SplitRequest};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::transaction::{Phase, StatusSnapshot};
use crate::workflow::Flight;

type Accepted = (StatusCode, Json<StatusSnapshot>);

fn spawn_flight<P: Phase>(flight: Flight<P>) -> Accepted {
    let snapshot = flight.snapshot();
    tokio::spawn(flight.run());
    (StatusCode::ACCEPTED, Json(snapshot))
}

pub async fn mint(
    State(state): State<AppState>,
    Json(request): Json<MintRequest>,
) -> Result<Accepted, ApiError> {
    let flight = state.workflows.begin_mint(&request).await?;
    Ok(spawn_flight(flight))
}

pub async fn redeem(
    State(state): State<AppState>,
    Json(request): Json<RedeemRequest>,
) -> Result<Accepted, ApiError> {
    Ok(spawn_flight(state.workflows.begin_redeem(&request)?))
}

#[derive(Debug, Serialize)]
pub struct BatchAccepted {
    operations: Vec<StatusSnapshot>,
}

pub async fn redeem_all(
    State(state): State<AppState>,
    Json(request): Json<AccountRequest>,
) -> Result<(StatusCode, Json<BatchAccepted>), ApiError> {
    let batch = state.workflows.begin_redeem_all(&request).await?;
    let operations = batch.snapshots();
    if !batch.is_empty() {
        tokio::spawn(batch.run());
    }
    Ok((StatusCode::ACCEPTED, Json(BatchAccepted { operations })))
}

pub async fn list(
    State(state): State<AppState>,
    Json(request): Json<ListRequest>,
) -> Result<Accepted, ApiError> {
    Ok(spawn_flight(state.workflows.begin_list(&request)?))
}

pub async fn purchase(
    State(state): State<AppState>,
    Json(request): Json<ListingRequest>,
) -> Result<Accepted, ApiError> {
    Ok(spawn_flight(state.workflows.begin_purchase(&request)?))
}

pub async fn withdraw(
    State(state): State<AppState>,
    Json(request): Json<ListingRequest>,
) -> Result<Accepted, ApiError> {
    Ok(spawn_flight(state.workflows.begin_withdraw(&request)?))
}

pub async fn split(
    State(state): State<AppState>,
    Json(request): Json<SplitRequest>,
) -> Result<Accepted, ApiError> {
    Ok(spawn_flight(state.workflows.begin_split(&request)?))
}
