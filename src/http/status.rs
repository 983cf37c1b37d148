use axum::{
    extract::{Path, State},
    Json,
};

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::transaction::{FlowKind, StatusSnapshot};

fn flow(segment: &str) -> Result<FlowKind, ApiError> {
    segment
        .parse()
        .map_err(|unknown| ApiError::NotFound(format!("unknown flow '{}'", unknown)))
}

pub async fn get_status(
    State(state): State<AppState>,
    Path((flow_name, key)): Path<(String, String)>,
) -> Result<Json<StatusSnapshot>, ApiError> {
    let flow = flow(&flow_name)?;
    Ok(Json(state.workflows.snapshot(flow, &key)))
}

/// Dismiss a finished result. Rejected with 409 while in flight.
pub async fn dismiss_status(
    State(state): State<AppState>,
    Path((flow_name, key)): Path<(String, String)>,
) -> Result<Json<StatusSnapshot>, ApiError> {
    let flow = flow(&flow_name)?;
    Ok(Json(state.workflows.dismiss(flow, &key)?))
}
