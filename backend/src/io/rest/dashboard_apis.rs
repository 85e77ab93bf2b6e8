//! # REST API for the Dashboard

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use shared::DashboardResponse;
use tracing::info;

use crate::io::rest::mappers::{ChildMapper, ParentMapper};
use crate::io::rest::session::CurrentParent;
use crate::io::rest::today;
use crate::AppState;

/// Per-child statistics and overall totals for the logged-in parent
pub async fn get_dashboard(State(state): State<AppState>, CurrentParent(parent_id): CurrentParent) -> impl IntoResponse {
    info!("GET /api/dashboard - parent: {}", parent_id);

    match state.dashboard_service.dashboard(parent_id, today()).await {
        Ok(dashboard) => {
            let response = DashboardResponse {
                parent: ParentMapper::to_dto(dashboard.parent),
                children: dashboard
                    .children
                    .into_iter()
                    .map(|(child, stats)| ChildMapper::to_summary_dto(child, stats))
                    .collect(),
                overall: dashboard.overall,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => e.into_response(),
    }
}
