//! # REST API for Child Management
//!
//! Endpoints for creating, retrieving, updating and deleting a parent's
//! children, and for recording vaccinations.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use shared::{CreateChildRequest, MarkCompleteRequest, MarkCompleteResponse, UpdateChildRequest};
use tracing::{info, warn};

use crate::io::rest::export_apis;
use crate::io::rest::mappers::{ChildMapper, ScheduleMapper};
use crate::io::rest::session::CurrentParent;
use crate::io::rest::today;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_children).post(create_child))
        .route("/:id", get(get_child).put(update_child).delete(delete_child))
        .route("/:id/complete", post(mark_complete))
        .route("/:id/vaccinations/:name/completion", delete(clear_completion))
        .route("/:id/calendar.ics", get(export_apis::child_calendar))
        .route("/:id/vaccine-record.pdf", get(export_apis::child_vaccine_record))
}

/// Create a new child
pub async fn create_child(
    State(state): State<AppState>,
    CurrentParent(parent_id): CurrentParent,
    Json(request): Json<CreateChildRequest>,
) -> impl IntoResponse {
    info!("POST /api/children - request: {:?}", request);

    match state.child_service.create_child(parent_id, &request, today()).await {
        Ok(child) => {
            let response = ChildMapper::to_response(child, "Child added successfully");
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => {
            warn!("Failed to create child: {}", e);
            e.into_response()
        }
    }
}

/// List the parent's children, newest first
pub async fn list_children(State(state): State<AppState>, CurrentParent(parent_id): CurrentParent) -> impl IntoResponse {
    info!("GET /api/children");

    match state.child_service.list_children(parent_id).await {
        Ok(children) => (StatusCode::OK, Json(ChildMapper::to_child_list_dto(children))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// A child with its schedule and statistics
pub async fn get_child(
    State(state): State<AppState>,
    CurrentParent(parent_id): CurrentParent,
    Path(child_id): Path<i64>,
) -> impl IntoResponse {
    info!("GET /api/children/{}", child_id);

    let today = today();
    match state.child_service.get_child_detail(parent_id, child_id, today).await {
        Ok(detail) => (StatusCode::OK, Json(ChildMapper::to_detail_dto(detail, today))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a child
pub async fn update_child(
    State(state): State<AppState>,
    CurrentParent(parent_id): CurrentParent,
    Path(child_id): Path<i64>,
    Json(request): Json<UpdateChildRequest>,
) -> impl IntoResponse {
    info!("PUT /api/children/{} - request: {:?}", child_id, request);

    match state.child_service.update_child(parent_id, child_id, &request, today()).await {
        Ok(child) => {
            let response = ChildMapper::to_response(child, "Child updated successfully");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            warn!("Failed to update child {}: {}", child_id, e);
            e.into_response()
        }
    }
}

/// Delete a child
pub async fn delete_child(
    State(state): State<AppState>,
    CurrentParent(parent_id): CurrentParent,
    Path(child_id): Path<i64>,
) -> impl IntoResponse {
    info!("DELETE /api/children/{}", child_id);

    match state.child_service.delete_child(parent_id, child_id).await {
        Ok(()) => (StatusCode::NO_CONTENT, "").into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record a vaccination, by default for the whole age group
pub async fn mark_complete(
    State(state): State<AppState>,
    CurrentParent(parent_id): CurrentParent,
    Path(child_id): Path<i64>,
    Json(request): Json<MarkCompleteRequest>,
) -> impl IntoResponse {
    info!("POST /api/children/{}/complete - request: {:?}", child_id, request);

    let result = state
        .child_service
        .mark_complete(
            parent_id,
            child_id,
            &request.vaccine,
            request.date.as_deref(),
            request.scope,
            today(),
        )
        .await;

    match result {
        Ok(updated) => {
            let response = MarkCompleteResponse {
                updated: ScheduleMapper::to_records(&updated),
                success_message: "Vaccination marked as complete".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            warn!("Failed to mark {} complete for child {}: {}", request.vaccine, child_id, e);
            e.into_response()
        }
    }
}

/// Undo a recorded vaccination
pub async fn clear_completion(
    State(state): State<AppState>,
    CurrentParent(parent_id): CurrentParent,
    Path((child_id, name)): Path<(i64, String)>,
) -> impl IntoResponse {
    info!("DELETE /api/children/{}/vaccinations/{}/completion", child_id, name);

    match state.child_service.clear_completion(parent_id, child_id, &name).await {
        Ok(vaccination) => (StatusCode::OK, Json(ScheduleMapper::to_record(&vaccination))).into_response(),
        Err(e) => e.into_response(),
    }
}
