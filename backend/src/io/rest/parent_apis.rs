//! # REST API for Parent Profiles
//!
//! A parent can only see, edit or delete their own profile; any other id
//! answers 404.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use shared::UpdateParentRequest;
use tower_sessions::Session;
use tracing::{error, info, warn};

use crate::domain::DomainError;
use crate::io::rest::mappers::ParentMapper;
use crate::io::rest::session::CurrentParent;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/:id", get(get_parent).put(update_parent).delete(delete_parent))
}

fn ensure_own_profile(current: i64, requested: i64) -> Result<(), DomainError> {
    if current == requested {
        Ok(())
    } else {
        warn!("Parent {} tried to access profile {}", current, requested);
        Err(DomainError::NotFound("Parent"))
    }
}

pub async fn get_parent(
    State(state): State<AppState>,
    CurrentParent(parent_id): CurrentParent,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    info!("GET /api/parents/{}", id);

    if let Err(e) = ensure_own_profile(parent_id, id) {
        return e.into_response();
    }
    match state.auth_service.get_profile(id).await {
        Ok(parent) => (StatusCode::OK, Json(ParentMapper::to_dto(parent))).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn update_parent(
    State(state): State<AppState>,
    CurrentParent(parent_id): CurrentParent,
    Path(id): Path<i64>,
    Json(request): Json<UpdateParentRequest>,
) -> impl IntoResponse {
    info!("PUT /api/parents/{} - request: {:?}", id, request);

    if let Err(e) = ensure_own_profile(parent_id, id) {
        return e.into_response();
    }
    match state.auth_service.update_profile(id, &request).await {
        Ok(parent) => {
            let response = ParentMapper::to_response(parent, "Profile updated", None);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Delete the account with all children, then drop the session
pub async fn delete_parent(
    State(state): State<AppState>,
    CurrentParent(parent_id): CurrentParent,
    session: Session,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    info!("DELETE /api/parents/{}", id);

    if let Err(e) = ensure_own_profile(parent_id, id) {
        return e.into_response();
    }
    if let Err(e) = state.auth_service.delete_account(id).await {
        return e.into_response();
    }
    if let Err(e) = session.flush().await {
        error!("Failed to flush session after deleting parent {}: {}", id, e);
    }
    (StatusCode::NO_CONTENT, "").into_response()
}
