//! # REST API for Guest Children
//!
//! Visitors without an account can keep one child in their session. Nothing
//! here touches the database.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use shared::{CreateChildRequest, GuestMarkCompleteRequest};
use tower_sessions::Session;
use tracing::{info, warn};

use crate::io::rest::export_apis;
use crate::io::rest::mappers::ChildMapper;
use crate::io::rest::session::{require_guest, store_guest, take_guest};
use crate::io::rest::today;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/child", get(get_guest_child).post(set_guest_child).delete(clear_guest_child))
        .route("/child/complete", post(guest_mark_complete))
        .route("/child/calendar.ics", get(export_apis::guest_calendar))
}

pub async fn get_guest_child(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    info!("GET /api/guest/child");

    match require_guest(&session).await {
        Ok(guest) => {
            let today = today();
            let detail = state.guest_service.guest_detail(&guest, today);
            (StatusCode::OK, Json(ChildMapper::to_guest_response(&guest, detail, today))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Replace the session's guest child
pub async fn set_guest_child(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CreateChildRequest>,
) -> impl IntoResponse {
    info!("POST /api/guest/child - request: {:?}", request);

    let today = today();
    let guest = match state.guest_service.set_guest_child(&request, today) {
        Ok(guest) => guest,
        Err(e) => {
            warn!("Rejected guest child: {}", e);
            return e.into_response();
        }
    };
    if let Err(e) = store_guest(&session, &guest).await {
        return e.into_response();
    }

    let detail = state.guest_service.guest_detail(&guest, today);
    (StatusCode::CREATED, Json(ChildMapper::to_guest_response(&guest, detail, today))).into_response()
}

pub async fn clear_guest_child(session: Session) -> impl IntoResponse {
    info!("DELETE /api/guest/child");

    match take_guest(&session).await {
        Ok(_) => (StatusCode::NO_CONTENT, "").into_response(),
        Err(e) => e.into_response(),
    }
}

/// Complete a whole age group of the guest child
pub async fn guest_mark_complete(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<GuestMarkCompleteRequest>,
) -> impl IntoResponse {
    info!("POST /api/guest/child/complete - request: {:?}", request);

    let mut guest = match require_guest(&session).await {
        Ok(guest) => guest,
        Err(e) => return e.into_response(),
    };

    let today = today();
    if let Err(e) = state
        .guest_service
        .guest_mark_complete(&mut guest, &request.age, request.date.as_deref(), today)
    {
        return e.into_response();
    }
    if let Err(e) = store_guest(&session, &guest).await {
        return e.into_response();
    }

    let detail = state.guest_service.guest_detail(&guest, today);
    (StatusCode::OK, Json(ChildMapper::to_guest_response(&guest, detail, today))).into_response()
}
