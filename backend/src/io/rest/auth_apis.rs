//! # REST API for Authentication
//!
//! Registration, login, logout and the current parent. Registration also
//! merges a guest child kept in the session into the new account.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use shared::{LoginRequest, MessageResponse, RegisterParentRequest};
use tower_sessions::Session;
use tracing::{error, info, warn};

use crate::io::rest::mappers::{ChildMapper, ParentMapper};
use crate::io::rest::session::{end_parent_session, load_guest, start_parent_session, take_guest, CurrentParent};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

/// Register a parent and log them in
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<RegisterParentRequest>,
) -> impl IntoResponse {
    info!("POST /api/auth/register - email: {}", request.email);

    let parent = match state.auth_service.register(&request).await {
        Ok(parent) => parent,
        Err(e) => {
            warn!("Registration failed: {}", e);
            return e.into_response();
        }
    };

    if let Err(e) = start_parent_session(&session, parent.id).await {
        return e.into_response();
    }

    // The guest leaves the session only once it is stored for the parent
    let guest = match load_guest(&session).await {
        Ok(guest) => guest,
        Err(e) => return e.into_response(),
    };
    let mut merged_child = None;
    if let Some(guest) = guest {
        match state.guest_service.merge_into_parent(parent.id, &guest).await {
            Ok(child) => {
                if let Err(e) = take_guest(&session).await {
                    return e.into_response();
                }
                merged_child = Some(ChildMapper::to_dto(child));
            }
            Err(e) => error!("Failed to merge guest child into parent {}, keeping it in the session: {}", parent.id, e),
        }
    }

    let message = registration_message(merged_child.is_some());
    let response = ParentMapper::to_response(parent, message, merged_child);
    (StatusCode::CREATED, Json(response)).into_response()
}

/// Log in with email and password
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> impl IntoResponse {
    info!("POST /api/auth/login - email: {}", request.email);

    match state.auth_service.login(&request.email, &request.password).await {
        Ok(parent) => {
            if let Err(e) = start_parent_session(&session, parent.id).await {
                return e.into_response();
            }
            let response = ParentMapper::to_response(parent, "Logged in successfully", None);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn logout(session: Session) -> impl IntoResponse {
    info!("POST /api/auth/logout");

    match end_parent_session(&session).await {
        Ok(_) => (
            StatusCode::OK,
            Json(MessageResponse {
                success_message: "Logged out".to_string(),
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// The logged-in parent
pub async fn me(State(state): State<AppState>, CurrentParent(parent_id): CurrentParent) -> impl IntoResponse {
    info!("GET /api/auth/me - parent: {}", parent_id);

    match state.auth_service.get_profile(parent_id).await {
        Ok(parent) => (StatusCode::OK, Json(ParentMapper::to_dto(parent))).into_response(),
        Err(e) => e.into_response(),
    }
}

fn registration_message(merged_guest: bool) -> &'static str {
    if merged_guest {
        "Registration successful. Your guest child has been saved to your account."
    } else {
        "Registration successful"
    }
}
