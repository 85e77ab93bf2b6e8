//! Cookie-backed session state.
//!
//! A logged-in parent is identified by `parent_id`; an anonymous visitor may
//! keep one guest child under `guest_child`.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use tracing::{debug, info};

use crate::domain::models::GuestSession;
use crate::domain::{DomainError, DomainResult};

pub const PARENT_ID_KEY: &str = "parent_id";
pub const GUEST_CHILD_KEY: &str = "guest_child";

fn session_error(e: tower_sessions::session::Error) -> DomainError {
    DomainError::Session(e.to_string())
}

pub async fn current_parent_id(session: &Session) -> DomainResult<Option<i64>> {
    session.get::<i64>(PARENT_ID_KEY).await.map_err(session_error)
}

/// The logged-in parent, or `Unauthorized`
pub async fn require_parent(session: &Session) -> DomainResult<i64> {
    current_parent_id(session).await?.ok_or(DomainError::Unauthorized)
}

/// Bind the session to a parent under a fresh session id
pub async fn start_parent_session(session: &Session, parent_id: i64) -> DomainResult<()> {
    session.cycle_id().await.map_err(session_error)?;
    session.insert(PARENT_ID_KEY, parent_id).await.map_err(session_error)?;
    info!("Started session for parent {}", parent_id);
    Ok(())
}

pub async fn end_parent_session(session: &Session) -> DomainResult<Option<i64>> {
    let parent_id = session.remove::<i64>(PARENT_ID_KEY).await.map_err(session_error)?;
    if let Some(id) = parent_id {
        info!("Ended session for parent {}", id);
    }
    Ok(parent_id)
}

pub async fn load_guest(session: &Session) -> DomainResult<Option<GuestSession>> {
    session.get::<GuestSession>(GUEST_CHILD_KEY).await.map_err(session_error)
}

pub async fn require_guest(session: &Session) -> DomainResult<GuestSession> {
    load_guest(session).await?.ok_or(DomainError::NotFound("Guest child"))
}

pub async fn store_guest(session: &Session, guest: &GuestSession) -> DomainResult<()> {
    debug!("Storing guest child {}", guest.name);
    session.insert(GUEST_CHILD_KEY, guest).await.map_err(session_error)
}

pub async fn take_guest(session: &Session) -> DomainResult<Option<GuestSession>> {
    session.remove::<GuestSession>(GUEST_CHILD_KEY).await.map_err(session_error)
}

/// Extractor for endpoints that need a logged-in parent.
/// Rejects with 401 when the session has no parent.
#[derive(Debug, Clone, Copy)]
pub struct CurrentParent(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentParent
where
    S: Send + Sync,
{
    type Rejection = DomainError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, message)| DomainError::Session(message.to_string()))?;
        require_parent(&session).await.map(CurrentParent)
    }
}
