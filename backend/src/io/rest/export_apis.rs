//! # REST API for Data Export
//!
//! Calendar (ICS) and vaccine record (PDF) downloads.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tower_sessions::Session;
use tracing::info;

use crate::domain::ExportedFile;
use crate::io::rest::session::{require_guest, CurrentParent};
use crate::io::rest::today;
use crate::AppState;

/// Attach the file as a download
fn attachment(file: ExportedFile) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", file.filename.replace('"', ""));
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response()
}

pub async fn child_calendar(
    State(state): State<AppState>,
    CurrentParent(parent_id): CurrentParent,
    Path(child_id): Path<i64>,
) -> impl IntoResponse {
    info!("GET /api/children/{}/calendar.ics", child_id);

    match state
        .export_service
        .child_calendar(parent_id, child_id, today(), Utc::now())
        .await
    {
        Ok(file) => attachment(file),
        Err(e) => e.into_response(),
    }
}

pub async fn child_vaccine_record(
    State(state): State<AppState>,
    CurrentParent(parent_id): CurrentParent,
    Path(child_id): Path<i64>,
) -> impl IntoResponse {
    info!("GET /api/children/{}/vaccine-record.pdf", child_id);

    match state.export_service.vaccine_record(parent_id, child_id, today()).await {
        Ok(file) => attachment(file),
        Err(e) => e.into_response(),
    }
}

pub async fn guest_calendar(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    info!("GET /api/guest/child/calendar.ics");

    match require_guest(&session).await {
        Ok(guest) => attachment(state.export_service.guest_calendar(&guest, today(), Utc::now())),
        Err(e) => e.into_response(),
    }
}
