//! # REST API for Schedule Tables
//!
//! Read-only access to the country tables, with an optional preview of the
//! due dates for a date of birth.

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Deserialize;
use shared::{CountryListResponse, HealthResponse, SchedulePreviewResponse};
use tracing::{info, warn};

use crate::domain::guest_service::guest_doses;
use crate::domain::models::GuestSession;
use crate::domain::schedule_data::{all_countries, schedule_for, Country};
use crate::domain::schedule_service::build_entries;
use crate::domain::validation::parse_date;
use crate::domain::DomainError;
use crate::io::rest::mappers::ScheduleMapper;
use crate::io::rest::today;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_schedules))
        .route("/:country", get(preview_schedule))
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub dob: Option<String>,
}

pub async fn list_schedules() -> impl IntoResponse {
    info!("GET /api/schedules");

    let response = CountryListResponse {
        countries: all_countries().iter().map(Country::to_string).collect(),
        default_country: Country::default().to_string(),
        schedules: all_countries()
            .iter()
            .map(|c| ScheduleMapper::to_country_schedule(*c, schedule_for(*c)))
            .collect(),
    };
    (StatusCode::OK, Json(response))
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok".to_string() }))
}

/// The table for a country; with `dob` also the computed schedule
pub async fn preview_schedule(Path(country): Path<String>, Query(query): Query<PreviewQuery>) -> impl IntoResponse {
    info!("GET /api/schedules/{} - dob: {:?}", country, query.dob);

    let country = match country.parse::<Country>() {
        Ok(country) => country,
        Err(e) => {
            warn!("{}", e);
            return DomainError::NotFound("Schedule").into_response();
        }
    };

    let dob = match query.dob.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        None => None,
        Some(raw) => match parse_date(raw) {
            Some(dob) => Some(dob),
            None => return DomainError::validation("Invalid date format.").into_response(),
        },
    };

    let schedule = match dob {
        Some(dob) => {
            let doses = guest_doses(&GuestSession::new(String::new(), dob, country));
            ScheduleMapper::to_entries(build_entries(country, dob, &doses, today()))
        }
        None => Vec::new(),
    };

    let response = SchedulePreviewResponse {
        country: country.to_string(),
        dob,
        milestones: schedule_for(country).iter().map(ScheduleMapper::to_milestone).collect(),
        schedule,
    };
    (StatusCode::OK, Json(response)).into_response()
}
