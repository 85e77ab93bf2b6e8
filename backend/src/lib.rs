//! # VaxGuard Backend
//!
//! Contains all non-UI logic for the vaccination tracker.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! ```text
//! Frontend (any HTTP client)
//!     ↓
//! IO Layer (REST API, sessions, mappers)
//!     ↓
//! Domain Layer (schedules, validation, services)
//!     ↓
//! Storage Layer (SQLite repositories)
//! ```
//!
//! `initialize_backend` wires the services together and `create_router`
//! exposes them under `/api`.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use tracing::info;

use crate::config::AppConfig;
use crate::domain::{AuthService, ChildService, DashboardService, ExportService, GuestService, ScheduleService};
use crate::io::rest::{
    auth_apis, child_apis, dashboard_apis, guest_apis, parent_apis, schedule_apis,
};
use crate::storage::{ChildRepository, DbConnection, ParentRepository, VaccinationRepository};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub child_service: ChildService,
    pub dashboard_service: DashboardService,
    pub guest_service: GuestService,
    pub export_service: ExportService,
}

/// Build every service on top of one database connection
pub fn build_state(db: DbConnection, due_soon_days: u32) -> AppState {
    let parents = ParentRepository::new(db.clone());
    let children = ChildRepository::new(db.clone());
    let vaccinations = VaccinationRepository::new(db);

    let schedule = ScheduleService::new(vaccinations.clone(), due_soon_days);
    let child_service = ChildService::new(children.clone(), vaccinations.clone(), schedule.clone());

    AppState {
        auth_service: AuthService::new(parents.clone()),
        dashboard_service: DashboardService::new(parents.clone(), children, schedule.clone()),
        guest_service: GuestService::new(child_service.clone(), vaccinations, due_soon_days),
        export_service: ExportService::new(parents, child_service.clone(), schedule),
        child_service,
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up database at {}", config.database_url);
    let db = DbConnection::new(&config.database_url).await?;

    info!("Setting up domain model (due soon window: {} days)", config.due_soon_days);
    Ok(build_state(db, config.due_soon_days))
}

/// Routes under `/api`, without any middleware
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(schedule_apis::health))
        .route("/dashboard", get(dashboard_apis::get_dashboard))
        .nest("/auth", auth_apis::router())
        .nest("/parents", parent_apis::router())
        .nest("/children", child_apis::router())
        .nest("/guest", guest_apis::router())
        .nest("/schedules", schedule_apis::router())
}

/// Create the Axum router with sessions, CORS and request tracing
pub fn create_router(app_state: AppState, config: &AppConfig) -> Result<Router> {
    let origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin: {}", config.cors_origin))?;

    // Credentials are required for the session cookie, which rules out wildcard headers
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let sessions = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(config.secure_cookies)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(config.session_idle_minutes)));

    let mut app = Router::new().nest("/api", api_routes());
    if let Some(dir) = &config.static_dir {
        info!("Serving static files from {}", dir);
        app = app.fallback_service(ServeDir::new(dir));
    }

    Ok(app
        .layer(sessions)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state))
}
