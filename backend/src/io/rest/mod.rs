//! # REST API Interface Layer
//!
//! JSON endpoints for the vaccination tracker. This layer handles:
//! - request/response serialization
//! - session state for parents and guests
//! - translating domain errors to HTTP status codes
//!
//! Handlers carry no business rules; they resolve the session, call a domain
//! service and map the result.

pub mod auth_apis;
pub mod child_apis;
pub mod dashboard_apis;
pub mod errors;
pub mod export_apis;
pub mod guest_apis;
pub mod mappers;
pub mod parent_apis;
pub mod schedule_apis;
pub mod session;


use chrono::{Local, NaiveDate};

/// The server's local calendar date, used for every status computation of a request
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
