//! # Domain Module
//!
//! Business logic of the vaccination tracker, independent of HTTP.
//!
//! - `schedule_data` and `age_label` hold the country tables and the due-date
//!   arithmetic.
//! - `schedule_service` turns a child into vaccination rows, statuses and counts.
//! - The remaining services cover accounts, children, the dashboard, guest
//!   children and exports.

pub mod age_label;
pub mod auth_service;
pub mod child_service;
pub mod dashboard_service;
pub mod errors;
pub mod export_service;
pub mod guest_service;
pub mod ics;
pub mod models;
pub mod pdf_record;
pub mod schedule_data;
pub mod schedule_service;
pub mod validation;

pub use auth_service::AuthService;
pub use child_service::{ChildDetail, ChildService};
pub use dashboard_service::{Dashboard, DashboardService};
pub use errors::{DomainError, DomainResult};
pub use export_service::{ExportService, ExportedFile};
pub use guest_service::{GuestDetail, GuestService};
pub use schedule_service::{ScheduleGroup, ScheduleService};
