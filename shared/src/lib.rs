use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a registered parent account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parent {
    pub id: i64,
    pub name: String,
    pub age: Option<i32>,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Represents a child whose vaccinations are tracked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub id: i64,
    pub parent_id: i64,
    pub name: String,
    pub dob: NaiveDate,
    /// Display name of the schedule country ("India", "UK", "USA")
    pub country: String,
    pub created_at: DateTime<Utc>,
}

/// A single vaccine dose as tracked for a child.
///
/// `id` is `None` for doses that only live in a guest session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaccineRecord {
    pub id: Option<i64>,
    pub name: String,
    pub due_date: NaiveDate,
    pub completed_at: Option<NaiveDate>,
}

/// Status of an age group in a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    /// Every vaccine in the group has a completion date
    Completed,
    /// Due date is today or in the past and the group is not complete
    DueOrOverdue,
    /// Due date is in the future
    Upcoming,
}

impl ScheduleStatus {
    /// CSS class used by the frontend for schedule cards
    pub fn css_class(&self) -> &'static str {
        match self {
            ScheduleStatus::Completed => "status-completed",
            ScheduleStatus::DueOrOverdue => "status-due",
            ScheduleStatus::Upcoming => "status-upcoming",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ScheduleStatus::Completed => "Completed",
            ScheduleStatus::DueOrOverdue => "Due / Overdue",
            ScheduleStatus::Upcoming => "Upcoming",
        }
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One age group of a child's schedule with its computed due date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub age: String,
    pub vaccines: Vec<String>,
    pub due_date: NaiveDate,
    pub status: ScheduleStatus,
    pub status_class: String,
    pub status_text: String,
    pub vaccine_records: Vec<VaccineRecord>,
    pub group_completed: bool,
    pub group_completed_date: Option<NaiveDate>,
}

/// Per-child vaccination counts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChildStats {
    pub completed: u32,
    pub overdue: u32,
    pub due_soon: u32,
    pub upcoming: u32,
    pub total: u32,
    pub next_due: Option<NaiveDate>,
    pub next_due_vaccines: Vec<String>,
}

/// Totals across all children of a parent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    pub completed: u32,
    pub overdue: u32,
    /// Due soon plus upcoming
    pub upcoming: u32,
}

// ---------------------------------------------------------------------------
// Auth and profile
// ---------------------------------------------------------------------------

/// Request for registering a new parent.
///
/// `age` is kept as text so that non-numeric input can be reported as a
/// validation error instead of a deserialization failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterParentRequest {
    pub name: String,
    pub email: String,
    pub age: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateParentRequest {
    pub name: String,
    pub age: String,
}

/// Response after registering, logging in or updating a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentResponse {
    pub parent: Parent,
    pub success_message: String,
    /// Child created from the guest session during registration, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_child: Option<Child>,
}

// ---------------------------------------------------------------------------
// Children
// ---------------------------------------------------------------------------

/// Request for creating a new child (persisted or guest)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateChildRequest {
    pub name: String,
    /// ISO 8601 date (YYYY-MM-DD)
    pub dob: String,
    /// Schedule country; defaults to India when omitted
    #[serde(default)]
    pub country: Option<String>,
}

/// Request for updating an existing child
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateChildRequest {
    pub name: String,
    pub dob: String,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildResponse {
    pub child: Child,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildListResponse {
    pub children: Vec<Child>,
}

/// A child with its full schedule and statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildDetailResponse {
    pub child: Child,
    pub schedule: Vec<ScheduleEntry>,
    pub stats: ChildStats,
    pub today: NaiveDate,
}

/// Whether a completion applies to one vaccine or its whole age group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionScope {
    #[default]
    Group,
    Single,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkCompleteRequest {
    pub vaccine: String,
    /// ISO 8601 date (YYYY-MM-DD); defaults to today
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub scope: CompletionScope,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkCompleteResponse {
    pub updated: Vec<VaccineRecord>,
    pub success_message: String,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildSummary {
    pub child: Child,
    pub stats: ChildStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub parent: Parent,
    pub children: Vec<ChildSummary>,
    pub overall: OverallStats,
}

// ---------------------------------------------------------------------------
// Guest session
// ---------------------------------------------------------------------------

/// The child kept in an unauthenticated session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestChild {
    pub name: String,
    pub dob: NaiveDate,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestChildResponse {
    pub child: GuestChild,
    pub schedule: Vec<ScheduleEntry>,
    pub stats: ChildStats,
    pub today: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestMarkCompleteRequest {
    /// Age label of the group, e.g. "6 Weeks"
    pub age: String,
    #[serde(default)]
    pub date: Option<String>,
}

// ---------------------------------------------------------------------------
// Schedules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub age: String,
    pub vaccines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountrySchedule {
    pub country: String,
    pub milestones: Vec<Milestone>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryListResponse {
    pub countries: Vec<String>,
    pub default_country: String,
    pub schedules: Vec<CountrySchedule>,
}

/// Schedule computed for a date of birth without persisting anything
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulePreviewResponse {
    pub country: String,
    pub dob: Option<NaiveDate>,
    pub milestones: Vec<Milestone>,
    pub schedule: Vec<ScheduleEntry>,
}

// ---------------------------------------------------------------------------
// Misc
// ---------------------------------------------------------------------------

/// Response for actions without a resource to return, such as logout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}
