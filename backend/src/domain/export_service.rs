//! Export service domain logic.
//!
//! Builds the downloadable calendar (ICS) and printable vaccine record (PDF)
//! for a child or a guest child. The REST layer only attaches headers.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use crate::domain::child_service::ChildService;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::guest_service::guest_doses;
use crate::domain::ics::build_calendar;
use crate::domain::models::{DoseStatus, GuestSession};
use crate::domain::pdf_record::{render_vaccine_record, VaccineRecordDocument};
use crate::domain::schedule_service::{build_entries, ScheduleGroup, ScheduleService};
use crate::storage::ParentRepository;

pub const ICS_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Status of one row of the printed record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Completed,
    Overdue,
    Due,
}

impl RecordStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RecordStatus::Completed => "Completed",
            RecordStatus::Overdue => "Overdue",
            RecordStatus::Due => "Due",
        }
    }
}

/// One vaccine on the printed record. `date` is the completion date for
/// completed vaccines and the due date otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRow {
    pub vaccine: String,
    pub status: RecordStatus,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordGroup {
    pub age: String,
    pub rows: Vec<RecordRow>,
}

/// A downloadable file
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Record row for a single dose; due today counts as overdue
pub fn record_row<D: DoseStatus>(dose: &D, today: NaiveDate) -> RecordRow {
    let (status, date) = match dose.completed_at() {
        Some(completed) => (RecordStatus::Completed, completed),
        None if dose.due_date() <= today => (RecordStatus::Overdue, dose.due_date()),
        None => (RecordStatus::Due, dose.due_date()),
    };
    RecordRow {
        vaccine: dose.name().to_string(),
        status,
        date,
    }
}

pub fn record_rows<D: DoseStatus>(doses: &[D], today: NaiveDate) -> Vec<RecordRow> {
    doses.iter().map(|d| record_row(d, today)).collect()
}

/// Record rows grouped by milestone, in schedule order
pub fn grouped_record_rows(groups: &[ScheduleGroup], today: NaiveDate) -> Vec<RecordGroup> {
    groups
        .iter()
        .map(|group| RecordGroup {
            age: group.milestone.age.to_string(),
            rows: record_rows(&group.doses, today),
        })
        .collect()
}

/// `05 Jan 2026`
pub fn format_record_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

/// Upper-cased first letters of up to two words; `CH` when the name is empty
pub fn name_initials(name: &str) -> String {
    let initials: String = name
        .split_whitespace()
        .take(2)
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect();
    if initials.is_empty() {
        "CH".to_string()
    } else {
        initials
    }
}

pub fn ics_filename(child_name: &str) -> String {
    format!("{}_vaccinations.ics", child_name.replace(' ', "_"))
}

pub fn pdf_filename(child_name: &str, today: NaiveDate) -> String {
    format!(
        "{}_vaxguard_vaccine_record_{}.pdf",
        name_initials(child_name),
        today.format("%Y%m%d")
    )
}

/// Service that renders exports for children and guest children
#[derive(Clone)]
pub struct ExportService {
    parents: ParentRepository,
    child_service: ChildService,
    schedule: ScheduleService,
}

impl ExportService {
    pub fn new(parents: ParentRepository, child_service: ChildService, schedule: ScheduleService) -> Self {
        Self {
            parents,
            child_service,
            schedule,
        }
    }

    /// Calendar with one event per milestone of a parent's child
    pub async fn child_calendar(
        &self,
        parent_id: i64,
        child_id: i64,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> DomainResult<ExportedFile> {
        let detail = self.child_service.get_child_detail(parent_id, child_id, today).await?;
        info!("Exporting calendar for child {}", detail.child.id);

        let body = build_calendar(&detail.child.name, &detail.child.id.to_string(), &detail.schedule, now);
        Ok(ExportedFile {
            filename: ics_filename(&detail.child.name),
            content_type: ICS_CONTENT_TYPE,
            bytes: body.into_bytes(),
        })
    }

    pub fn guest_calendar(&self, guest: &GuestSession, today: NaiveDate, now: DateTime<Utc>) -> ExportedFile {
        info!("Exporting calendar for guest child {}", guest.name);
        let doses = guest_doses(guest);
        let groups = build_entries(guest.country, guest.dob, &doses, today);

        ExportedFile {
            filename: ics_filename(&guest.name),
            content_type: ICS_CONTENT_TYPE,
            bytes: build_calendar(&guest.name, "guest", &groups, now).into_bytes(),
        }
    }

    /// Printable record of a parent's child
    pub async fn vaccine_record(&self, parent_id: i64, child_id: i64, today: NaiveDate) -> DomainResult<ExportedFile> {
        let parent = self
            .parents
            .get_parent(parent_id)
            .await?
            .ok_or(DomainError::NotFound("Parent"))?;
        let detail = self.child_service.get_child_detail(parent_id, child_id, today).await?;
        info!("Exporting vaccine record for child {}", detail.child.id);

        let stats = self.schedule.stats(&detail.vaccinations, today);
        let document = VaccineRecordDocument {
            child_name: detail.child.name.clone(),
            parent_name: parent.name,
            dob: detail.child.dob,
            country: detail.child.country.to_string(),
            generated_on: today,
            overdue: stats.overdue,
            due_soon: stats.due_soon,
            completed: stats.completed,
            groups: grouped_record_rows(&detail.schedule, today),
        };

        Ok(ExportedFile {
            filename: pdf_filename(&detail.child.name, today),
            content_type: PDF_CONTENT_TYPE,
            bytes: render_vaccine_record(&document),
        })
    }
}
