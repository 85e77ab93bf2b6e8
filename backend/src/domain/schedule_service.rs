//! Schedule materialization and status derivation.
//!
//! A child's schedule is the country table applied to its date of birth.
//! Persisted children get one vaccination row per scheduled vaccine; guest
//! children are evaluated over in-memory doses. Both go through the same
//! [`DoseStatus`] based functions so they report identical statuses.

use chrono::{Days, NaiveDate};
use shared::{ChildStats, OverallStats, ScheduleStatus};
use tracing::{debug, info};

use crate::domain::age_label::due_date;
use crate::domain::errors::DomainResult;
use crate::domain::models::{Child, DoseStatus, Vaccination};
use crate::domain::schedule_data::{schedule_for, Country, Milestone};
use crate::storage::VaccinationRepository;

pub const DEFAULT_DUE_SOON_DAYS: u32 = 30;

/// One vaccine of a schedule with its computed due date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedDose {
    pub age: &'static str,
    pub name: &'static str,
    pub due_date: NaiveDate,
}

/// A dose as shown inside a schedule group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoseRecord {
    pub id: Option<i64>,
    pub name: String,
    pub due_date: NaiveDate,
    pub completed_at: Option<NaiveDate>,
}

impl DoseStatus for DoseRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    fn completed_at(&self) -> Option<NaiveDate> {
        self.completed_at
    }

    fn record_id(&self) -> Option<i64> {
        self.id
    }
}

/// One milestone of a child's schedule together with its doses and status
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleGroup {
    pub milestone: &'static Milestone,
    pub due_date: NaiveDate,
    pub status: ScheduleStatus,
    pub doses: Vec<DoseRecord>,
    pub group_completed: bool,
    pub group_completed_date: Option<NaiveDate>,
}

/// Every vaccine of the country table with the due date for `dob`
pub fn planned_doses(country: Country, dob: NaiveDate) -> Vec<PlannedDose> {
    schedule_for(country)
        .iter()
        .flat_map(|milestone| {
            let due = due_date(dob, milestone.age);
            milestone.vaccines.iter().map(move |name| PlannedDose {
                age: milestone.age,
                name,
                due_date: due,
            })
        })
        .collect()
}

/// Status of a milestone: completed wins, then anything due today or earlier
pub fn group_status(group_completed: bool, due: NaiveDate, today: NaiveDate) -> ScheduleStatus {
    if group_completed {
        ScheduleStatus::Completed
    } else if due <= today {
        ScheduleStatus::DueOrOverdue
    } else {
        ScheduleStatus::Upcoming
    }
}

/// Build one group per milestone, attaching the records whose names belong
/// to it. Records outside the table are ignored.
pub fn build_entries<D: DoseStatus>(
    country: Country,
    dob: NaiveDate,
    records: &[D],
    today: NaiveDate,
) -> Vec<ScheduleGroup> {
    schedule_for(country)
        .iter()
        .map(|milestone| {
            let due = due_date(dob, milestone.age);
            let doses: Vec<DoseRecord> = milestone
                .vaccines
                .iter()
                .filter_map(|name| records.iter().find(|r| r.name() == *name))
                .map(to_dose_record)
                .collect();

            let group_completed = !doses.is_empty() && doses.iter().all(|d| d.completed_at.is_some());
            let group_completed_date = doses.iter().filter_map(|d| d.completed_at).min();

            ScheduleGroup {
                milestone,
                due_date: due,
                status: group_status(group_completed, due, today),
                doses,
                group_completed,
                group_completed_date,
            }
        })
        .collect()
}

fn to_dose_record<D: DoseStatus>(dose: &D) -> DoseRecord {
    DoseRecord {
        id: dose.record_id(),
        name: dose.name().to_string(),
        due_date: dose.due_date(),
        completed_at: dose.completed_at(),
    }
}

/// Per-child counts. Due today counts as overdue; the due-soon window is
/// `(today, today + window_days]`.
pub fn child_stats<D: DoseStatus>(records: &[D], today: NaiveDate, window_days: u32) -> ChildStats {
    let window_end = today
        .checked_add_days(Days::new(u64::from(window_days)))
        .unwrap_or(NaiveDate::MAX);

    let mut stats = ChildStats {
        total: records.len() as u32,
        ..ChildStats::default()
    };

    for record in records {
        let due = record.due_date();
        if record.is_completed() {
            stats.completed += 1;
        } else if due <= today {
            stats.overdue += 1;
        } else if due <= window_end {
            stats.due_soon += 1;
        } else {
            stats.upcoming += 1;
        }
    }

    stats.next_due = records
        .iter()
        .filter(|r| !r.is_completed())
        .map(|r| r.due_date())
        .min();
    if let Some(next) = stats.next_due {
        stats.next_due_vaccines = records
            .iter()
            .filter(|r| !r.is_completed() && r.due_date() == next)
            .map(|r| r.name().to_string())
            .collect();
    }

    stats
}

/// Totals across children; upcoming includes the due-soon doses
pub fn overall_stats<'a>(stats: impl IntoIterator<Item = &'a ChildStats>) -> OverallStats {
    stats.into_iter().fold(OverallStats::default(), |mut acc, s| {
        acc.completed += s.completed;
        acc.overdue += s.overdue;
        acc.upcoming += s.due_soon + s.upcoming;
        acc
    })
}

/// Service that keeps vaccination rows in step with the schedule tables
#[derive(Clone)]
pub struct ScheduleService {
    vaccinations: VaccinationRepository,
    due_soon_days: u32,
}

impl ScheduleService {
    pub fn new(vaccinations: VaccinationRepository, due_soon_days: u32) -> Self {
        Self {
            vaccinations,
            due_soon_days,
        }
    }

    /// Ensure a row exists for every scheduled vaccine and return the child's rows
    pub async fn materialize(&self, child: &Child) -> DomainResult<Vec<Vaccination>> {
        let planned = planned_doses(child.country, child.dob);
        let rows: Vec<(&str, NaiveDate)> = planned.iter().map(|d| (d.name, d.due_date)).collect();

        let created = self.vaccinations.ensure_rows(child.id, &rows).await?;
        if created > 0 {
            info!("Created {} vaccination rows for child {}", created, child.id);
        } else {
            debug!("Vaccination rows already present for child {}", child.id);
        }

        Ok(self.vaccinations.list_for_child(child.id).await?)
    }

    /// Drop the child's rows and materialize them again from scratch
    pub async fn rebuild(&self, child: &Child) -> DomainResult<Vec<Vaccination>> {
        let removed = self.vaccinations.delete_for_child(child.id).await?;
        info!("Removed {} vaccination rows for child {} before rebuild", removed, child.id);
        self.materialize(child).await
    }

    pub fn stats<D: DoseStatus>(&self, records: &[D], today: NaiveDate) -> ChildStats {
        child_stats(records, today, self.due_soon_days)
    }
}
