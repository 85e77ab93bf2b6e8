//! Guest children: a schedule for visitors without an account.
//!
//! The guest child lives in the visitor's session only. Doses are derived
//! from the schedule table on every request; completions are kept per age
//! group. Registering an account merges the guest child into the database.

use chrono::NaiveDate;
use shared::{ChildStats, CreateChildRequest};
use tracing::{error, info, warn};

use crate::domain::child_service::ChildService;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Child, GuestDose, GuestSession};
use crate::domain::schedule_data::{milestone_by_label, Milestone};
use crate::domain::schedule_service::{build_entries, child_stats, planned_doses, ScheduleGroup};
use crate::domain::validation::{sanitize_text, validate_child_form, validate_completion_date, ChildForm};
use crate::storage::VaccinationRepository;

const AGE_LABEL_MAX: usize = 50;

/// Evaluated guest schedule
#[derive(Debug, Clone)]
pub struct GuestDetail {
    pub schedule: Vec<ScheduleGroup>,
    pub stats: ChildStats,
}

/// In-memory doses of a guest child, with any recorded completions
pub fn guest_doses(guest: &GuestSession) -> Vec<GuestDose> {
    planned_doses(guest.country, guest.dob)
        .into_iter()
        .map(|dose| GuestDose {
            name: dose.name.to_string(),
            due_date: dose.due_date,
            completed_at: guest.completions.get(dose.age).and_then(|group| group.get(dose.name).copied()),
        })
        .collect()
}

#[derive(Clone)]
pub struct GuestService {
    child_service: ChildService,
    vaccinations: VaccinationRepository,
    due_soon_days: u32,
}

impl GuestService {
    pub fn new(child_service: ChildService, vaccinations: VaccinationRepository, due_soon_days: u32) -> Self {
        Self {
            child_service,
            vaccinations,
            due_soon_days,
        }
    }

    /// Validate the form and start a fresh guest child; earlier completions are dropped
    pub fn set_guest_child(&self, request: &CreateChildRequest, today: NaiveDate) -> DomainResult<GuestSession> {
        let form = validate_child_form(&request.name, &request.dob, request.country.as_deref(), today)?;
        info!("Setting guest child: name={}, dob={}, country={}", form.name, form.dob, form.country);
        Ok(GuestSession::new(form.name, form.dob, form.country))
    }

    pub fn guest_detail(&self, guest: &GuestSession, today: NaiveDate) -> GuestDetail {
        let doses = guest_doses(guest);
        GuestDetail {
            schedule: build_entries(guest.country, guest.dob, &doses, today),
            stats: child_stats(&doses, today, self.due_soon_days),
        }
    }

    /// Mark every vaccine of the age group named by `age` as completed.
    /// Vaccines of the group that already carry a date keep it.
    pub fn guest_mark_complete(
        &self,
        guest: &mut GuestSession,
        age: &str,
        date: Option<&str>,
        today: NaiveDate,
    ) -> DomainResult<&'static Milestone> {
        let label = sanitize_text(age, AGE_LABEL_MAX);
        if label.is_empty() {
            return Err(DomainError::validation("Age group is required."));
        }
        let milestone = milestone_by_label(guest.country, &label)
            .ok_or_else(|| DomainError::validation(format!("Unknown age group: {}", label)))?;
        let completed_at = validate_completion_date(date, guest.dob, today)?;

        let group = guest.completions.entry(milestone.age.to_string()).or_default();
        for vaccine in milestone.vaccines {
            group.entry(vaccine.to_string()).or_insert(completed_at);
        }

        info!("Guest completed age group {} on {}", milestone.age, completed_at);
        Ok(milestone)
    }

    /// Persist the guest child for a newly registered parent, applying the
    /// recorded completions to the materialized rows.
    pub async fn merge_into_parent(&self, parent_id: i64, guest: &GuestSession) -> DomainResult<Child> {
        info!("Merging guest child {} into parent {}", guest.name, parent_id);

        let child = self
            .child_service
            .create_from_form(
                parent_id,
                ChildForm {
                    name: guest.name.clone(),
                    dob: guest.dob,
                    country: guest.country,
                },
            )
            .await?;

        let completions: Vec<(&str, NaiveDate)> = guest
            .completions
            .values()
            .flat_map(|group| group.iter().map(|(name, date)| (name.as_str(), *date)))
            .collect();

        let applied = match self.vaccinations.apply_completions(child.id, &completions).await {
            Ok(applied) => applied,
            Err(e) => {
                warn!("Applying guest completions failed, removing child {}: {}", child.id, e);
                if let Err(cleanup) = self.child_service.delete_child(parent_id, child.id).await {
                    error!("Failed to remove partially merged child {}: {}", child.id, cleanup);
                }
                return Err(e.into());
            }
        };

        info!("Merged guest child as {} with {} completions", child.id, applied);
        Ok(child)
    }
}
