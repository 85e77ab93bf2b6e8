use chrono::NaiveDate;
use shared::{ChildStats, CompletionScope, CreateChildRequest, UpdateChildRequest};
use tracing::{info, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::child::NewChild;
use crate::domain::models::{Child, Vaccination};
use crate::domain::schedule_data::milestone_for_vaccine;
use crate::domain::schedule_service::{build_entries, ScheduleGroup, ScheduleService};
use crate::domain::validation::{validate_child_form, validate_completion_date, ChildForm};
use crate::storage::{ChildRepository, VaccinationRepository};

/// A child with its materialized schedule
#[derive(Debug, Clone)]
pub struct ChildDetail {
    pub child: Child,
    pub vaccinations: Vec<Vaccination>,
    pub schedule: Vec<ScheduleGroup>,
    pub stats: ChildStats,
}

/// Service for managing a parent's children and their vaccinations
#[derive(Clone)]
pub struct ChildService {
    children: ChildRepository,
    vaccinations: VaccinationRepository,
    schedule: ScheduleService,
}

impl ChildService {
    pub fn new(children: ChildRepository, vaccinations: VaccinationRepository, schedule: ScheduleService) -> Self {
        Self {
            children,
            vaccinations,
            schedule,
        }
    }

    /// Validate and create a child, then materialize its schedule
    pub async fn create_child(
        &self,
        parent_id: i64,
        request: &CreateChildRequest,
        today: NaiveDate,
    ) -> DomainResult<Child> {
        let form = validate_child_form(&request.name, &request.dob, request.country.as_deref(), today)?;
        self.create_from_form(parent_id, form).await
    }

    /// Create a child from already validated values
    pub async fn create_from_form(&self, parent_id: i64, form: ChildForm) -> DomainResult<Child> {
        info!("Creating child for parent {}: name={}, dob={}, country={}", parent_id, form.name, form.dob, form.country);

        let child = self
            .children
            .store_child(&NewChild {
                parent_id,
                name: form.name,
                dob: form.dob,
                country: form.country,
            })
            .await?;
        self.schedule.materialize(&child).await?;

        info!("Created child: {} with ID: {}", child.name, child.id);
        Ok(child)
    }

    pub async fn list_children(&self, parent_id: i64) -> DomainResult<Vec<Child>> {
        let children = self.children.list_children(parent_id).await?;
        info!("Found {} children for parent {}", children.len(), parent_id);
        Ok(children)
    }

    /// Fetch a child owned by the parent; anything else is not found
    pub async fn get_child(&self, parent_id: i64, child_id: i64) -> DomainResult<Child> {
        match self.children.get_child(parent_id, child_id).await? {
            Some(child) => Ok(child),
            None => {
                warn!("Child {} not found for parent {}", child_id, parent_id);
                Err(DomainError::NotFound("Child"))
            }
        }
    }

    pub async fn get_child_detail(&self, parent_id: i64, child_id: i64, today: NaiveDate) -> DomainResult<ChildDetail> {
        let child = self.get_child(parent_id, child_id).await?;
        self.detail_for(child, today).await
    }

    /// Materialize and evaluate the schedule of a child that is already loaded
    pub async fn detail_for(&self, child: Child, today: NaiveDate) -> DomainResult<ChildDetail> {
        let vaccinations = self.schedule.materialize(&child).await?;
        let schedule = build_entries(child.country, child.dob, &vaccinations, today);
        let stats = self.schedule.stats(&vaccinations, today);
        Ok(ChildDetail {
            child,
            vaccinations,
            schedule,
            stats,
        })
    }

    /// Update name, date of birth and country. A new date of birth or
    /// country invalidates the schedule, so the rows are rebuilt.
    pub async fn update_child(
        &self,
        parent_id: i64,
        child_id: i64,
        request: &UpdateChildRequest,
        today: NaiveDate,
    ) -> DomainResult<Child> {
        info!("Updating child {} of parent {}", child_id, parent_id);
        let mut child = self.get_child(parent_id, child_id).await?;

        let country = request.country.as_deref().or(Some(child.country.as_str()));
        let form = validate_child_form(&request.name, &request.dob, country, today)?;
        let schedule_changed = form.dob != child.dob || form.country != child.country;

        child.name = form.name;
        child.dob = form.dob;
        child.country = form.country;
        self.children.update_child(&child).await?;

        if schedule_changed {
            info!("Schedule inputs changed for child {}, rebuilding vaccinations", child.id);
            self.schedule.rebuild(&child).await?;
        }

        Ok(child)
    }

    /// Delete a child and, by cascade, its vaccinations
    pub async fn delete_child(&self, parent_id: i64, child_id: i64) -> DomainResult<()> {
        info!("Deleting child {} of parent {}", child_id, parent_id);
        if self.children.delete_child(parent_id, child_id).await? {
            Ok(())
        } else {
            Err(DomainError::NotFound("Child"))
        }
    }

    /// Record a completion date. `Group` also completes the still pending
    /// vaccines of the same age group; `Single` touches only `vaccine`.
    /// Returns the affected rows after the update.
    pub async fn mark_complete(
        &self,
        parent_id: i64,
        child_id: i64,
        vaccine: &str,
        date: Option<&str>,
        scope: CompletionScope,
        today: NaiveDate,
    ) -> DomainResult<Vec<Vaccination>> {
        let child = self.get_child(parent_id, child_id).await?;
        let vaccine = vaccine.trim();
        if vaccine.is_empty() {
            return Err(DomainError::validation("Vaccine is required."));
        }
        let milestone = milestone_for_vaccine(child.country, vaccine).ok_or_else(|| {
            DomainError::validation(format!("{} is not part of the {} schedule.", vaccine, child.country))
        })?;
        let completed_at = validate_completion_date(date, child.dob, today)?;

        self.schedule.materialize(&child).await?;
        self.vaccinations
            .set_completion(child.id, vaccine, Some(completed_at))
            .await?;

        let affected: Vec<&str> = match scope {
            CompletionScope::Single => vec![vaccine],
            CompletionScope::Group => {
                let updated = self
                    .vaccinations
                    .complete_pending(child.id, milestone.vaccines, completed_at)
                    .await?;
                info!("Completed {} pending vaccines of group {} for child {}", updated, milestone.age, child.id);
                milestone.vaccines.to_vec()
            }
        };

        info!("Marked {} complete on {} for child {}", vaccine, completed_at, child.id);

        let rows = self.vaccinations.list_for_child(child.id).await?;
        Ok(rows
            .into_iter()
            .filter(|row| affected.contains(&row.name.as_str()))
            .collect())
    }

    /// Reset a vaccine to not completed
    pub async fn clear_completion(&self, parent_id: i64, child_id: i64, vaccine: &str) -> DomainResult<Vaccination> {
        let child = self.get_child(parent_id, child_id).await?;
        let vaccine = vaccine.trim();

        if !self.vaccinations.set_completion(child.id, vaccine, None).await? {
            return Err(DomainError::NotFound("Vaccination"));
        }
        info!("Cleared completion of {} for child {}", vaccine, child.id);

        self.vaccinations
            .list_for_child(child.id)
            .await?
            .into_iter()
            .find(|row| row.name == vaccine)
            .ok_or(DomainError::NotFound("Vaccination"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::parent::NewParent;
    use crate::domain::schedule_data::Country;
    use crate::domain::schedule_service::{planned_doses, DEFAULT_DUE_SOON_DAYS};
    use crate::storage::{DbConnection, ParentRepository};
    use shared::ScheduleStatus;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2024, 6, 1)
    }

    async fn setup_test() -> (ChildService, ParentRepository, i64) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let parents = ParentRepository::new(db.clone());
        let parent = parents
            .store_parent(&NewParent {
                name: "Parent".to_string(),
                age: Some(30),
                email: "parent@example.com".to_string(),
                password_hash: "x".to_string(),
            })
            .await
            .unwrap();
        let vaccinations = VaccinationRepository::new(db.clone());
        let schedule = ScheduleService::new(vaccinations.clone(), DEFAULT_DUE_SOON_DAYS);
        let service = ChildService::new(ChildRepository::new(db), vaccinations, schedule);
        (service, parents, parent.id)
    }

    fn create_request(name: &str, dob: &str, country: Option<&str>) -> CreateChildRequest {
        CreateChildRequest {
            name: name.to_string(),
            dob: dob.to_string(),
            country: country.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_create_child_materializes_schedule() {
        let (service, _, parent_id) = setup_test().await;

        let child = service
            .create_child(parent_id, &create_request("Asha", "2024-01-01", None), today())
            .await
            .unwrap();
        assert_eq!(child.country, Country::India);

        let detail = service.get_child_detail(parent_id, child.id, today()).await.unwrap();
        assert_eq!(detail.vaccinations.len(), planned_doses(Country::India, child.dob).len());
        assert_eq!(detail.schedule[0].status, ScheduleStatus::DueOrOverdue);
        assert_eq!(detail.stats.completed, 0);
    }

    #[tokio::test]
    async fn test_create_child_rejects_invalid_form() {
        let (service, _, parent_id) = setup_test().await;

        let result = service
            .create_child(parent_id, &create_request("A", "2030-01-01", None), today())
            .await;

        assert!(matches!(result, Err(DomainError::Validation(ref e)) if e.len() == 2));
        assert!(service.list_children(parent_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_children_are_scoped_to_parent() {
        let (service, _, parent_id) = setup_test().await;
        let child = service
            .create_child(parent_id, &create_request("Asha", "2024-01-01", None), today())
            .await
            .unwrap();

        let other_parent = parent_id + 100;
        assert!(matches!(
            service.get_child_detail(other_parent, child.id, today()).await,
            Err(DomainError::NotFound("Child"))
        ));
        assert!(matches!(
            service.delete_child(other_parent, child.id).await,
            Err(DomainError::NotFound("Child"))
        ));
    }

    #[tokio::test]
    async fn test_mark_complete_group_scope() {
        let (service, _, parent_id) = setup_test().await;
        let child = service
            .create_child(parent_id, &create_request("Asha", "2024-01-01", None), today())
            .await
            .unwrap();

        service
            .mark_complete(parent_id, child.id, "Hib-1", Some("2024-02-10"), CompletionScope::Single, today())
            .await
            .unwrap();
        let updated = service
            .mark_complete(parent_id, child.id, "IPV-1", Some("2024-02-14"), CompletionScope::Group, today())
            .await
            .unwrap();

        assert_eq!(updated.len(), 6);
        let hib = updated.iter().find(|v| v.name == "Hib-1").unwrap();
        assert_eq!(hib.completed_at, Some(date(2024, 2, 10)));
        assert!(updated
            .iter()
            .filter(|v| v.name != "Hib-1")
            .all(|v| v.completed_at == Some(date(2024, 2, 14))));

        let detail = service.get_child_detail(parent_id, child.id, today()).await.unwrap();
        assert!(detail.schedule[1].group_completed);
        assert_eq!(detail.schedule[1].status, ScheduleStatus::Completed);
        assert_eq!(detail.schedule[1].group_completed_date, Some(date(2024, 2, 10)));
        assert!(!detail.schedule[2].group_completed);
    }

    #[tokio::test]
    async fn test_mark_complete_single_scope() {
        let (service, _, parent_id) = setup_test().await;
        let child = service
            .create_child(parent_id, &create_request("Asha", "2024-01-01", None), today())
            .await
            .unwrap();

        let updated = service
            .mark_complete(parent_id, child.id, "BCG", None, CompletionScope::Single, today())
            .await
            .unwrap();

        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].completed_at, Some(today()));
        let detail = service.get_child_detail(parent_id, child.id, today()).await.unwrap();
        assert_eq!(detail.stats.completed, 1);
        assert!(!detail.schedule[0].group_completed);
    }

    #[tokio::test]
    async fn test_mark_complete_rejects_bad_input() {
        let (service, _, parent_id) = setup_test().await;
        let child = service
            .create_child(parent_id, &create_request("Asha", "2024-01-01", Some("UK")), today())
            .await
            .unwrap();

        let not_in_schedule = service
            .mark_complete(parent_id, child.id, "BCG", None, CompletionScope::Group, today())
            .await;
        assert!(matches!(not_in_schedule, Err(DomainError::Validation(_))));

        let before_birth = service
            .mark_complete(parent_id, child.id, "MenB-1", Some("2023-12-01"), CompletionScope::Group, today())
            .await;
        assert!(matches!(before_birth, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_clear_completion() {
        let (service, _, parent_id) = setup_test().await;
        let child = service
            .create_child(parent_id, &create_request("Asha", "2024-01-01", None), today())
            .await
            .unwrap();
        service
            .mark_complete(parent_id, child.id, "BCG", None, CompletionScope::Group, today())
            .await
            .unwrap();

        let cleared = service.clear_completion(parent_id, child.id, "BCG").await.unwrap();
        assert_eq!(cleared.completed_at, None);

        assert!(matches!(
            service.clear_completion(parent_id, child.id, "Unknown").await,
            Err(DomainError::NotFound("Vaccination"))
        ));
    }

    #[tokio::test]
    async fn test_update_child_rebuilds_on_dob_change() {
        let (service, _, parent_id) = setup_test().await;
        let child = service
            .create_child(parent_id, &create_request("Asha", "2024-01-01", None), today())
            .await
            .unwrap();
        service
            .mark_complete(parent_id, child.id, "BCG", None, CompletionScope::Group, today())
            .await
            .unwrap();

        let updated = service
            .update_child(
                parent_id,
                child.id,
                &UpdateChildRequest {
                    name: "Asha R".to_string(),
                    dob: "2024-02-01".to_string(),
                    country: None,
                },
                today(),
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Asha R");
        assert_eq!(updated.country, Country::India);

        let detail = service.get_child_detail(parent_id, child.id, today()).await.unwrap();
        assert_eq!(detail.stats.completed, 0);
        let bcg = detail.vaccinations.iter().find(|v| v.name == "BCG").unwrap();
        assert_eq!(bcg.due_date, date(2024, 2, 1));
    }

    #[tokio::test]
    async fn test_update_child_keeps_completions_on_rename() {
        let (service, _, parent_id) = setup_test().await;
        let child = service
            .create_child(parent_id, &create_request("Asha", "2024-01-01", None), today())
            .await
            .unwrap();
        service
            .mark_complete(parent_id, child.id, "BCG", None, CompletionScope::Single, today())
            .await
            .unwrap();

        service
            .update_child(
                parent_id,
                child.id,
                &UpdateChildRequest {
                    name: "Asha Rao".to_string(),
                    dob: "2024-01-01".to_string(),
                    country: Some("India".to_string()),
                },
                today(),
            )
            .await
            .unwrap();

        let detail = service.get_child_detail(parent_id, child.id, today()).await.unwrap();
        assert_eq!(detail.child.name, "Asha Rao");
        assert_eq!(detail.stats.completed, 1);
    }

    #[tokio::test]
    async fn test_update_child_country_switch() {
        let (service, _, parent_id) = setup_test().await;
        let child = service
            .create_child(parent_id, &create_request("Asha", "2024-01-01", None), today())
            .await
            .unwrap();

        service
            .update_child(
                parent_id,
                child.id,
                &UpdateChildRequest {
                    name: "Asha".to_string(),
                    dob: "2024-01-01".to_string(),
                    country: Some("USA".to_string()),
                },
                today(),
            )
            .await
            .unwrap();

        let detail = service.get_child_detail(parent_id, child.id, today()).await.unwrap();
        assert_eq!(detail.child.country, Country::Usa);
        assert_eq!(detail.vaccinations.len(), planned_doses(Country::Usa, child.dob).len());
        assert!(detail.vaccinations.iter().all(|v| v.name != "BCG"));
    }

    #[tokio::test]
    async fn test_delete_parent_cascades_to_children() {
        let (service, parents, parent_id) = setup_test().await;
        service
            .create_child(parent_id, &create_request("Asha", "2024-01-01", None), today())
            .await
            .unwrap();

        parents.delete_parent(parent_id).await.unwrap();

        assert!(service.list_children(parent_id).await.unwrap().is_empty());
    }
}
