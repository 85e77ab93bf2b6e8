use crate::domain::models::{DoseStatus, Vaccination};
use crate::domain::schedule_data::{Country, Milestone as DomainMilestone};
use crate::domain::schedule_service::ScheduleGroup;
use shared::{CountrySchedule, Milestone, ScheduleEntry, VaccineRecord};

/// Mapper from schedule groups and doses to shared schedule DTOs
pub struct ScheduleMapper;

impl ScheduleMapper {
    pub fn to_entry(group: ScheduleGroup) -> ScheduleEntry {
        ScheduleEntry {
            age: group.milestone.age.to_string(),
            vaccines: group.milestone.vaccines.iter().map(|v| v.to_string()).collect(),
            due_date: group.due_date,
            status: group.status,
            status_class: group.status.css_class().to_string(),
            status_text: group.status.label().to_string(),
            vaccine_records: group.doses.iter().map(Self::to_record).collect(),
            group_completed: group.group_completed,
            group_completed_date: group.group_completed_date,
        }
    }

    pub fn to_entries(groups: Vec<ScheduleGroup>) -> Vec<ScheduleEntry> {
        groups.into_iter().map(Self::to_entry).collect()
    }

    pub fn to_record<D: DoseStatus>(dose: &D) -> VaccineRecord {
        VaccineRecord {
            id: dose.record_id(),
            name: dose.name().to_string(),
            due_date: dose.due_date(),
            completed_at: dose.completed_at(),
        }
    }

    pub fn to_records(vaccinations: &[Vaccination]) -> Vec<VaccineRecord> {
        vaccinations.iter().map(Self::to_record).collect()
    }

    pub fn to_milestone(milestone: &DomainMilestone) -> Milestone {
        Milestone {
            age: milestone.age.to_string(),
            vaccines: milestone.vaccines.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn to_country_schedule(country: Country, milestones: &[DomainMilestone]) -> CountrySchedule {
        CountrySchedule {
            country: country.to_string(),
            milestones: milestones.iter().map(Self::to_milestone).collect(),
        }
    }
}
