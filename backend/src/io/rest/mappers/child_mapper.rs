use chrono::NaiveDate;

use crate::domain::models::{Child as DomainChild, GuestSession};
use crate::domain::{ChildDetail, GuestDetail};
use crate::io::rest::mappers::ScheduleMapper;
use shared::{
    Child as SharedChild, ChildDetailResponse, ChildListResponse, ChildResponse, ChildStats, ChildSummary,
    GuestChild, GuestChildResponse,
};

/// Mapper from domain children to shared Child DTOs
pub struct ChildMapper;

impl ChildMapper {
    pub fn to_dto(domain: DomainChild) -> SharedChild {
        SharedChild {
            id: domain.id,
            parent_id: domain.parent_id,
            name: domain.name,
            dob: domain.dob,
            country: domain.country.to_string(),
            created_at: domain.created_at,
        }
    }

    pub fn to_response(domain: DomainChild, message: &str) -> ChildResponse {
        ChildResponse {
            child: Self::to_dto(domain),
            success_message: message.to_string(),
        }
    }

    pub fn to_child_list_dto(domain_children: Vec<DomainChild>) -> ChildListResponse {
        ChildListResponse {
            children: domain_children.into_iter().map(Self::to_dto).collect(),
        }
    }

    pub fn to_detail_dto(detail: ChildDetail, today: NaiveDate) -> ChildDetailResponse {
        ChildDetailResponse {
            child: Self::to_dto(detail.child),
            schedule: ScheduleMapper::to_entries(detail.schedule),
            stats: detail.stats,
            today,
        }
    }

    pub fn to_summary_dto(domain: DomainChild, stats: ChildStats) -> ChildSummary {
        ChildSummary {
            child: Self::to_dto(domain),
            stats,
        }
    }

    pub fn to_guest_dto(guest: &GuestSession) -> GuestChild {
        GuestChild {
            name: guest.name.clone(),
            dob: guest.dob,
            country: guest.country.to_string(),
        }
    }

    pub fn to_guest_response(guest: &GuestSession, detail: GuestDetail, today: NaiveDate) -> GuestChildResponse {
        GuestChildResponse {
            child: Self::to_guest_dto(guest),
            schedule: ScheduleMapper::to_entries(detail.schedule),
            stats: detail.stats,
            today,
        }
    }
}
