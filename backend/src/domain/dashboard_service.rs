use chrono::NaiveDate;
use shared::{ChildStats, OverallStats};
use tracing::info;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Child, Parent};
use crate::domain::schedule_service::{overall_stats, ScheduleService};
use crate::storage::{ChildRepository, ParentRepository};

/// Everything the parent dashboard shows
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub parent: Parent,
    pub children: Vec<(Child, ChildStats)>,
    pub overall: OverallStats,
}

/// Service for the per-parent overview across all children
#[derive(Clone)]
pub struct DashboardService {
    parents: ParentRepository,
    children: ChildRepository,
    schedule: ScheduleService,
}

impl DashboardService {
    pub fn new(parents: ParentRepository, children: ChildRepository, schedule: ScheduleService) -> Self {
        Self {
            parents,
            children,
            schedule,
        }
    }

    /// Materialize every child's schedule and compute per-child and overall counts
    pub async fn dashboard(&self, parent_id: i64, today: NaiveDate) -> DomainResult<Dashboard> {
        info!("Building dashboard for parent {}", parent_id);

        let parent = self
            .parents
            .get_parent(parent_id)
            .await?
            .ok_or(DomainError::NotFound("Parent"))?;

        let mut children = Vec::new();
        for child in self.children.list_children(parent_id).await? {
            let vaccinations = self.schedule.materialize(&child).await?;
            let stats = self.schedule.stats(&vaccinations, today);
            children.push((child, stats));
        }

        let overall = overall_stats(children.iter().map(|(_, stats)| stats));

        Ok(Dashboard {
            parent,
            children,
            overall,
        })
    }
}
