use chrono::{DateTime, NaiveDate, Utc};

/// Anything that carries a due date and an optional completion date.
///
/// Persisted vaccinations and guest-session doses share the same status
/// rules, so statistics are computed over this trait.
pub trait DoseStatus {
    fn name(&self) -> &str;
    fn due_date(&self) -> NaiveDate;
    fn completed_at(&self) -> Option<NaiveDate>;

    /// Storage id, when the dose is persisted
    fn record_id(&self) -> Option<i64> {
        None
    }

    fn is_completed(&self) -> bool {
        self.completed_at().is_some()
    }
}

/// A persisted vaccination row
#[derive(Debug, Clone, PartialEq)]
pub struct Vaccination {
    pub id: i64,
    pub child_id: i64,
    pub name: String,
    pub due_date: NaiveDate,
    pub completed_at: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl DoseStatus for Vaccination {
    fn name(&self) -> &str {
        &self.name
    }

    fn record_id(&self) -> Option<i64> {
        Some(self.id)
    }

    fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    fn completed_at(&self) -> Option<NaiveDate> {
        self.completed_at
    }
}

/// A dose computed for a guest child; never persisted
#[derive(Debug, Clone, PartialEq)]
pub struct GuestDose {
    pub name: String,
    pub due_date: NaiveDate,
    pub completed_at: Option<NaiveDate>,
}

impl DoseStatus for GuestDose {
    fn name(&self) -> &str {
        &self.name
    }

    fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    fn completed_at(&self) -> Option<NaiveDate> {
        self.completed_at
    }
}
