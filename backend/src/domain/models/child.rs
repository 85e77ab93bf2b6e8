use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::schedule_data::Country;

/// A child whose vaccinations are tracked
#[derive(Debug, Clone, PartialEq)]
pub struct Child {
    pub id: i64,
    pub parent_id: i64,
    pub name: String,
    pub dob: NaiveDate,
    pub country: Country,
    pub created_at: DateTime<Utc>,
}

/// Values needed to insert a new child row
#[derive(Debug, Clone)]
pub struct NewChild {
    pub parent_id: i64,
    pub name: String,
    pub dob: NaiveDate,
    pub country: Country,
}
