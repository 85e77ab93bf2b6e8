use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::schedule_data::Country;

/// Guest child kept in the session of an unauthenticated visitor.
///
/// Completions are keyed by age label, then vaccine name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestSession {
    pub name: String,
    pub dob: NaiveDate,
    pub country: Country,
    #[serde(default)]
    pub completions: BTreeMap<String, BTreeMap<String, NaiveDate>>,
}

impl GuestSession {
    pub fn new(name: String, dob: NaiveDate, country: Country) -> Self {
        Self {
            name,
            dob,
            country,
            completions: BTreeMap::new(),
        }
    }

    /// Completion date recorded for a vaccine, if any
    pub fn completion_for(&self, vaccine: &str) -> Option<NaiveDate> {
        self.completions
            .values()
            .find_map(|group| group.get(vaccine).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_lookup_across_groups() {
        let mut guest = GuestSession::new(
            "Asha".to_string(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            Country::India,
        );
        let date = NaiveDate::from_ymd_opt(2024, 2, 12).unwrap();
        guest
            .completions
            .entry("6 Weeks".to_string())
            .or_default()
            .insert("IPV-1".to_string(), date);

        assert_eq!(guest.completion_for("IPV-1"), Some(date));
        assert_eq!(guest.completion_for("BCG"), None);
    }

    #[test]
    fn test_session_round_trip_keeps_country() {
        let guest = GuestSession::new(
            "Sam".to_string(),
            NaiveDate::from_ymd_opt(2023, 5, 1).unwrap(),
            Country::Uk,
        );
        let json = serde_json::to_value(&guest).unwrap();
        assert_eq!(json["country"], "UK");
        let back: GuestSession = serde_json::from_value(json).unwrap();
        assert_eq!(back, guest);
    }
}
