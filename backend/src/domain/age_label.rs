//! Age labels and due-date arithmetic.
//!
//! Labels look like `Birth`, `6 Weeks`, `6-9 Months`, `4-6 Years` or
//! `3 Years 4 Months`. A ranged number counts from its lower bound.

use chrono::{Days, Months, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeUnit {
    Weeks,
    Months,
    Years,
}

impl AgeUnit {
    fn from_token(token: &str) -> Option<Self> {
        let token = token.to_lowercase();
        if token.starts_with("week") {
            Some(AgeUnit::Weeks)
        } else if token.starts_with("month") {
            Some(AgeUnit::Months)
        } else if token.starts_with("year") {
            Some(AgeUnit::Years)
        } else {
            None
        }
    }
}

/// A parsed age label: a list of offsets applied to the date of birth in order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AgeLabel {
    offsets: Vec<(u32, AgeUnit)>,
}

impl AgeLabel {
    /// Parse a label. Unknown words (such as `Birth`) contribute no offset.
    pub fn parse(label: &str) -> Self {
        let tokens: Vec<&str> = label.split_whitespace().collect();
        let mut offsets = Vec::new();

        let mut i = 0;
        while i < tokens.len() {
            let unit = tokens.get(i + 1).and_then(|t| AgeUnit::from_token(t));
            match unit {
                Some(unit) => {
                    offsets.push((parse_amount(tokens[i]), unit));
                    i += 2;
                }
                None => i += 1,
            }
        }

        Self { offsets }
    }

    pub fn offsets(&self) -> &[(u32, AgeUnit)] {
        &self.offsets
    }

    /// Apply the label to a date of birth.
    ///
    /// Month and year steps clamp to the end of the target month, so
    /// Jan 31 + 1 month is the last day of February and Feb 29 + 1 year is
    /// Feb 28. Results outside chrono's range fall back to `dob`.
    pub fn apply(&self, dob: NaiveDate) -> NaiveDate {
        self.offsets
            .iter()
            .try_fold(dob, |date, (amount, unit)| match unit {
                AgeUnit::Weeks => date.checked_add_days(Days::new(u64::from(*amount) * 7)),
                AgeUnit::Months => date.checked_add_months(Months::new(*amount)),
                AgeUnit::Years => amount
                    .checked_mul(12)
                    .and_then(|months| date.checked_add_months(Months::new(months))),
            })
            .unwrap_or(dob)
    }
}

/// `6` -> 6, `6-9` -> 6, anything unparsable -> 0
fn parse_amount(token: &str) -> u32 {
    let lower = token.split('-').next().unwrap_or_default();
    lower.trim().parse().unwrap_or(0)
}

/// Due date for a milestone label given a date of birth
pub fn due_date(dob: NaiveDate, label: &str) -> NaiveDate {
    AgeLabel::parse(label).apply(dob)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_birth_is_dob() {
        let dob = date(2024, 1, 15);
        assert_eq!(due_date(dob, "Birth"), dob);
        assert_eq!(due_date(dob, ""), dob);
    }

    #[test]
    fn test_weeks() {
        let dob = date(2024, 1, 1);
        assert_eq!(due_date(dob, "6 Weeks"), date(2024, 2, 12));
        assert_eq!(due_date(dob, "14 weeks"), dob + Days::new(98));
    }

    #[test]
    fn test_months_clamp_to_month_end() {
        assert_eq!(due_date(date(2024, 1, 31), "1 Month"), date(2024, 2, 29));
        assert_eq!(due_date(date(2023, 1, 31), "1 Month"), date(2023, 2, 28));
        assert_eq!(due_date(date(2024, 1, 31), "6 Months"), date(2024, 7, 31));
        assert_eq!(due_date(date(2024, 8, 31), "7 Months"), date(2025, 3, 31));
        assert_eq!(due_date(date(2024, 3, 31), "6 Months"), date(2024, 9, 30));
    }

    #[test]
    fn test_ranges_use_lower_bound() {
        let dob = date(2024, 1, 10);
        assert_eq!(due_date(dob, "6-9 Months"), date(2024, 7, 10));
        assert_eq!(due_date(dob, "4-6 Years"), date(2028, 1, 10));
        assert_eq!(due_date(dob, "16-18 Months"), date(2025, 5, 10));
    }

    #[test]
    fn test_years_from_leap_day() {
        assert_eq!(due_date(date(2024, 2, 29), "1 Year"), date(2025, 2, 28));
        assert_eq!(due_date(date(2024, 2, 29), "4 Years"), date(2028, 2, 29));
    }

    #[test]
    fn test_compound_label() {
        let dob = date(2023, 10, 31);
        // 3 years -> 2026-10-31, then 4 months -> 2027-02-28
        assert_eq!(due_date(dob, "3 Years 4 Months"), date(2027, 2, 28));
    }

    #[test]
    fn test_unparsable_amount_counts_as_zero() {
        let dob = date(2024, 5, 5);
        assert_eq!(due_date(dob, "Few Weeks"), dob);
        assert_eq!(AgeLabel::parse("Few Weeks").offsets(), &[(0, AgeUnit::Weeks)]);
    }

    #[test]
    fn test_overflow_falls_back_to_dob() {
        let dob = NaiveDate::MAX - Days::new(3);
        assert_eq!(due_date(dob, "10 Years"), dob);
    }
}
