//! Server-side input sanitisation and form validation.
//!
//! Validators return every problem they find as a display message so that
//! forms can show them together.

use chrono::{Months, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::schedule_data::Country;

pub const CHILD_NAME_MAX: usize = 100;
pub const PARENT_NAME_MAX: usize = 120;
pub const EMAIL_MAX: usize = 180;
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_PARENT_AGE: i32 = 18;
pub const MAX_CHILD_AGE_YEARS: u32 = 18;

static CONTROL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F]").expect("valid regex"));

static SCRIPT_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<\s*/?\s*script[^>]*>").expect("valid regex"));

// Words only match whole words so that names such as "Walter" survive.
static DISALLOWED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(select|insert|update|delete|drop|truncate|alter|create|grant|revoke|union|sleep|benchmark)\b|--|;|/\*|\*/",
    )
    .expect("valid regex")
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"));

/// True when the value contains SQL keywords or comment/statement tokens
pub fn has_disallowed_keywords(value: &str) -> bool {
    DISALLOWED.is_match(value)
}

/// Strip control characters, script tags, angle brackets and SQL tokens,
/// collapse whitespace and truncate to `max_len` characters.
pub fn sanitize_text(value: &str, max_len: usize) -> String {
    let s = CONTROL_CHARS.replace_all(value, "");
    let s = SCRIPT_TAG.replace_all(&s, "");
    let s = s.replace(['<', '>'], "");
    let s = DISALLOWED.replace_all(&s, "");
    let s = WHITESPACE.replace_all(&s, " ");
    s.trim().chars().take(max_len).collect()
}

/// Letters, digits, spaces, hyphens and apostrophes; at least 2 characters
pub fn validate_name(name: &str, field_label: &str, max_len: usize) -> Vec<String> {
    let mut errors = Vec::new();
    let s = name.trim();

    if s.is_empty() {
        errors.push(format!("{} is required.", field_label));
        return errors;
    }
    if s.chars().count() < 2 {
        errors.push(format!("{} must be at least 2 characters.", field_label));
        return errors;
    }
    if s.chars().count() > max_len {
        errors.push(format!("{} must be at most {} characters.", field_label, max_len));
    }

    let valid = s
        .chars()
        .all(|ch| ch.is_alphanumeric() || ch.is_whitespace() || matches!(ch, '-' | '\'' | '\u{2019}'));
    if !valid {
        errors.push(format!("{} contains invalid characters.", field_label));
    }

    errors
}

pub fn validate_email(email: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if email.is_empty() {
        errors.push("Email is required.".to_string());
        return errors;
    }
    if email.len() > EMAIL_MAX || !EMAIL.is_match(email) {
        errors.push("Invalid email format.".to_string());
    }
    errors
}

/// Validate the parent age field: required, numeric, adult
pub fn validate_parent_age(age: &str, errors: &mut Vec<String>) -> Option<i32> {
    let age = age.trim();
    if age.is_empty() {
        errors.push("Age is required.".to_string());
        return None;
    }
    match age.parse::<i32>() {
        Ok(value) if value < MIN_PARENT_AGE => {
            errors.push("Parent must be at least 18 years old.".to_string());
            None
        }
        Ok(value) if value > 150 => {
            errors.push("Age must be a realistic number.".to_string());
            None
        }
        Ok(value) => Some(value),
        Err(_) => {
            errors.push("Age must be a number.".to_string());
            None
        }
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// A child form that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ChildForm {
    pub name: String,
    pub dob: NaiveDate,
    pub country: Country,
}

/// Validate the child name, date of birth and country fields
pub fn validate_child_form(
    name: &str,
    dob: &str,
    country: Option<&str>,
    today: NaiveDate,
) -> DomainResult<ChildForm> {
    let mut errors = Vec::new();

    let clean_name = if has_disallowed_keywords(name) {
        errors.push("Child name contains invalid characters.".to_string());
        String::new()
    } else {
        let clean = sanitize_text(name, CHILD_NAME_MAX);
        errors.extend(validate_name(&clean, "Child name", CHILD_NAME_MAX));
        clean
    };

    let parsed_dob = if dob.trim().is_empty() {
        errors.push("Date of birth is required.".to_string());
        None
    } else {
        match parse_date(dob) {
            None => {
                errors.push("Invalid date format.".to_string());
                None
            }
            Some(d) if d > today => {
                errors.push("Date of birth cannot be in the future.".to_string());
                None
            }
            Some(d) => {
                let oldest = today
                    .checked_sub_months(Months::new(MAX_CHILD_AGE_YEARS * 12))
                    .unwrap_or(NaiveDate::MIN);
                if d < oldest {
                    errors.push("This tracker is designed for children under 18 years.".to_string());
                    None
                } else {
                    Some(d)
                }
            }
        }
    };

    let parsed_country = match country.map(str::trim).filter(|c| !c.is_empty()) {
        None => Some(Country::default()),
        Some(c) => match c.parse::<Country>() {
            Ok(country) => Some(country),
            Err(e) => {
                errors.push(e.to_string());
                None
            }
        },
    };

    match (parsed_dob, parsed_country) {
        (Some(dob), Some(country)) if errors.is_empty() => Ok(ChildForm {
            name: clean_name,
            dob,
            country,
        }),
        _ => Err(DomainError::Validation(errors)),
    }
}

/// Resolve a completion date: defaults to today, must fall between the date
/// of birth and today.
pub fn validate_completion_date(
    value: Option<&str>,
    dob: NaiveDate,
    today: NaiveDate,
) -> DomainResult<NaiveDate> {
    let date = match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => return Ok(today),
        Some(v) => parse_date(v).ok_or_else(|| DomainError::validation("Please enter a valid completion date."))?,
    };

    if date < dob {
        return Err(DomainError::validation("Completion date cannot be before date of birth."));
    }
    if date > today {
        return Err(DomainError::validation("Completion date cannot be in the future."));
    }

    Ok(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_disallowed_keywords() {
        assert!(has_disallowed_keywords("Robert'); DROP TABLE students"));
        assert!(has_disallowed_keywords("a -- comment"));
        assert!(has_disallowed_keywords("SELECT * from x"));
        assert!(!has_disallowed_keywords("Walter"));
        assert!(!has_disallowed_keywords("Mary-Jane O'Neil"));
    }

    #[test]
    fn test_keywords_match_whole_words_only() {
        for name in ["Walter", "Updated", "Selena", "Dropkin"] {
            assert!(!has_disallowed_keywords(name), "{}", name);
            assert_eq!(sanitize_text(name, 200), name);
        }
        assert!(has_disallowed_keywords("walter update"));
        assert_eq!(sanitize_text("Walter UPDATE Smith", 200), "Walter Smith");
        assert!(has_disallowed_keywords("Walter;"));
        assert!(has_disallowed_keywords("a/*b"));
    }

    #[test]
    fn test_sanitize_text_strips_markup_and_sql() {
        let cleaned = sanitize_text("<script>alert('x')</script> DROP TABLE users;", 200);
        assert_eq!(cleaned, "alert('x') TABLE users");

        assert_eq!(sanitize_text("  Asha\u{0007}   Rao  ", 200), "Asha Rao");
        assert_eq!(sanitize_text("<b>bold</b>", 200), "bbold/b");
        assert_eq!(sanitize_text("6 months; DROP", 200), "6 months");
        assert_eq!(sanitize_text("abcdef", 3), "abc");
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Rudra", "Name", 100).is_empty());
        assert!(validate_name("Zoë O\u{2019}Brien-Smith", "Name", 100).is_empty());
        assert_eq!(validate_name("", "Name", 100), vec!["Name is required."]);
        assert_eq!(validate_name(" A ", "Name", 100), vec!["Name must be at least 2 characters."]);
        assert_eq!(
            validate_name("alert('x')", "Child name", 100),
            vec!["Child name contains invalid characters."]
        );
        assert_eq!(validate_name("abc", "Name", 2), vec!["Name must be at most 2 characters."]);
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_empty());
        assert_eq!(validate_email(""), vec!["Email is required."]);
        assert_eq!(validate_email("not-an-email"), vec!["Invalid email format."]);
        assert_eq!(validate_email("a b@example.com"), vec!["Invalid email format."]);
    }

    #[test]
    fn test_validate_parent_age() {
        let mut errors = Vec::new();
        assert_eq!(validate_parent_age("30", &mut errors), Some(30));
        assert!(errors.is_empty());

        assert_eq!(validate_parent_age("abc", &mut errors), None);
        assert_eq!(validate_parent_age("17", &mut errors), None);
        assert_eq!(validate_parent_age("", &mut errors), None);
        assert_eq!(
            errors,
            vec![
                "Age must be a number.",
                "Parent must be at least 18 years old.",
                "Age is required.",
            ]
        );
    }

    #[test]
    fn test_child_form_valid() {
        let today = date(2024, 6, 1);
        let form = validate_child_form("  Asha  ", "2024-01-01", Some("uk"), today).unwrap();
        assert_eq!(form.name, "Asha");
        assert_eq!(form.dob, date(2024, 1, 1));
        assert_eq!(form.country, Country::Uk);

        let form = validate_child_form("Asha", "2024-01-01", None, today).unwrap();
        assert_eq!(form.country, Country::India);
    }

    #[test]
    fn test_child_form_collects_errors() {
        let today = date(2024, 6, 1);
        match validate_child_form("<script>alert('x')</script> DROP TABLE users;", "2025-01-01", Some("Mars"), today) {
            Err(DomainError::Validation(errors)) => {
                assert_eq!(
                    errors,
                    vec![
                        "Child name contains invalid characters.",
                        "Date of birth cannot be in the future.",
                        "No vaccination schedule for country: Mars",
                    ]
                );
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_child_form_date_rules() {
        let today = date(2024, 6, 1);
        let errors = |dob: &str| match validate_child_form("Asha", dob, None, today) {
            Err(DomainError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {:?}", other),
        };

        assert_eq!(errors(""), vec!["Date of birth is required."]);
        assert_eq!(errors("01/02/2024"), vec!["Invalid date format."]);
        assert_eq!(errors("2000-01-01"), vec!["This tracker is designed for children under 18 years."]);
        assert!(validate_child_form("Asha", "2024-06-01", None, today).is_ok());
    }

    #[test]
    fn test_completion_date() {
        let dob = date(2024, 1, 1);
        let today = date(2024, 6, 1);

        assert_eq!(validate_completion_date(None, dob, today).unwrap(), today);
        assert_eq!(validate_completion_date(Some(""), dob, today).unwrap(), today);
        assert_eq!(
            validate_completion_date(Some("2024-02-12"), dob, today).unwrap(),
            date(2024, 2, 12)
        );
        assert!(validate_completion_date(Some("2023-12-31"), dob, today).is_err());
        assert!(validate_completion_date(Some("2024-06-02"), dob, today).is_err());
        assert!(validate_completion_date(Some("yesterday"), dob, today).is_err());
    }
}
