//! iCalendar output: one all-day event per schedule milestone.

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::domain::schedule_service::ScheduleGroup;

const PRODID: &str = "-//VaccinationTracker//EN";
const UID_DOMAIN: &str = "vaccinationtracker";

/// Escape a TEXT value (RFC 5545 section 3.3.11)
pub fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            ',' => escaped.push_str("\\,"),
            ';' => escaped.push_str("\\;"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn ics_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Build the calendar for one child.
///
/// `uid_prefix` is the child id, or `guest` for a guest child. Lines are
/// CRLF terminated.
pub fn build_calendar(child_name: &str, uid_prefix: &str, groups: &[ScheduleGroup], stamp: DateTime<Utc>) -> String {
    let dtstamp = stamp.format("%Y%m%dT%H%M%SZ").to_string();

    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{}", PRODID),
        "CALSCALE:GREGORIAN".to_string(),
        format!("X-WR-CALNAME:Vaccinations - {}", escape_text(child_name)),
    ];

    for group in groups {
        let age = group.milestone.age;
        let start = ics_date(group.due_date);
        let end = group
            .due_date
            .checked_add_days(Days::new(1))
            .map(ics_date)
            .unwrap_or_else(|| start.clone());

        lines.push("BEGIN:VEVENT".to_string());
        lines.push(format!("UID:{}-{}-{}@{}", uid_prefix, age.replace(' ', ""), start, UID_DOMAIN));
        lines.push(format!("DTSTAMP:{}", dtstamp));
        lines.push(format!("DTSTART;VALUE=DATE:{}", start));
        lines.push(format!("DTEND;VALUE=DATE:{}", end));
        lines.push(format!("SUMMARY:{}", escape_text(&format!("{} Vaccines", age))));
        lines.push(format!("DESCRIPTION:{}", escape_text(&group.milestone.vaccines.join(", "))));
        lines.push("END:VEVENT".to_string());
    }

    lines.push("END:VCALENDAR".to_string());

    let mut calendar = lines.join("\r\n");
    calendar.push_str("\r\n");
    calendar
}
