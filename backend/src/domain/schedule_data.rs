//! Country-specific routine immunisation tables.
//!
//! Each table is an ordered list of milestones: an age label (see
//! [`crate::domain::age_label`]) and the vaccines given at that age. Vaccine
//! names are unique within a table because a child has at most one
//! vaccination row per name.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Countries with a built-in schedule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Country {
    #[default]
    India,
    #[serde(rename = "UK")]
    Uk,
    #[serde(rename = "USA")]
    Usa,
}

impl Country {
    pub const ALL: [Country; 3] = [Country::India, Country::Uk, Country::Usa];

    pub fn as_str(&self) -> &'static str {
        match self {
            Country::India => "India",
            Country::Uk => "UK",
            Country::Usa => "USA",
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCountry(pub String);

impl fmt::Display for UnknownCountry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No vaccination schedule for country: {}", self.0)
    }
}

impl std::error::Error for UnknownCountry {}

impl FromStr for Country {
    type Err = UnknownCountry;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "india" | "in" => Ok(Country::India),
            "uk" | "gb" | "united kingdom" | "great britain" => Ok(Country::Uk),
            "usa" | "us" | "united states" | "united states of america" => Ok(Country::Usa),
            _ => Err(UnknownCountry(s.trim().to_string())),
        }
    }
}

/// One age group of a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milestone {
    pub age: &'static str,
    pub vaccines: &'static [&'static str],
}

const fn milestone(age: &'static str, vaccines: &'static [&'static str]) -> Milestone {
    Milestone { age, vaccines }
}

static INDIA: &[Milestone] = &[
    milestone("Birth", &["BCG", "OPV 0", "Hepatitis B-1"]),
    milestone("6 Weeks", &["DTwP/DTaP-1", "IPV-1", "Hib-1", "Rotavirus-1", "PCV-1", "Hepatitis B-2"]),
    milestone("10 Weeks", &["DTwP/DTaP-2", "IPV-2", "Hib-2", "Rotavirus-2", "PCV-2", "Hepatitis B-3"]),
    milestone("14 Weeks", &["DTwP/DTaP-3", "IPV-3", "Hib-3", "Rotavirus-3", "PCV-3", "Hepatitis B-4"]),
    milestone("6 Months", &["Influenza (IIV)-1"]),
    milestone("7 Months", &["Influenza (IIV)-2"]),
    milestone("6-9 Months", &["Typhoid Conjugate Vaccine"]),
    milestone("9 Months", &["MMR-1", "Meningococcal-1"]),
    milestone("12 Months", &["Hepatitis A", "Meningococcal-2", "Japanese Encephalitis-1", "Cholera-1"]),
    milestone("13 Months", &["Japanese Encephalitis-2", "Cholera-2"]),
    milestone("15 Months", &["MMR-2", "Varicella-1", "PCV Booster"]),
    milestone("16-18 Months", &["DTwP/DTaP-B1", "Hib-B1", "IPV-B1"]),
    milestone("18-19 Months", &["Hepatitis A-2", "Varicella-2"]),
    milestone("4-6 Years", &["DTwP/DTaP-B2", "IPV-B2", "MMR-3"]),
    milestone("10 Years", &["Tdap"]),
    milestone("15-18 Years", &["HPV"]),
    milestone("16-18 Years", &["Td"]),
];

static UK: &[Milestone] = &[
    milestone("8 Weeks", &["6-in-1-1", "Rotavirus-1", "MenB-1"]),
    milestone("12 Weeks", &["6-in-1-2", "Pneumococcal (PCV)-1", "Rotavirus-2"]),
    milestone("16 Weeks", &["6-in-1-3", "MenB-2"]),
    milestone("1 Year", &["Hib/MenC", "MMR-1", "Pneumococcal (PCV)-2", "MenB-3"]),
    milestone("2 Years", &["Children's Flu"]),
    milestone("3 Years 4 Months", &["4-in-1 Pre-school Booster", "MMR-2"]),
    milestone("12-13 Years", &["HPV"]),
    milestone("14 Years", &["Td/IPV Teenage Booster", "MenACWY"]),
];

static USA: &[Milestone] = &[
    milestone("Birth", &["Hepatitis B-1"]),
    milestone("2 Months", &["Hepatitis B-2", "Rotavirus-1", "DTaP-1", "Hib-1", "PCV-1", "IPV-1"]),
    milestone("4 Months", &["Rotavirus-2", "DTaP-2", "Hib-2", "PCV-2", "IPV-2"]),
    milestone("6 Months", &["DTaP-3", "Hib-3", "PCV-3", "Influenza-1"]),
    milestone("6-18 Months", &["Hepatitis B-3", "IPV-3"]),
    milestone("12-15 Months", &["MMR-1", "Varicella-1", "Hib-4", "PCV-4"]),
    milestone("12-23 Months", &["Hepatitis A-1"]),
    milestone("15-18 Months", &["DTaP-4"]),
    milestone("18-23 Months", &["Hepatitis A-2"]),
    milestone("4-6 Years", &["DTaP-5", "IPV-4", "MMR-2", "Varicella-2"]),
    milestone("11-12 Years", &["Tdap", "HPV", "MenACWY-1"]),
    milestone("16 Years", &["MenACWY-2"]),
];

/// The schedule table for a country
pub fn schedule_for(country: Country) -> &'static [Milestone] {
    match country {
        Country::India => INDIA,
        Country::Uk => UK,
        Country::Usa => USA,
    }
}

/// All countries with a schedule, in display order
pub fn all_countries() -> &'static [Country] {
    &Country::ALL
}

/// The milestone that contains the given vaccine name
pub fn milestone_for_vaccine(country: Country, vaccine: &str) -> Option<&'static Milestone> {
    schedule_for(country)
        .iter()
        .find(|m| m.vaccines.iter().any(|v| *v == vaccine))
}

/// Look up a milestone by its age label, ignoring case and surrounding space
pub fn milestone_by_label(country: Country, label: &str) -> Option<&'static Milestone> {
    let wanted = label.trim();
    schedule_for(country)
        .iter()
        .find(|m| m.age.eq_ignore_ascii_case(wanted))
}
