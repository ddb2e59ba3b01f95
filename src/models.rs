use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A candidate activity as produced by a source provider. Immutable once built;
/// `rationale` is the one field added later, by the ranker, on a fresh copy.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub title: String,
    pub date: DateTime<Utc>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub age_hints: Option<String>,
    pub gender_hints: Option<String>,
    pub link: Option<String>,
    pub rationale: Option<String>,
}

impl Event {
    pub fn new(title: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            date,
            time: None,
            location: None,
            description: None,
            age_hints: None,
            gender_hints: None,
            link: None,
            rationale: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    Other,
    #[default]
    #[serde(rename = "Not specified", alias = "Prefer not to say", alias = "unspecified")]
    Unspecified,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
            Gender::Unspecified => "Not specified",
        };
        f.write_str(label)
    }
}

/// One member of the requesting family. Ages are derived from date of birth at
/// request time by the caller (see [`age_from_dob`]), never cached.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct FamilyMember {
    pub age: u32,
    #[serde(default)]
    pub gender: Gender,
}

impl FamilyMember {
    pub fn new(age: u32, gender: Gender) -> Self {
        Self { age, gender }
    }
}

/// Whole years between `dob` and `today`, counting a birthday only once it has
/// passed. Returns 0 for a `dob` in the future.
pub fn age_from_dob(dob: NaiveDate, today: NaiveDate) -> u32 {
    if dob > today {
        return 0;
    }
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    age.max(0) as u32
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsResponse {
    pub message: String,
    pub location_key: String,
    pub events: Vec<Event>,
    pub total_events: usize,
    pub personalized_count: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub message: String,
    pub location_key: String,
    pub event_count: usize,
}
