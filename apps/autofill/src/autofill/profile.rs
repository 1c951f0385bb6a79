//! Candidate profile and the enterprise-safe defaults it is merged over.

use serde::{Deserialize, Serialize};

use crate::autofill::classifier::FieldTag;

/// Profile as stored for a user. Every attribute is optional; missing keys
/// deserialize to `None` so an empty JSON object is a valid profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateProfile {
    #[serde(alias = "firstName")]
    pub first_name: Option<String>,
    #[serde(alias = "lastName")]
    pub last_name: Option<String>,
    #[serde(alias = "fullName")]
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(alias = "zipCode", alias = "postalCode")]
    pub zip: Option<String>,
    pub country: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub portfolio: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
    #[serde(alias = "experienceYears", alias = "experience")]
    pub experience_years: Option<String>,
    pub availability: Option<String>,
    pub relocation: Option<String>,
    pub travel: Option<String>,
}

/// Pre-approved fallbacks, chosen to keep knockout risk low.
/// Link attributes have no default: a fabricated URL is worse than a blank field.
#[derive(Debug, Clone, Copy)]
pub struct SafeDefaults {
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub email: &'static str,
    pub phone: &'static str,
    pub address: &'static str,
    pub city: &'static str,
    pub state: &'static str,
    pub zip: &'static str,
    pub country: &'static str,
    pub location: &'static str,
    pub salary: &'static str,
    pub experience_years: &'static str,
    pub availability: &'static str,
    pub relocation: &'static str,
    pub travel: &'static str,
}

pub const SAFE_DEFAULTS: SafeDefaults = SafeDefaults {
    first_name: "Applicant",
    last_name: "Candidate",
    email: "applicant@example.com",
    phone: "555-555-0100",
    address: "123 Main Street",
    city: "New York",
    state: "NY",
    zip: "10001",
    country: "United States",
    location: "New York, NY",
    salary: "Negotiable",
    experience_years: "5",
    availability: "Immediately",
    relocation: "Yes",
    travel: "Yes",
};

/// Profile after merging over `SAFE_DEFAULTS`. Only the link attributes can be empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicantProfile {
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub linkedin: String,
    pub github: String,
    pub portfolio: String,
    pub location: String,
    pub salary: String,
    pub experience_years: String,
    pub availability: String,
    pub relocation: String,
    pub travel: String,
}

fn pick(value: &Option<String>, default: &str) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

impl ApplicantProfile {
    /// Profile values override defaults; blank strings count as missing.
    pub fn merge(profile: &CandidateProfile, defaults: &SafeDefaults) -> Self {
        let first_name = pick(&profile.first_name, defaults.first_name);
        let last_name = pick(&profile.last_name, defaults.last_name);
        let derived_full_name = format!("{first_name} {last_name}");

        Self {
            full_name: pick(&profile.full_name, &derived_full_name),
            first_name,
            last_name,
            email: pick(&profile.email, defaults.email),
            phone: pick(&profile.phone, defaults.phone),
            address: pick(&profile.address, defaults.address),
            city: pick(&profile.city, defaults.city),
            state: pick(&profile.state, defaults.state),
            zip: pick(&profile.zip, defaults.zip),
            country: pick(&profile.country, defaults.country),
            linkedin: pick(&profile.linkedin, ""),
            github: pick(&profile.github, ""),
            portfolio: pick(&profile.portfolio, ""),
            location: pick(&profile.location, defaults.location),
            salary: pick(&profile.salary, defaults.salary),
            experience_years: pick(&profile.experience_years, defaults.experience_years),
            availability: pick(&profile.availability, defaults.availability),
            relocation: pick(&profile.relocation, defaults.relocation),
            travel: pick(&profile.travel, defaults.travel),
        }
    }

    /// The profile attribute a tag reads, or `None` for tags with no profile source.
    pub fn value_for(&self, tag: FieldTag) -> Option<&str> {
        let value = match tag {
            FieldTag::FirstName => &self.first_name,
            FieldTag::LastName => &self.last_name,
            FieldTag::FullName => &self.full_name,
            FieldTag::Email => &self.email,
            FieldTag::Phone => &self.phone,
            FieldTag::Address => &self.address,
            FieldTag::City => &self.city,
            FieldTag::State => &self.state,
            FieldTag::Zip => &self.zip,
            FieldTag::Country => &self.country,
            FieldTag::Linkedin => &self.linkedin,
            FieldTag::Github => &self.github,
            FieldTag::Portfolio => &self.portfolio,
            FieldTag::Location => &self.location,
            FieldTag::Salary => &self.salary,
            FieldTag::Experience => &self.experience_years,
            FieldTag::Availability => &self.availability,
            FieldTag::Knockout
            | FieldTag::YesNo
            | FieldTag::DropdownGeneric
            | FieldTag::TextareaGeneric
            | FieldTag::TextGeneric => return None,
        };
        Some(value.as_str())
    }
}

impl Default for ApplicantProfile {
    fn default() -> Self {
        Self::merge(&CandidateProfile::default(), &SAFE_DEFAULTS)
    }
}

impl From<CandidateProfile> for ApplicantProfile {
    fn from(profile: CandidateProfile) -> Self {
        Self::merge(&profile, &SAFE_DEFAULTS)
    }
}
