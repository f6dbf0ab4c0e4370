//! Talent profile draft types
//!
//! A draft is the normalized record produced from one CSV row. It is grouped
//! into the four sections the backend stores a talent profile under.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Sentinel stored for a job that has no end date
pub const PERMANENT_SENTINEL: &str = "permanent";

/// Sentinel stored for a license that never expires
pub const NOT_APPLICABLE_SENTINEL: &str = "N/A";

/// Normalized profile-creation record for one CSV row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TalentProfileDraft {
    pub candidate: Candidate,
    pub education_and_experience: EducationAndExperience,
    pub profile_details: ProfileDetails,
    pub professional_license: ProfessionalLicense,
}

/// Candidate identity and contact details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_number: String,
    pub country: String,
    pub state_or_province: String,
    pub city: String,
    pub zip_code: String,
    pub address1: String,
    pub address2: String,
    pub eligibility: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationAndExperience {
    pub degree: String,
    /// Graduation year, kept as written (usually 4 digits)
    pub year: String,
    pub school: String,
    pub job_experiences: Vec<JobExperience>,
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobExperience {
    pub job_title: String,
    pub roles_and_responsibilities: String,
    pub start_date: String,
    pub end_date: JobEndDate,
}

/// End of a job: either an opaque date string or still ongoing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEndDate {
    Date(String),
    Permanent,
}

impl JobEndDate {
    /// Only the `permanent` sentinel (any case) means ongoing; anything else,
    /// including an empty cell, is kept as written.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case(PERMANENT_SENTINEL) {
            JobEndDate::Permanent
        } else {
            JobEndDate::Date(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobEndDate::Date(date) => date,
            JobEndDate::Permanent => PERMANENT_SENTINEL,
        }
    }
}

impl Serialize for JobEndDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobEndDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(JobEndDate::parse(&raw))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDetails {
    pub profile_headline: String,
    pub background_summary: String,
    pub available_start_date: String,
    pub specialties: Vec<String>,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalLicense {
    pub licenses: Vec<LicenseEntry>,
    pub nclex_rn: String,
    pub eu_rn: String,
    pub language_exam: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseEntry {
    pub license_type: String,
    pub license_state: String,
    pub license_country: String,
    pub license_number: String,
    pub license_issued_by: String,
    pub license_effective_date: String,
    pub license_expiration_date: LicenseExpiry,
}

/// License expiration: an opaque date string or "does not expire"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseExpiry {
    Date(String),
    NotApplicable,
}

impl LicenseExpiry {
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case(NOT_APPLICABLE_SENTINEL) {
            LicenseExpiry::NotApplicable
        } else {
            LicenseExpiry::Date(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LicenseExpiry::Date(date) => date,
            LicenseExpiry::NotApplicable => NOT_APPLICABLE_SENTINEL,
        }
    }
}

impl Serialize for LicenseExpiry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LicenseExpiry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(LicenseExpiry::parse(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_end_date_sentinel_is_case_insensitive() {
        assert_eq!(JobEndDate::parse("Permanent"), JobEndDate::Permanent);
        assert_eq!(JobEndDate::parse(" permanent "), JobEndDate::Permanent);
        assert_eq!(
            JobEndDate::parse("2023-05-01"),
            JobEndDate::Date("2023-05-01".to_string())
        );
    }

    #[test]
    fn test_empty_job_end_date_stays_empty() {
        assert_eq!(JobEndDate::parse(""), JobEndDate::Date(String::new()));
        assert_eq!(serde_json::to_string(&JobEndDate::parse("")).unwrap(), "\"\"");
    }

    #[test]
    fn test_license_expiry_serializes_sentinel() {
        let json = serde_json::to_string(&LicenseExpiry::parse("n/a")).unwrap();
        assert_eq!(json, "\"N/A\"");

        let json = serde_json::to_string(&LicenseExpiry::parse("2027-01-31")).unwrap();
        assert_eq!(json, "\"2027-01-31\"");
    }

    #[test]
    fn test_draft_serializes_camel_case_sections() {
        let draft = TalentProfileDraft {
            candidate: Candidate {
                first_name: "John".to_string(),
                ..Default::default()
            },
            education_and_experience: EducationAndExperience {
                job_experiences: vec![JobExperience {
                    job_title: "RN".to_string(),
                    roles_and_responsibilities: "Triage".to_string(),
                    start_date: "2020-01-01".to_string(),
                    end_date: JobEndDate::Permanent,
                }],
                ..Default::default()
            },
            profile_details: ProfileDetails::default(),
            professional_license: ProfessionalLicense::default(),
        };

        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["candidate"]["firstName"], "John");
        assert_eq!(
            json["educationAndExperience"]["jobExperiences"][0]["endDate"],
            "permanent"
        );
        assert!(json["professionalLicense"]["licenses"].is_array());
        assert!(json["profileDetails"]["specialties"].is_array());
    }
}
