//! Strict per-section rules from the profile edit forms
//!
//! Bulk upload deliberately skips format checks; these rules are only run on
//! demand (`validate --strict`) so a file can be cleaned up before upload.
//! Limits and value shapes come from [`profile_schema::COLUMNS`].

use chrono::NaiveDate;

use crate::services::profile_schema::{self, Column, ColumnKind, Field, Section, COLUMNS};
use crate::types::{JobEndDate, LicenseExpiry, TalentProfileDraft};

/// Format problem found on a draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub section: Section,
    pub field_name: &'static str,
    pub message: String,
}

impl FieldIssue {
    fn new(column: &Column, message: impl Into<String>) -> Self {
        Self {
            section: column.section,
            field_name: column.header,
            message: message.into(),
        }
    }
}

/// Parse the date formats accepted by the edit forms
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    // ISO date-time: keep the date part
    let date_part = s.split('T').next().unwrap_or(s);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%m/%d/%Y"))
        .ok()
}

/// Check every populated field of `draft` against the edit-form rules
pub fn check_draft(draft: &TalentProfileDraft) -> Vec<FieldIssue> {
    let mut issues = Vec::new();

    for column in COLUMNS {
        let values = field_values(draft, column.field);

        if let ColumnKind::List { max_items } = column.kind {
            check_list(column, &values, max_items, &mut issues);
            continue;
        }

        for value in values.iter().filter(|v| !v.trim().is_empty()) {
            if let Some(message) = check_value(column, value) {
                issues.push(FieldIssue::new(column, message));
            }
        }
    }

    check_date_order(draft, &mut issues);
    issues
}

fn check_value(column: &Column, value: &str) -> Option<String> {
    if let Some(max) = column.max_len {
        if value.chars().count() > max {
            return Some(format!("{} must be {} characters or less", column.header, max));
        }
    }

    match column.kind {
        ColumnKind::Email if !is_email(value) => Some("Invalid email address".to_string()),
        ColumnKind::Phone if !is_phone(value) => Some("Invalid phone number".to_string()),
        ColumnKind::Year if !(value.len() == 4 && value.chars().all(|c| c.is_ascii_digit())) => {
            Some("Graduation year must be 4 digits".to_string())
        }
        ColumnKind::Date if parse_date(value).is_none() => {
            Some(format!("{} is not a valid date: {}", column.header, value))
        }
        ColumnKind::EndDate
            if JobEndDate::parse(value) != JobEndDate::Permanent && parse_date(value).is_none() =>
        {
            Some(format!("{} must be a date or \"permanent\": {}", column.header, value))
        }
        ColumnKind::ExpiryDate
            if LicenseExpiry::parse(value) != LicenseExpiry::NotApplicable
                && parse_date(value).is_none() =>
        {
            Some(format!("{} must be a date or \"N/A\": {}", column.header, value))
        }
        _ => None,
    }
}

fn check_list(column: &Column, tokens: &[&str], max_items: Option<usize>, issues: &mut Vec<FieldIssue>) {
    if let Some(max) = max_items {
        if tokens.len() > max {
            issues.push(FieldIssue::new(
                column,
                format!("At most {} {} allowed, found {}", max, column.header.to_lowercase(), tokens.len()),
            ));
        }
    }
    if tokens.iter().any(|t| t.trim().is_empty()) {
        issues.push(FieldIssue::new(column, format!("{} contains an empty entry", column.header)));
    }
    if tokens.iter().any(|t| !t.trim().is_empty() && t.trim() != *t) {
        let cleaned: Vec<&str> = tokens.iter().map(|t| t.trim()).filter(|t| !t.is_empty()).collect();
        issues.push(FieldIssue::new(
            column,
            format!(
                "{} entries have surrounding spaces; write it as \"{}\"",
                column.header,
                profile_schema::join_list(&cleaned)
            ),
        ));
    }
}

fn check_date_order(draft: &TalentProfileDraft, issues: &mut Vec<FieldIssue>) {
    for job in &draft.education_and_experience.job_experiences {
        if let (Some(start), JobEndDate::Date(end)) = (parse_date(&job.start_date), &job.end_date) {
            if parse_date(end).is_some_and(|end| start > end) {
                issues.push(FieldIssue::new(
                    profile_schema::column(Field::JobStartDates),
                    "Start date cannot be later than the end date",
                ));
            }
        }
    }

    for license in &draft.professional_license.licenses {
        if let (Some(effective), LicenseExpiry::Date(expiry)) =
            (parse_date(&license.license_effective_date), &license.license_expiration_date)
        {
            if parse_date(expiry).is_some_and(|expiry| effective > expiry) {
                issues.push(FieldIssue::new(
                    profile_schema::column(Field::LicenseEffectiveDate),
                    "License effective date cannot be later than the expiration date",
                ));
            }
        }
    }
}

fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}

fn is_phone(value: &str) -> bool {
    (8..=12).contains(&value.len()) && value.chars().all(|c| c.is_ascii_digit())
}

/// Values of `field` on the draft; job and license fields give one value per entry
fn field_values(draft: &TalentProfileDraft, field: Field) -> Vec<&str> {
    let c = &draft.candidate;
    let e = &draft.education_and_experience;
    let p = &draft.profile_details;
    let l = &draft.professional_license;

    match field {
        Field::Title => vec![c.title.as_str()],
        Field::FirstName => vec![c.first_name.as_str()],
        Field::LastName => vec![c.last_name.as_str()],
        Field::Email => vec![c.email.as_str()],
        Field::MobileNumber => vec![c.mobile_number.as_str()],
        Field::Country => vec![c.country.as_str()],
        Field::StateOrProvince => vec![c.state_or_province.as_str()],
        Field::City => vec![c.city.as_str()],
        Field::ZipCode => vec![c.zip_code.as_str()],
        Field::Address1 => vec![c.address1.as_str()],
        Field::Address2 => vec![c.address2.as_str()],
        Field::Eligibility => vec![c.eligibility.as_str()],
        Field::Degree => vec![e.degree.as_str()],
        Field::Year => vec![e.year.as_str()],
        Field::School => vec![e.school.as_str()],
        Field::JobTitles => e.job_experiences.iter().map(|j| j.job_title.as_str()).collect(),
        Field::JobRoles => e
            .job_experiences
            .iter()
            .map(|j| j.roles_and_responsibilities.as_str())
            .collect(),
        Field::JobStartDates => e.job_experiences.iter().map(|j| j.start_date.as_str()).collect(),
        Field::JobEndDates => e.job_experiences.iter().map(|j| j.end_date.as_str()).collect(),
        Field::Languages => e.languages.iter().map(String::as_str).collect(),
        Field::ProfileHeadline => vec![p.profile_headline.as_str()],
        Field::BackgroundSummary => vec![p.background_summary.as_str()],
        Field::AvailableStartDate => vec![p.available_start_date.as_str()],
        Field::Specialties => p.specialties.iter().map(String::as_str).collect(),
        Field::Skills => p.skills.iter().map(String::as_str).collect(),
        Field::LicenseType => l.licenses.iter().map(|x| x.license_type.as_str()).collect(),
        Field::LicenseState => l.licenses.iter().map(|x| x.license_state.as_str()).collect(),
        Field::LicenseCountry => l.licenses.iter().map(|x| x.license_country.as_str()).collect(),
        Field::LicenseNumber => l.licenses.iter().map(|x| x.license_number.as_str()).collect(),
        Field::LicenseIssuedBy => l.licenses.iter().map(|x| x.license_issued_by.as_str()).collect(),
        Field::LicenseEffectiveDate => l
            .licenses
            .iter()
            .map(|x| x.license_effective_date.as_str())
            .collect(),
        Field::LicenseExpirationDate => l
            .licenses
            .iter()
            .map(|x| x.license_expiration_date.as_str())
            .collect(),
        Field::NclexRn => vec![l.nclex_rn.as_str()],
        Field::EuRn => vec![l.eu_rn.as_str()],
        Field::LanguageExam => vec![l.language_exam.as_str()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        Candidate, EducationAndExperience, JobExperience, LicenseEntry, ProfessionalLicense,
        ProfileDetails,
    };

    fn clean_draft() -> TalentProfileDraft {
        TalentProfileDraft {
            candidate: Candidate {
                first_name: "Maria".to_string(),
                last_name: "Santos".to_string(),
                email: "maria@example.com".to_string(),
                mobile_number: "09171234567".to_string(),
                zip_code: "1100".to_string(),
                ..Default::default()
            },
            education_and_experience: EducationAndExperience {
                degree: "BSN".to_string(),
                year: "2015".to_string(),
                school: "UST".to_string(),
                job_experiences: vec![JobExperience {
                    job_title: "Staff Nurse".to_string(),
                    roles_and_responsibilities: "Patient care".to_string(),
                    start_date: "2016-01-04".to_string(),
                    end_date: JobEndDate::Date("2020-06-30".to_string()),
                }],
                languages: vec!["English".to_string(), "Tagalog".to_string()],
            },
            profile_details: ProfileDetails {
                profile_headline: "ICU nurse".to_string(),
                available_start_date: "2025-02-01T00:00:00.000Z".to_string(),
                specialties: vec!["ICU".to_string()],
                ..Default::default()
            },
            professional_license: ProfessionalLicense {
                licenses: vec![LicenseEntry {
                    license_type: "RN".to_string(),
                    license_state: "CA".to_string(),
                    license_country: "USA".to_string(),
                    license_number: "RN123".to_string(),
                    license_issued_by: "CA BRN".to_string(),
                    license_effective_date: "2020-03-01".to_string(),
                    license_expiration_date: LicenseExpiry::NotApplicable,
                }],
                ..Default::default()
            },
        }
    }

    fn fields(issues: &[FieldIssue]) -> Vec<&'static str> {
        issues.iter().map(|i| i.field_name).collect()
    }

    #[test]
    fn test_clean_draft_has_no_issues() {
        assert_eq!(check_draft(&clean_draft()), vec![]);
    }

    #[test]
    fn test_year_must_be_four_digits() {
        let mut draft = clean_draft();
        draft.education_and_experience.year = "15".to_string();
        let issues = check_draft(&draft);
        assert_eq!(fields(&issues), vec!["Year"]);
        assert_eq!(issues[0].message, "Graduation year must be 4 digits");
    }

    #[test]
    fn test_length_limits_come_from_schema() {
        let mut draft = clean_draft();
        draft.candidate.first_name = "x".repeat(51);
        let issues = check_draft(&draft);
        assert_eq!(issues[0].message, "First Name must be 50 characters or less");
    }

    #[test]
    fn test_email_and_phone_shapes() {
        let mut draft = clean_draft();
        draft.candidate.email = "maria@localhost".to_string();
        draft.candidate.mobile_number = "+63 917".to_string();
        assert_eq!(fields(&check_draft(&draft)), vec!["Email", "Mobile Number"]);
    }

    #[test]
    fn test_empty_optional_values_are_skipped() {
        let mut draft = clean_draft();
        draft.candidate.email.clear();
        draft.education_and_experience.year.clear();
        assert!(check_draft(&draft).is_empty());
    }

    #[test]
    fn test_at_most_four_languages() {
        let mut draft = clean_draft();
        draft.education_and_experience.languages = ["English", "Tagalog", "Spanish", "Ilocano", "Cebuano"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let issues = check_draft(&draft);
        assert_eq!(fields(&issues), vec!["Languages"]);
        assert!(issues[0].message.contains("At most 4"));
    }

    #[test]
    fn test_list_tokens_with_spaces_are_flagged() {
        let mut draft = clean_draft();
        draft.profile_details.specialties = vec!["ICU".to_string(), " ER".to_string(), "Triage ".to_string()];
        let issues = check_draft(&draft);
        assert_eq!(fields(&issues), vec!["Specialties"]);
        assert_eq!(issues[0].section, Section::ProfileDetails);
        assert_eq!(
            issues[0].message,
            "Specialties entries have surrounding spaces; write it as \"ICU,ER,Triage\""
        );
    }

    #[test]
    fn test_empty_list_entry_is_flagged() {
        let mut draft = clean_draft();
        draft.education_and_experience.languages = vec!["English".to_string(), String::new()];
        let issues = check_draft(&draft);
        assert_eq!(fields(&issues), vec!["Languages"]);
        assert_eq!(issues[0].section, Section::EducationAndExperience);
        assert_eq!(issues[0].message, "Languages contains an empty entry");
    }

    #[test]
    fn test_job_start_after_end_is_flagged() {
        let mut draft = clean_draft();
        draft.education_and_experience.job_experiences[0].start_date = "2021-01-01".to_string();
        let issues = check_draft(&draft);
        assert_eq!(fields(&issues), vec!["Job Start Dates"]);
        assert_eq!(issues[0].message, "Start date cannot be later than the end date");
    }

    #[test]
    fn test_permanent_job_skips_order_check() {
        let mut draft = clean_draft();
        draft.education_and_experience.job_experiences[0].end_date = JobEndDate::Permanent;
        assert!(check_draft(&draft).is_empty());
    }

    #[test]
    fn test_license_expiry_before_effective() {
        let mut draft = clean_draft();
        draft.professional_license.licenses[0].license_expiration_date =
            LicenseExpiry::Date("2019-12-31".to_string());
        assert_eq!(fields(&check_draft(&draft)), vec!["License Effective Date"]);
    }

    #[test]
    fn test_bad_dates_are_reported() {
        let mut draft = clean_draft();
        draft.profile_details.available_start_date = "soon".to_string();
        draft.professional_license.licenses[0].license_expiration_date =
            LicenseExpiry::Date("never".to_string());
        assert_eq!(
            fields(&check_draft(&draft)),
            vec!["Available Start Date", "License Expiration Date"]
        );
    }

    #[test]
    fn test_parse_date_formats() {
        assert!(parse_date("2024-02-29").is_some());
        assert!(parse_date("2024-02-29T10:00:00Z").is_some());
        assert!(parse_date("02/29/2024").is_some());
        assert!(parse_date("29.02.2024").is_none());
    }
}
