//! Row validation and transformation into talent profile drafts

use tracing::debug;

use crate::services::csv_decoder::RawRow;
use crate::services::profile_schema::{self, column, Field};
use crate::types::{
    Candidate, EducationAndExperience, JobEndDate, JobExperience, LicenseEntry, LicenseExpiry,
    ListTokenPolicy, ProfessionalLicense, ProfileDetails, RequiredPolicy, TalentProfileDraft,
    ValidationError,
};

const JOB_FIELDS: [Field; 4] = [
    Field::JobTitles,
    Field::JobRoles,
    Field::JobStartDates,
    Field::JobEndDates,
];

const LICENSE_FIELDS: [Field; 7] = [
    Field::LicenseType,
    Field::LicenseState,
    Field::LicenseCountry,
    Field::LicenseNumber,
    Field::LicenseIssuedBy,
    Field::LicenseEffectiveDate,
    Field::LicenseExpirationDate,
];

/// Knobs for turning rows into drafts
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformOptions {
    pub required: RequiredPolicy,
    pub lists: ListTokenPolicy,
}

/// Drafts and errors of a local validation pass, in row order
#[derive(Debug, Default)]
pub struct RowValidation {
    pub drafts: Vec<TalentProfileDraft>,
    pub errors: Vec<ValidationError>,
    pub rows_seen: usize,
}

impl RowValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate one row and build its draft. A row with any missing required
/// value is rejected as a whole, with every missing field reported.
pub fn transform_row(
    row: &RawRow,
    options: &TransformOptions,
) -> Result<TalentProfileDraft, Vec<ValidationError>> {
    let errors: Vec<ValidationError> = profile_schema::required_columns(options.required)
        .filter(|c| row.value(c.header).trim().is_empty())
        .map(|c| ValidationError::missing_value(row.index, c.header))
        .collect();

    if !errors.is_empty() {
        debug!(
            "Row {} (line {}) rejected: {} missing value(s)",
            row.index,
            row.line,
            errors.len()
        );
        return Err(errors);
    }

    Ok(build_draft(row, options.lists))
}

/// Validate every row, collecting drafts and concatenating errors
pub fn validate_rows<I>(rows: I, options: &TransformOptions) -> RowValidation
where
    I: IntoIterator<Item = RawRow>,
{
    let mut result = RowValidation::default();
    for row in rows {
        result.rows_seen += 1;
        match transform_row(&row, options) {
            Ok(draft) => result.drafts.push(draft),
            Err(mut errors) => result.errors.append(&mut errors),
        }
    }
    result
}

fn build_draft(row: &RawRow, lists: ListTokenPolicy) -> TalentProfileDraft {
    let text = |field: Field| row.value(column(field).header).to_string();
    let list = |field: Field| profile_schema::split_list(row.value(column(field).header), lists);
    let all_empty = |fields: &[Field]| fields.iter().all(|f| row.value(column(*f).header).trim().is_empty());

    let candidate = Candidate {
        title: text(Field::Title),
        first_name: text(Field::FirstName),
        last_name: text(Field::LastName),
        email: text(Field::Email),
        mobile_number: text(Field::MobileNumber),
        country: text(Field::Country),
        state_or_province: text(Field::StateOrProvince),
        city: text(Field::City),
        zip_code: text(Field::ZipCode),
        address1: text(Field::Address1),
        address2: text(Field::Address2),
        eligibility: text(Field::Eligibility),
    };

    let job_experiences = if all_empty(&JOB_FIELDS) {
        Vec::new()
    } else {
        vec![JobExperience {
            job_title: text(Field::JobTitles),
            roles_and_responsibilities: text(Field::JobRoles),
            start_date: text(Field::JobStartDates),
            end_date: JobEndDate::parse(row.value(column(Field::JobEndDates).header)),
        }]
    };

    let education_and_experience = EducationAndExperience {
        degree: text(Field::Degree),
        year: text(Field::Year),
        school: text(Field::School),
        job_experiences,
        languages: list(Field::Languages),
    };

    let profile_details = ProfileDetails {
        profile_headline: text(Field::ProfileHeadline),
        background_summary: text(Field::BackgroundSummary),
        available_start_date: text(Field::AvailableStartDate),
        specialties: list(Field::Specialties),
        skills: list(Field::Skills),
    };

    let licenses = if all_empty(&LICENSE_FIELDS) {
        Vec::new()
    } else {
        vec![LicenseEntry {
            license_type: text(Field::LicenseType),
            license_state: text(Field::LicenseState),
            license_country: text(Field::LicenseCountry),
            license_number: text(Field::LicenseNumber),
            license_issued_by: text(Field::LicenseIssuedBy),
            license_effective_date: text(Field::LicenseEffectiveDate),
            license_expiration_date: LicenseExpiry::parse(
                row.value(column(Field::LicenseExpirationDate).header),
            ),
        }]
    };

    let professional_license = ProfessionalLicense {
        licenses,
        nclex_rn: text(Field::NclexRn),
        eu_rn: text(Field::EuRn),
        language_exam: text(Field::LanguageExam),
    };

    TalentProfileDraft {
        candidate,
        education_and_experience,
        profile_details,
        professional_license,
    }
}
