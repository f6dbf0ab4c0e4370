//! Talent CSV column schema
//!
//! Every template column is declared once in [`COLUMNS`]. The required-field
//! check, the downloadable template and the strict section rules all read
//! from this table.

use crate::types::{ListTokenPolicy, RequiredPolicy};

/// Delimiter used inside list-valued cells
pub const LIST_DELIMITER: char = ',';

/// Profile section a column is stored under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Candidate,
    EducationAndExperience,
    ProfileDetails,
    ProfessionalLicense,
}

impl Section {
    /// Heading of the section on the profile edit page
    pub fn label(&self) -> &'static str {
        match self {
            Section::Candidate => "Candidate",
            Section::EducationAndExperience => "Education & Experience",
            Section::ProfileDetails => "Profile Details",
            Section::ProfessionalLicense => "Professional License",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    FirstName,
    LastName,
    Email,
    MobileNumber,
    Country,
    StateOrProvince,
    City,
    ZipCode,
    Address1,
    Address2,
    Eligibility,
    Degree,
    Year,
    School,
    JobTitles,
    JobRoles,
    JobStartDates,
    JobEndDates,
    Languages,
    ProfileHeadline,
    BackgroundSummary,
    AvailableStartDate,
    Specialties,
    Skills,
    LicenseType,
    LicenseState,
    LicenseCountry,
    LicenseNumber,
    LicenseIssuedBy,
    LicenseEffectiveDate,
    LicenseExpirationDate,
    NclexRn,
    EuRn,
    LanguageExam,
}

/// Value shape, used by the strict section rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Email,
    Phone,
    Year,
    Date,
    /// Date or the `permanent` sentinel
    EndDate,
    /// Date or the `N/A` sentinel
    ExpiryDate,
    List { max_items: Option<usize> },
}

/// When a column must carry a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Required under every policy
    Identity,
    /// Required only under [`RequiredPolicy::Legacy`]
    Legacy,
    /// Never required
    Optional,
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub field: Field,
    pub header: &'static str,
    pub section: Section,
    pub kind: ColumnKind,
    pub requirement: Requirement,
    /// Maximum length enforced by the edit forms
    pub max_len: Option<usize>,
}

impl Column {
    pub fn is_required(&self, policy: RequiredPolicy) -> bool {
        match self.requirement {
            Requirement::Identity => true,
            Requirement::Legacy => policy == RequiredPolicy::Legacy,
            Requirement::Optional => false,
        }
    }
}

const fn col(
    field: Field,
    header: &'static str,
    section: Section,
    kind: ColumnKind,
    requirement: Requirement,
    max_len: Option<usize>,
) -> Column {
    Column { field, header, section, kind, requirement, max_len }
}

use ColumnKind::*;
use Requirement::*;
use Section::*;

/// Template columns in template order
pub const COLUMNS: &[Column] = &[
    col(Field::Title, "Title", Candidate, Text, Legacy, None),
    col(Field::FirstName, "First Name", Candidate, Text, Identity, Some(50)),
    col(Field::LastName, "Last Name", Candidate, Text, Identity, Some(50)),
    col(Field::Email, "Email", Candidate, Email, Identity, Some(254)),
    col(Field::MobileNumber, "Mobile Number", Candidate, Phone, Legacy, None),
    col(Field::Country, "Country", Candidate, Text, Legacy, None),
    col(Field::StateOrProvince, "State/Province", Candidate, Text, Legacy, None),
    col(Field::City, "City", Candidate, Text, Legacy, None),
    col(Field::ZipCode, "Zip Code", Candidate, Text, Legacy, Some(10)),
    col(Field::Address1, "Address 1", Candidate, Text, Legacy, Some(500)),
    col(Field::Address2, "Address 2", Candidate, Text, Legacy, Some(500)),
    col(Field::Eligibility, "Eligibility", Candidate, Text, Legacy, None),
    col(Field::Degree, "Degree", EducationAndExperience, Text, Legacy, Some(254)),
    col(Field::Year, "Year", EducationAndExperience, Year, Legacy, None),
    col(Field::School, "School", EducationAndExperience, Text, Legacy, Some(254)),
    col(Field::JobTitles, "Job Titles", EducationAndExperience, Text, Legacy, Some(254)),
    col(Field::JobRoles, "Job Roles", EducationAndExperience, Text, Legacy, Some(254)),
    col(Field::JobStartDates, "Job Start Dates", EducationAndExperience, Date, Legacy, None),
    col(Field::JobEndDates, "Job End Dates", EducationAndExperience, EndDate, Legacy, None),
    col(Field::Languages, "Languages", EducationAndExperience, List { max_items: Some(4) }, Optional, None),
    col(Field::ProfileHeadline, "Profile Headline", ProfileDetails, Text, Legacy, Some(254)),
    col(Field::BackgroundSummary, "Background Summary", ProfileDetails, Text, Legacy, Some(500)),
    col(Field::AvailableStartDate, "Available Start Date", ProfileDetails, Date, Legacy, None),
    col(Field::Specialties, "Specialties", ProfileDetails, List { max_items: None }, Optional, None),
    col(Field::Skills, "Skills", ProfileDetails, List { max_items: None }, Optional, None),
    col(Field::LicenseType, "License Type", ProfessionalLicense, Text, Legacy, None),
    col(Field::LicenseState, "License State", ProfessionalLicense, Text, Legacy, None),
    col(Field::LicenseCountry, "License Country", ProfessionalLicense, Text, Legacy, None),
    col(Field::LicenseNumber, "License Number", ProfessionalLicense, Text, Legacy, None),
    col(Field::LicenseIssuedBy, "License Issued By", ProfessionalLicense, Text, Legacy, None),
    col(Field::LicenseEffectiveDate, "License Effective Date", ProfessionalLicense, Date, Legacy, None),
    col(Field::LicenseExpirationDate, "License Expiration Date", ProfessionalLicense, ExpiryDate, Legacy, None),
    col(Field::NclexRn, "NCLEX RN", ProfessionalLicense, Text, Legacy, None),
    col(Field::EuRn, "EU RN", ProfessionalLicense, Text, Legacy, None),
    col(Field::LanguageExam, "Language Exam", ProfessionalLicense, Text, Legacy, None),
];

/// Schema entry for a field
pub fn column(field: Field) -> &'static Column {
    COLUMNS
        .iter()
        .find(|c| c.field == field)
        .unwrap_or_else(|| unreachable!("every Field has a column"))
}

/// Look up a column by its CSV header (exact match)
pub fn find_by_header(header: &str) -> Option<&'static Column> {
    COLUMNS.iter().find(|c| c.header == header)
}

/// Header row of the downloadable template
pub fn template_headers() -> Vec<&'static str> {
    COLUMNS.iter().map(|c| c.header).collect()
}

/// Columns that must carry a value under `policy`, in template order
pub fn required_columns(policy: RequiredPolicy) -> impl Iterator<Item = &'static Column> {
    COLUMNS.iter().filter(move |c| c.is_required(policy))
}

/// Split a list cell. An empty cell is an empty list.
pub fn split_list(raw: &str, policy: ListTokenPolicy) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    match policy {
        ListTokenPolicy::Verbatim => raw.split(LIST_DELIMITER).map(str::to_string).collect(),
        ListTokenPolicy::Trim => raw
            .split(LIST_DELIMITER)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
    }
}

/// Inverse of [`split_list`] for tokens without an embedded delimiter
pub fn join_list<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|t| t.as_ref())
        .collect::<Vec<_>>()
        .join(&LIST_DELIMITER.to_string())
}
