//! Plain-text rendering of upload and validation results

use crate::services::section_rules::FieldIssue;
use crate::services::upload_history::UploadHistoryEntry;
use crate::types::{UploadReport, UploadStatus, ValidationError};

/// Summary shown after a submission reached the backend
pub fn render_upload_report(report: &UploadReport) -> String {
    let outcome = &report.outcome;

    let mut out = format!("Upload of '{}' ({} mode)\n", report.file_name, report.mode);
    out.push_str(&format!("Rows in file: {}\n", report.total_rows));
    out.push_str(&format!("Created: {}\n", outcome.created_profiles_count));
    out.push_str(&format!("Rejected: {}\n", outcome.rejected_profiles_count));

    if report.total_rows == 0 {
        out.push_str("\nThe file has no data rows; nothing was sent.\n");
    }

    if !outcome.rejected_profiles.is_empty() {
        out.push_str("\nRejected records:\n");
        for rejected in &outcome.rejected_profiles {
            out.push_str(&format!("Record {}: {}\n", rejected.invalid_record_number, rejected.errors));
        }
    }

    if !report.discrepancies.is_empty() {
        out.push_str("\nWarning: the backend summary does not match the file:\n");
        for d in &report.discrepancies {
            out.push_str(&format!("- {}\n", d));
        }
    }

    out
}

/// Missing-value errors of a local validation pass
pub fn render_validation_errors(errors: &[ValidationError]) -> String {
    let mut out = format!("{} problem(s) found:\n", errors.len());
    for e in errors {
        out.push_str(&e.message);
        out.push('\n');
    }
    out
}

/// Strict format issues, keyed by data row
pub fn render_field_issues(issues: &[(usize, FieldIssue)]) -> String {
    let mut out = format!("{} format issue(s) found:\n", issues.len());
    for (row, issue) in issues {
        out.push_str(&format!(
            "Row {}: [{}] {}: {}\n",
            row,
            issue.section.label(),
            issue.field_name,
            issue.message
        ));
    }
    out
}

/// One-line progress text
pub fn describe_status(status: &UploadStatus) -> String {
    match status {
        UploadStatus::Decoding => "Reading file...".to_string(),
        UploadStatus::Validating { rows } => format!("Validating {} row(s)...", rows),
        UploadStatus::Sending { rows } => format!("Sending {} row(s)...", rows),
        UploadStatus::AwaitingResponse => "Waiting for the backend...".to_string(),
        UploadStatus::Done { created, rejected } => format!("Done: {} created, {} rejected", created, rejected),
        UploadStatus::Failed { error } => format!("Failed: {}", error),
    }
}

pub fn render_history(entries: &[UploadHistoryEntry]) -> String {
    if entries.is_empty() {
        return "No uploads recorded yet.\n".to_string();
    }

    let mut out = String::new();
    for e in entries {
        out.push_str(&format!(
            "{}  {:<9} {:<6} {}  created {} rejected {}",
            e.completed_at.format("%Y-%m-%d %H:%M:%S"),
            e.status,
            e.mode.as_str(),
            e.file_name,
            e.created,
            e.rejected
        ));
        if let Some(error) = &e.error {
            out.push_str(&format!("  ({})", error));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::profile_schema::Section;
    use crate::types::{BulkUploadOutcome, RejectedProfile, UploadMode};
    use uuid::Uuid;

    fn report(outcome: BulkUploadOutcome, total_rows: u32) -> UploadReport {
        UploadReport {
            upload_id: Uuid::new_v4(),
            file_name: "nurses.csv".to_string(),
            mode: UploadMode::Server,
            total_rows,
            outcome,
            discrepancies: Vec::new(),
        }
    }

    #[test]
    fn test_partial_rejection_report() {
        let outcome = BulkUploadOutcome {
            created_profiles_count: 8,
            rejected_profiles_count: 2,
            rejected_profiles: vec![
                RejectedProfile { invalid_record_number: 3, errors: "Missing email".to_string() },
                RejectedProfile { invalid_record_number: 7, errors: "Invalid phone".to_string() },
            ],
        };
        let text = render_upload_report(&report(outcome, 10));

        assert!(text.contains("Created: 8\n"));
        assert!(text.contains("Rejected: 2\n"));
        assert!(text.contains("Record 3: Missing email\n"));
        assert!(text.contains("Record 7: Invalid phone\n"));
        assert_eq!(text.matches("Record ").count(), 2);
        assert!(!text.contains("Warning"));
    }

    #[test]
    fn test_empty_file_report() {
        let text = render_upload_report(&report(BulkUploadOutcome::default(), 0));
        assert!(text.contains("Created: 0"));
        assert!(text.contains("nothing was sent"));
    }

    #[test]
    fn test_discrepancies_are_shown() {
        let mut r = report(BulkUploadOutcome { created_profiles_count: 9, ..Default::default() }, 5);
        r.discrepancies.push("9 created + 0 rejected = 9, but 5 rows were sent".to_string());
        let text = render_upload_report(&r);
        assert!(text.contains("Warning"));
        assert!(text.contains("- 9 created"));
    }

    #[test]
    fn test_validation_errors_listed_verbatim() {
        let text = render_validation_errors(&[ValidationError::missing_value(2, "First Name")]);
        assert_eq!(text, "1 problem(s) found:\nRow 2: Missing value for \"First Name\".\n");
    }

    #[test]
    fn test_describe_status() {
        assert_eq!(describe_status(&UploadStatus::Sending { rows: 3 }), "Sending 3 row(s)...");
        assert_eq!(
            describe_status(&UploadStatus::Done { created: 8, rejected: 2 }),
            "Done: 8 created, 2 rejected"
        );
    }

    #[test]
    fn test_field_issues_name_section() {
        let issue = FieldIssue {
            section: Section::EducationAndExperience,
            field_name: "Year",
            message: "Graduation year must be 4 digits".to_string(),
        };
        assert_eq!(
            render_field_issues(&[(2, issue)]),
            "1 format issue(s) found:\nRow 2: [Education & Experience] Year: Graduation year must be 4 digits\n"
        );
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(render_history(&[]), "No uploads recorded yet.\n");
    }
}
