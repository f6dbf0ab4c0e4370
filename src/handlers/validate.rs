//! `validate` and `template` commands

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::error::DecodeError;
use crate::handlers::report;
use crate::services::csv_decoder;
use crate::services::profile_schema;
use crate::services::row_transformer::{self, TransformOptions};
use crate::services::section_rules::{self, FieldIssue};
use crate::types::ValidationError;

/// Outcome of checking a file without sending it
#[derive(Debug, Default)]
pub struct ValidationSummary {
    pub rows: usize,
    pub valid_rows: usize,
    pub errors: Vec<ValidationError>,
    /// Header columns that match no template column and are ignored
    pub unknown_columns: Vec<String>,
    /// Strict issues as (row index, issue); only filled for rows without missing values
    pub issues: Vec<(usize, FieldIssue)>,
}

impl ValidationSummary {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.issues.is_empty()
    }
}

/// Decode and check `bytes`; `strict` adds the edit-form format rules
pub fn validate_bytes(
    bytes: &[u8],
    options: &TransformOptions,
    strict: bool,
) -> Result<ValidationSummary, DecodeError> {
    let decoded = csv_decoder::decode(bytes)?;
    let unknown_columns = decoded
        .headers()
        .iter()
        .filter(|h| !h.is_empty() && profile_schema::find_by_header(h).is_none())
        .cloned()
        .collect();
    let rows = decoded.collect_rows()?;
    let mut summary = ValidationSummary {
        rows: rows.len(),
        unknown_columns,
        ..Default::default()
    };

    for row in &rows {
        match row_transformer::transform_row(row, options) {
            Ok(draft) => {
                summary.valid_rows += 1;
                if strict {
                    summary
                        .issues
                        .extend(section_rules::check_draft(&draft).into_iter().map(|i| (row.index, i)));
                }
            }
            Err(mut errors) => summary.errors.append(&mut errors),
        }
    }

    Ok(summary)
}

pub fn handle_validate(file: &Path, options: TransformOptions, strict: bool) -> Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let summary = validate_bytes(&bytes, &options, strict)
        .with_context(|| format!("{} is not a readable CSV file", file.display()))?;

    info!(
        "Validated {}: {} rows, {} valid, {} errors, {} format issues",
        file.display(),
        summary.rows,
        summary.valid_rows,
        summary.errors.len(),
        summary.issues.len()
    );

    println!("Rows: {}, valid: {}", summary.rows, summary.valid_rows);
    if !summary.unknown_columns.is_empty() {
        println!("Ignored columns: {}", summary.unknown_columns.join(", "));
    }
    if !summary.errors.is_empty() {
        print!("{}", report::render_validation_errors(&summary.errors));
    }
    if !summary.issues.is_empty() {
        print!("{}", report::render_field_issues(&summary.issues));
    }

    if !summary.is_clean() {
        anyhow::bail!("{} has problems; fix them before uploading", file.display());
    }
    println!("No problems found.");
    Ok(())
}

/// Header row of the upload template as CSV text
pub fn template_csv() -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(profile_schema::template_headers())?;
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to finish template: {}", e.error()))?;
    String::from_utf8(bytes).context("Template is not UTF-8")
}

pub fn handle_template(output: Option<&Path>) -> Result<()> {
    let csv = template_csv()?;
    match output {
        Some(path) => {
            std::fs::write(path, &csv).with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Template written to {}", path.display());
        }
        None => print!("{}", csv),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RequiredPolicy;

    #[test]
    fn test_validate_scenario_file() {
        let summary = validate_bytes(
            b"Title,First Name,Last Name,Email\nMr.,John,Doe,john@x.com\nMr.,,Smith,jane@x.com\n",
            &TransformOptions::default(),
            false,
        )
        .unwrap();

        assert_eq!(summary.rows, 2);
        assert_eq!(summary.valid_rows, 1);
        assert_eq!(summary.errors[0].message, "Row 2: Missing value for \"First Name\".");
        assert!(!summary.is_clean());
    }

    #[test]
    fn test_strict_issues_carry_row_index() {
        let input = b"First Name,Last Name,Email,Year\nAna,Lee,a@x.com,2015\nBen,Kim,ben-at-x,15\n";

        let lenient = validate_bytes(input, &TransformOptions::default(), false).unwrap();
        assert!(lenient.is_clean());

        let strict = validate_bytes(input, &TransformOptions::default(), true).unwrap();
        let rows: Vec<_> = strict.issues.iter().map(|(row, i)| (*row, i.field_name)).collect();
        assert_eq!(rows, vec![(2, "Email"), (2, "Year")]);
    }

    #[test]
    fn test_unknown_columns_are_listed() {
        let summary = validate_bytes(
            b"First Name,Last Name,Email,Nickname,\nAna,Lee,a@x.com,Annie,\n",
            &TransformOptions::default(),
            false,
        )
        .unwrap();
        assert_eq!(summary.unknown_columns, vec!["Nickname".to_string()]);
        assert!(summary.is_clean());
    }

    #[test]
    fn test_legacy_policy_in_validate() {
        let options = TransformOptions { required: RequiredPolicy::Legacy, ..Default::default() };
        let summary = validate_bytes(b"First Name,Last Name,Email\nAna,Lee,a@x.com\n", &options, false).unwrap();
        assert_eq!(summary.valid_rows, 0);
        assert_eq!(summary.errors.len(), 29);
    }

    #[test]
    fn test_decode_error_is_returned() {
        let err = validate_bytes(b"Email\n\"open\n", &TransformOptions::default(), false).unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_template_round_trips_through_decoder() {
        let csv = template_csv().unwrap();
        assert!(csv.starts_with("Title,First Name,Last Name,Email,"));
        assert!(csv.ends_with("Language Exam\n"));

        let decoded = csv_decoder::decode(csv.as_bytes()).unwrap();
        assert_eq!(decoded.headers().len(), profile_schema::COLUMNS.len());
        assert!(decoded.collect_rows().unwrap().is_empty());
    }

    #[test]
    fn test_template_written_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.csv");
        handle_template(Some(path.as_path())).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), template_csv().unwrap());
    }
}
