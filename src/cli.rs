//! CLI argument parsing for the talent-ingest binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::types::UploadMode;

#[derive(Parser)]
#[command(name = "talent-ingest", about = "Bulk CSV ingestion for talent profiles")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Submit a CSV file to the talent backend
    Upload {
        /// CSV file to upload
        file: PathBuf,
        /// Validate locally first (`local`) or let the backend judge each row (`server`)
        #[arg(long)]
        mode: Option<UploadMode>,
        /// Require every scalar template column, not only name and email
        #[arg(long)]
        legacy_required: bool,
        /// Trim spaces around list tokens
        #[arg(long)]
        trim_lists: bool,
    },
    /// Check a CSV file locally without sending anything
    Validate {
        file: PathBuf,
        /// Also apply the edit-form format rules
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        legacy_required: bool,
        #[arg(long)]
        trim_lists: bool,
    },
    /// Write the CSV template header row
    Template {
        /// Output file (stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Show recent uploads
    History {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_upload_command_parses() {
        let cli = Cli::parse_from(["talent-ingest", "upload", "nurses.csv", "--mode", "local", "--trim-lists"]);
        match cli.command {
            Command::Upload { file, mode, legacy_required, trim_lists } => {
                assert_eq!(file, PathBuf::from("nurses.csv"));
                assert_eq!(mode, Some(UploadMode::Local));
                assert!(!legacy_required);
                assert!(trim_lists);
            }
            _ => panic!("expected upload command"),
        }
    }

    #[test]
    fn test_cli_upload_mode_defaults_to_config() {
        let cli = Cli::parse_from(["talent-ingest", "upload", "nurses.csv"]);
        assert!(matches!(cli.command, Command::Upload { mode: None, .. }));
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["talent-ingest", "upload", "a.csv", "--mode", "hybrid"]).is_err());
    }

    #[test]
    fn test_cli_validate_strict_parses() {
        let cli = Cli::parse_from(["talent-ingest", "validate", "a.csv", "--strict", "--legacy-required"]);
        assert!(matches!(
            cli.command,
            Command::Validate { strict: true, legacy_required: true, trim_lists: false, .. }
        ));
    }

    #[test]
    fn test_cli_template_and_history_parse() {
        let cli = Cli::parse_from(["talent-ingest", "template", "-o", "template.csv"]);
        assert!(matches!(cli.command, Command::Template { output: Some(_) }));

        let cli = Cli::parse_from(["talent-ingest", "history"]);
        assert!(matches!(cli.command, Command::History { limit: 20 }));
    }

    #[test]
    fn test_cli_requires_command() {
        assert!(Cli::try_parse_from(["talent-ingest"]).is_err());
    }
}
