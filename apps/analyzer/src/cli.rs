//! Command-line interface for the resume analyzer

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::extraction::AnalysisDepth;

#[derive(Debug, Parser)]
#[command(name = "resume-analyzer")]
#[command(version, about = "Extract, score and track resumes with Google Gemini")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Analyze one or more PDF resumes and store the results
    Analyze {
        /// Ask only for the core sections
        #[arg(long, conflicts_with = "detailed")]
        basic: bool,

        /// Ask for languages, recommendations, keywords and an ATS score too
        #[arg(long)]
        detailed: bool,

        /// PDF files, analyzed in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Verify that the configured API key is accepted
    Check,

    /// Print a stored resume as a markdown report
    ExportMd { id: Uuid },

    /// Print a stored resume as JSON
    ExportJson { id: Uuid },

    /// Delete a stored resume
    Remove { id: Uuid },

    /// Delete every stored resume
    Clear,
}

impl Commands {
    /// Whether the command talks to the extraction service.
    pub fn needs_api_key(&self) -> bool {
        matches!(self, Commands::Analyze { .. } | Commands::Check)
    }
}

/// Depth picked on the command line, if any. `None` defers to configuration.
pub fn depth_override(basic: bool, detailed: bool) -> Option<AnalysisDepth> {
    match (basic, detailed) {
        (true, _) => Some(AnalysisDepth::Basic),
        (_, true) => Some(AnalysisDepth::Detailed),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    const ID: &str = "67e55044-10b1-426f-9247-bb680e5fe0c8";

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("resume-analyzer").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_analyze_collects_files_in_order() {
        let cli = parse(&["analyze", "--basic", "a.pdf", "b.pdf"]).unwrap();
        match cli.command {
            Commands::Analyze { basic, detailed, files } => {
                assert_eq!(depth_override(basic, detailed), Some(AnalysisDepth::Basic));
                assert_eq!(files, vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_depth_defaults_to_config() {
        assert_eq!(depth_override(false, false), None);
        assert_eq!(depth_override(false, true), Some(AnalysisDepth::Detailed));
    }

    #[test]
    fn test_store_commands_parse_ids() {
        let cli = parse(&["remove", ID]).unwrap();
        assert!(matches!(cli.command, Commands::Remove { id } if id.to_string() == ID));
        assert!(!cli.command.needs_api_key());

        let cli = parse(&["export-md", ID]).unwrap();
        assert!(matches!(cli.command, Commands::ExportMd { .. }));
        assert!(parse(&["export-json", "not-an-id"]).is_err());
        assert!(parse(&["remove"]).is_err());
    }

    #[test]
    fn test_mixed_actions_are_rejected() {
        assert!(parse(&["resume.pdf", "--clear"]).is_err());
        assert!(parse(&["analyze", "resume.pdf", "--clear"]).is_err());
        assert!(parse(&["analyze", "a.pdf", "--remove", ID, "b.pdf"]).is_err());
        assert!(parse(&["clear", "resume.pdf"]).is_err());
        assert!(parse(&["check", "--basic"]).is_err());
    }

    #[test]
    fn test_analyze_requires_files_and_one_depth() {
        assert!(parse(&["analyze"]).is_err());
        assert!(parse(&["analyze", "--basic", "--detailed", "a.pdf"]).is_err());
        assert!(parse(&["analyze", "a.pdf"]).unwrap().command.needs_api_key());
    }
}
