//! Command-line interface for checklist-reconciler.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **reconcile**: Cross-check a checklist CSV against a metadata JSON export
//! - **duplicates**: List repeated section names in either input
//! - **sections**: Show the checklist's section hierarchy with applicability counts
//! - **applicability**: List the questions marked for one facility column
//! - **find**: Search metadata data elements by keyword
//!
//! ## Usage
//!
//! ```text
//! # Reconcile every section
//! checklist-reconciler reconcile checklist.csv metadata.json
//!
//! # One section, failing on formatting drift too
//! checklist-reconciler reconcile checklist.csv metadata.json --section "X-RAY ROOM" --mode strict
//!
//! # JSON output for scripting
//! checklist-reconciler reconcile checklist.csv metadata.json --format json
//!
//! # Duplicate sections on both sides
//! checklist-reconciler duplicates --checklist checklist.csv --metadata metadata.json
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::types::{MatchMode, PreamblePolicy};
use crate::parsing::checklist::ChecklistOptions;

pub mod applicability;
pub mod config;
pub mod duplicates;
pub mod find;
pub mod reconcile;
pub mod sections;

#[derive(Parser)]
#[command(name = "checklist-reconciler")]
#[command(version)]
#[command(about = "Reconcile an assessment checklist CSV against a metadata JSON export")]
#[command(
    long_about = "checklist-reconciler detects drift between a flat checklist spreadsheet and the metadata export that is supposed to mirror it.\n\nIt rebuilds the checklist's section/question hierarchy and reports:\n- Sections with no counterpart in the metadata\n- Questions with no matching data element name\n- Near-misses that differ only in case or spacing\n- Section names that occur more than once"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Cross-check a checklist against a metadata export
    Reconcile(reconcile::ReconcileArgs),

    /// Find section names that occur more than once
    Duplicates(duplicates::DuplicatesArgs),

    /// Show checklist sections with question and applicability counts
    Sections(sections::SectionsArgs),

    /// List questions marked as applicable to one facility type
    Applicability(applicability::ApplicabilityArgs),

    /// Search metadata data elements by keyword
    Find(find::FindArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ModeArg {
    Strict,
    Lenient,
}

impl From<ModeArg> for MatchMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Strict => MatchMode::Strict,
            ModeArg::Lenient => MatchMode::Lenient,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum PreambleArg {
    Drop,
    Collect,
}

impl From<PreambleArg> for PreamblePolicy {
    fn from(policy: PreambleArg) -> Self {
        match policy {
            PreambleArg::Drop => PreamblePolicy::Drop,
            PreambleArg::Collect => PreamblePolicy::Collect,
        }
    }
}

/// Flags controlling how a checklist CSV is read
#[derive(clap::Args, Debug, Default)]
pub struct ChecklistFlags {
    /// JSON config file with `reconcile` and `checklist` settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Rows at the top of the checklist before the first data row
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub header_rows: Option<u64>,

    /// What to do with questions before the first section header
    #[arg(long)]
    pub preamble: Option<PreambleArg>,
}

impl ChecklistFlags {
    /// Load the config file, if any, and apply flag overrides
    pub fn load(&self) -> anyhow::Result<config::RunConfig> {
        let mut run = config::RunConfig::load_or_default(self.config.as_deref())?;
        self.apply(&mut run.checklist)?;
        Ok(run)
    }

    fn apply(&self, options: &mut ChecklistOptions) -> anyhow::Result<()> {
        if let Some(rows) = self.header_rows {
            options.header_rows = usize::try_from(rows)?;
        }
        if let Some(policy) = self.preamble {
            options.preamble = policy.into();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_defaults() {
        let flags = ChecklistFlags {
            config: None,
            header_rows: Some(3),
            preamble: Some(PreambleArg::Collect),
        };
        let run = flags.load().unwrap();
        assert_eq!(run.checklist.header_rows, 3);
        assert_eq!(run.checklist.preamble, PreamblePolicy::Collect);
    }

    #[test]
    fn test_parse_reconcile_command() {
        let cli = Cli::try_parse_from([
            "checklist-reconciler",
            "reconcile",
            "a.csv",
            "b.json",
            "--mode",
            "strict",
            "--format",
            "json",
        ])
        .unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
        assert!(matches!(cli.command, Commands::Reconcile(_)));
    }
}
