use std::path::PathBuf;

use clap::Args;

use crate::cli::{ChecklistFlags, ModeArg, OutputFormat};
use crate::core::tree::{ChecklistTree, MetadataTree};
use crate::core::types::SectionStatus;
use crate::matching::diagnosis::ReconcileReport;
use crate::matching::engine::ReconcileEngine;
use crate::parsing::checklist::parse_checklist_file;
use crate::parsing::metadata::parse_metadata_file;

#[derive(Args)]
pub struct ReconcileArgs {
    /// Checklist CSV file
    #[arg(required = true)]
    pub checklist: PathBuf,

    /// Metadata JSON export
    #[arg(required = true)]
    pub metadata: PathBuf,

    /// Only reconcile the checklist section with this name
    #[arg(short, long)]
    pub section: Option<String>,

    /// Comparison strictness for question labels
    #[arg(short, long)]
    pub mode: Option<ModeArg>,

    #[command(flatten)]
    pub checklist_flags: ChecklistFlags,
}

/// Run the reconciliation and print the report.
///
/// Returns `Ok(false)` when any section is missing or failed.
pub fn run(args: ReconcileArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<bool> {
    let mut run_config = args.checklist_flags.load()?;
    if let Some(section) = args.section {
        run_config.reconcile.target_section = Some(section);
    }
    if let Some(mode) = args.mode {
        run_config.reconcile.match_mode = mode.into();
    }

    let checklist = parse_checklist_file(&args.checklist, &run_config.checklist)?;
    let metadata = parse_metadata_file(&args.metadata)?;

    if verbose {
        print_input_summary(&checklist, &metadata);
    }

    let engine = ReconcileEngine::with_config(&metadata, run_config.reconcile);
    let report = engine.reconcile(&checklist);

    match format {
        OutputFormat::Text => print_text_report(&report),
        OutputFormat::Json => print_json_report(&report)?,
        OutputFormat::Tsv => print_tsv_report(&report),
    }

    Ok(!report.has_mismatches())
}

fn print_input_summary(checklist: &ChecklistTree, metadata: &MetadataTree) {
    eprintln!(
        "Checklist: {} sections, {} questions, {} facility columns",
        checklist.sections.len(),
        checklist.question_count(),
        checklist.facilities.len()
    );
    eprintln!(
        "  Rows: {} ({} blank, {} headers, {} questions, {} noise)",
        checklist.stats.rows,
        checklist.stats.blank,
        checklist.stats.headers,
        checklist.stats.questions,
        checklist.stats.noise
    );
    eprintln!(
        "Metadata: {} sections, {} data elements, {} unresolved references",
        metadata.sections.len(),
        metadata.elements.len(),
        metadata.unresolved_count()
    );
}

fn print_text_report(report: &ReconcileReport) {
    println!("Reconciliation Results");
    println!("{}", "=".repeat(60));

    if let Some(target) = &report.target_section {
        println!("Target section: {target}");
    }
    println!("Match mode: {:?}", report.match_mode);

    for section in &report.sections {
        println!();
        match section.status {
            SectionStatus::Pass | SectionStatus::Fail => println!(
                "[{}] {} ({}/{} questions matched)",
                section.status, section.name, section.matched_questions, section.question_count
            ),
            SectionStatus::Missing | SectionStatus::Skipped => {
                println!("[{}] {}", section.status, section.name);
            }
        }

        if !section.hints.is_empty() {
            println!("  Did you mean:");
            for hint in &section.hints {
                println!("    - {hint}");
            }
        }

        for mismatch in &section.mismatches {
            println!("  Mismatch (line {}): {}", mismatch.line, mismatch.label);
            for near in &mismatch.near_misses {
                println!("    near-miss: {near}");
            }
            for (candidate, score) in &mismatch.suggestions {
                println!("    closest: {candidate} ({score:.2})");
            }
        }

        for drift in &section.formatting {
            println!(
                "  Formatting (line {}): {} ~ {}",
                drift.line,
                drift.label,
                drift.near_misses.join(" | ")
            );
        }
    }

    println!();
    println!("{}", "-".repeat(60));
    println!(
        "Passed: {}  Mismatched: {}  Skipped: {}",
        report.passed, report.mismatched, report.skipped
    );
}

fn print_json_report(report: &ReconcileReport) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn print_tsv_report(report: &ReconcileReport) {
    println!("section\tstatus\tmatched_section_id\tquestions\tmatched\tmismatches\tformatting\thints");
    for section in &report.sections {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            section.name,
            section.status,
            section
                .matched_section_id
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            section.question_count,
            section.matched_questions,
            section.mismatches.len(),
            section.formatting.len(),
            section.hints.join("; "),
        );
    }
}
