use std::path::PathBuf;

use clap::Args;

use crate::cli::{ChecklistFlags, OutputFormat};
use crate::matching::duplicates::{
    find_checklist_duplicates, find_metadata_duplicates, DuplicateReport,
};
use crate::parsing::checklist::parse_checklist_file;
use crate::parsing::metadata::parse_metadata_file;

#[derive(Args)]
pub struct DuplicatesArgs {
    /// Checklist CSV file to scan
    #[arg(long, required_unless_present = "metadata")]
    pub checklist: Option<PathBuf>,

    /// Metadata JSON export to scan
    #[arg(long)]
    pub metadata: Option<PathBuf>,

    #[command(flatten)]
    pub checklist_flags: ChecklistFlags,
}

pub fn run(args: DuplicatesArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut sources: Vec<(&str, DuplicateReport)> = Vec::new();

    if let Some(path) = &args.checklist {
        let run_config = args.checklist_flags.load()?;
        let tree = parse_checklist_file(path, &run_config.checklist)?;
        if verbose {
            eprintln!("Checklist: {} sections", tree.sections.len());
        }
        sources.push(("checklist", find_checklist_duplicates(&tree)));
    }

    if let Some(path) = &args.metadata {
        let tree = parse_metadata_file(path)?;
        if verbose {
            eprintln!("Metadata: {} sections", tree.sections.len());
        }
        sources.push(("metadata", find_metadata_duplicates(&tree)));
    }

    match format {
        OutputFormat::Text => print_text_duplicates(&sources),
        OutputFormat::Json => print_json_duplicates(&sources)?,
        OutputFormat::Tsv => print_tsv_duplicates(&sources),
    }

    Ok(())
}

fn print_text_duplicates(sources: &[(&str, DuplicateReport)]) {
    for (source, report) in sources {
        println!("Duplicate sections in {source}");
        println!("{}", "=".repeat(60));

        if report.is_empty() {
            println!("  None found");
        }
        for group in &report.groups {
            println!("  {} (x{})", group.name, group.count);
            if !group.ids.is_empty() {
                let ids: Vec<String> = group.ids.iter().map(ToString::to_string).collect();
                println!("    ids: {}", ids.join(", "));
            }
            if !group.ordinals.is_empty() {
                let ordinals: Vec<String> =
                    group.ordinals.iter().map(ToString::to_string).collect();
                println!("    section positions: {}", ordinals.join(", "));
            }
        }
        println!();
    }
}

fn print_json_duplicates(sources: &[(&str, DuplicateReport)]) -> anyhow::Result<()> {
    let mut output = serde_json::Map::new();
    for (source, report) in sources {
        output.insert(
            (*source).to_string(),
            serde_json::json!({
                "counts": report.counts(),
                "groups": report.groups,
            }),
        );
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_duplicates(sources: &[(&str, DuplicateReport)]) {
    println!("source\tname\tcount\tids\tordinals");
    for (source, report) in sources {
        for group in &report.groups {
            let ids: Vec<String> = group.ids.iter().map(ToString::to_string).collect();
            let ordinals: Vec<String> = group.ordinals.iter().map(ToString::to_string).collect();
            println!(
                "{}\t{}\t{}\t{}\t{}",
                source,
                group.name,
                group.count,
                ids.join(","),
                ordinals.join(",")
            );
        }
    }
}
