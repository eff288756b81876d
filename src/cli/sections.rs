use std::path::PathBuf;

use clap::Args;

use crate::cli::{ChecklistFlags, OutputFormat};
use crate::core::tree::ChecklistTree;
use crate::parsing::checklist::parse_checklist_file;

#[derive(Args)]
pub struct SectionsArgs {
    /// Checklist CSV file
    #[arg(required = true)]
    pub checklist: PathBuf,

    #[command(flatten)]
    pub checklist_flags: ChecklistFlags,
}

pub fn run(args: SectionsArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let run_config = args.checklist_flags.load()?;
    let tree = parse_checklist_file(&args.checklist, &run_config.checklist)?;

    if verbose {
        eprintln!(
            "Rows: {} ({} blank, {} headers, {} questions, {} noise)",
            tree.stats.rows,
            tree.stats.blank,
            tree.stats.headers,
            tree.stats.questions,
            tree.stats.noise
        );
    }

    match format {
        OutputFormat::Text => print_text_sections(&tree),
        OutputFormat::Json => print_json_sections(&tree)?,
        OutputFormat::Tsv => print_tsv_sections(&tree),
    }

    Ok(())
}

fn print_text_sections(tree: &ChecklistTree) {
    println!("Checklist Sections");
    println!("{}", "=".repeat(60));

    let names: Vec<&str> = tree.facilities.iter().map(|f| f.name.as_str()).collect();
    println!("Facility columns: {}", names.join(", "));

    for section in &tree.sections {
        println!(
            "\n{}. {} (line {}, {} questions)",
            section.ordinal + 1,
            section.name,
            section.line,
            section.questions.len()
        );
        let counts = section.applicability_counts(tree.facilities.len());
        for (facility, count) in tree.facilities.iter().zip(counts) {
            if count > 0 {
                println!("    {}: {}", facility.name, count);
            }
        }
    }

    println!(
        "\nTotal: {} sections, {} questions",
        tree.sections.len(),
        tree.question_count()
    );
}

fn print_json_sections(tree: &ChecklistTree) -> anyhow::Result<()> {
    let sections: Vec<serde_json::Value> = tree
        .sections
        .iter()
        .map(|s| {
            serde_json::json!({
                "name": s.name,
                "raw_name": s.raw_name,
                "ordinal": s.ordinal,
                "line": s.line,
                "question_count": s.questions.len(),
                "applicability": s.applicability_counts(tree.facilities.len()),
            })
        })
        .collect();

    let output = serde_json::json!({
        "facilities": tree.facilities,
        "sections": sections,
        "stats": tree.stats,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_sections(tree: &ChecklistTree) {
    let mut header = vec!["ordinal", "section", "line", "questions"];
    header.extend(tree.facilities.iter().map(|f| f.name.as_str()));
    println!("{}", header.join("\t"));

    for section in &tree.sections {
        let counts: Vec<String> = section
            .applicability_counts(tree.facilities.len())
            .iter()
            .map(ToString::to_string)
            .collect();
        println!(
            "{}\t{}\t{}\t{}\t{}",
            section.ordinal,
            section.name,
            section.line,
            section.questions.len(),
            counts.join("\t")
        );
    }
}
