use std::path::PathBuf;

use clap::Args;

use crate::cli::{ChecklistFlags, OutputFormat};
use crate::core::section::{ChecklistSection, Facility, Question};
use crate::parsing::checklist::parse_checklist_file;

#[derive(Args)]
pub struct ApplicabilityArgs {
    /// Checklist CSV file
    #[arg(required = true)]
    pub checklist: PathBuf,

    /// Facility column (case-insensitive, substring match)
    #[arg(long, required = true)]
    pub facility: String,

    /// Only list questions from sections with this name
    #[arg(short, long)]
    pub section: Option<String>,

    #[command(flatten)]
    pub checklist_flags: ChecklistFlags,
}

pub fn run(args: ApplicabilityArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let run_config = args.checklist_flags.load()?;
    let tree = parse_checklist_file(&args.checklist, &run_config.checklist)?;

    let facility = tree.find_facility(&args.facility).ok_or_else(|| {
        let names: Vec<&str> = tree.facilities.iter().map(|f| f.name.as_str()).collect();
        anyhow::anyhow!(
            "No facility column matches '{}' (available: {})",
            args.facility,
            names.join(", ")
        )
    })?;

    let sections: Vec<&ChecklistSection> = match &args.section {
        Some(name) => tree.sections_named(name).collect(),
        None => tree.sections.iter().collect(),
    };
    if let Some(name) = &args.section {
        if sections.is_empty() {
            anyhow::bail!("No checklist section named '{name}'");
        }
    }

    let hits: Vec<(&ChecklistSection, &Question)> = sections
        .iter()
        .flat_map(|&s| s.applicable_to(facility.index).map(move |q| (s, q)))
        .collect();

    if verbose {
        eprintln!(
            "Facility column {} ({}): {} of {} questions applicable",
            facility.index + 1,
            facility.name,
            hits.len(),
            sections.iter().map(|s| s.questions.len()).sum::<usize>()
        );
    }

    match format {
        OutputFormat::Text => print_text_applicability(facility, &sections, &hits),
        OutputFormat::Json => print_json_applicability(facility, &hits)?,
        OutputFormat::Tsv => print_tsv_applicability(&hits),
    }

    Ok(())
}

fn print_text_applicability(
    facility: &Facility,
    sections: &[&ChecklistSection],
    hits: &[(&ChecklistSection, &Question)],
) {
    println!("Questions applicable to {}", facility.name);
    println!("{}", "=".repeat(60));

    for section in sections {
        let questions: Vec<&Question> = hits
            .iter()
            .filter(|(s, _)| s.ordinal == section.ordinal)
            .map(|(_, q)| *q)
            .collect();
        if questions.is_empty() {
            continue;
        }
        println!("\n{} ({}/{})", section.name, questions.len(), section.questions.len());
        for question in questions {
            println!("  - {}", question.label);
        }
    }

    println!("\nTotal: {} questions", hits.len());
}

fn print_json_applicability(
    facility: &Facility,
    hits: &[(&ChecklistSection, &Question)],
) -> anyhow::Result<()> {
    let questions: Vec<serde_json::Value> = hits
        .iter()
        .map(|(s, q)| {
            serde_json::json!({
                "section": s.name,
                "label": q.label,
                "line": q.line,
            })
        })
        .collect();

    let output = serde_json::json!({
        "facility": facility,
        "count": hits.len(),
        "questions": questions,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_applicability(hits: &[(&ChecklistSection, &Question)]) {
    println!("section\tline\tquestion");
    for (section, question) in hits {
        println!("{}\t{}\t{}", section.name, question.line, question.label);
    }
}
