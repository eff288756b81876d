use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;
use crate::core::element::{DataElement, MetadataSection};
use crate::core::tree::MetadataTree;
use crate::parsing::metadata::parse_metadata_file;

#[derive(Args)]
pub struct FindArgs {
    /// Metadata JSON export
    #[arg(required = true)]
    pub metadata: PathBuf,

    /// Text to look for in any of an element's names (case-insensitive)
    #[arg(required = true)]
    pub keyword: String,

    /// Maximum number of elements to show
    #[arg(short = 'n', long, default_value = "50")]
    pub limit: usize,
}

pub fn run(args: FindArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let tree = parse_metadata_file(&args.metadata)?;
    let found = tree.find_elements(&args.keyword);

    if verbose {
        eprintln!(
            "{} of {} data elements match '{}'",
            found.len(),
            tree.elements.len(),
            args.keyword
        );
    }

    let shown: Vec<(&DataElement, Vec<&MetadataSection>)> = found
        .into_iter()
        .take(args.limit)
        .map(|e| (e, sections_containing(&tree, e)))
        .collect();

    match format {
        OutputFormat::Text => print_text_found(&args.keyword, &shown),
        OutputFormat::Json => print_json_found(&args.keyword, &shown)?,
        OutputFormat::Tsv => print_tsv_found(&shown),
    }

    Ok(())
}

fn sections_containing<'a>(
    tree: &'a MetadataTree,
    element: &DataElement,
) -> Vec<&'a MetadataSection> {
    tree.sections
        .iter()
        .filter(|s| s.elements.iter().any(|e| e.id == element.id))
        .collect()
}

fn section_names(sections: &[&MetadataSection]) -> Vec<String> {
    sections.iter().map(|s| s.name.clone()).collect()
}

fn print_text_found(keyword: &str, shown: &[(&DataElement, Vec<&MetadataSection>)]) {
    println!("Data elements matching '{keyword}'");
    println!("{}", "=".repeat(60));

    if shown.is_empty() {
        println!("  None found");
        return;
    }

    for (element, sections) in shown {
        println!("\n{} [{}]", element.label(), element.id);
        for candidate in &element.candidates {
            println!("    name: {candidate}");
        }
        if sections.is_empty() {
            println!("    section: (none)");
        } else {
            println!("    section: {}", section_names(sections).join(", "));
        }
    }
}

fn print_json_found(
    keyword: &str,
    shown: &[(&DataElement, Vec<&MetadataSection>)],
) -> anyhow::Result<()> {
    let elements: Vec<serde_json::Value> = shown
        .iter()
        .map(|(e, sections)| {
            serde_json::json!({
                "id": e.id,
                "label": e.label(),
                "candidates": e.candidates,
                "sections": section_names(sections),
            })
        })
        .collect();

    let output = serde_json::json!({
        "keyword": keyword,
        "elements": elements,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_found(shown: &[(&DataElement, Vec<&MetadataSection>)]) {
    println!("id\tlabel\tcandidates\tsections");
    for (element, sections) in shown {
        println!(
            "{}\t{}\t{}\t{}",
            element.id,
            element.label(),
            element.candidates.join(" | "),
            section_names(sections).join(", ")
        );
    }
}
