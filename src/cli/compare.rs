use std::path::PathBuf;

use clap::Args;

use crate::cli::{OutputFormat, StoreArgs};
use crate::matching::scoring::SimilarityScore;
use crate::pipeline::{calc_jaccard_files, IngestReport};
use crate::store::GenomeDb;

#[derive(Args)]
pub struct CompareArgs {
    /// First sequence file (plain text or FASTA)
    #[arg(required = true)]
    pub input_a: PathBuf,

    /// Second sequence file (plain text or FASTA)
    #[arg(required = true)]
    pub input_b: PathBuf,

    #[command(flatten)]
    pub store: StoreArgs,
}

pub fn run(args: CompareArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = args.store.resolve()?;
    let db = GenomeDb::open(&config.database)?;

    if verbose {
        eprintln!(
            "Using database {} with k = {}",
            config.database.display(),
            config.shingle_length
        );
    }

    let (report_a, report_b, score) =
        calc_jaccard_files(&db, &args.input_a, &args.input_b, config.shingle_length)?;

    if verbose {
        print_ingest_summary(&report_a);
        print_ingest_summary(&report_b);
    }

    match format {
        OutputFormat::Text => print_text_comparison(&report_a, &report_b, &score),
        OutputFormat::Json => print_json_comparison(&report_a, &report_b, &score)?,
        OutputFormat::Tsv => print_tsv_comparison(&score),
    }

    Ok(())
}

fn print_ingest_summary(report: &IngestReport) {
    if report.outcome.skipped {
        eprintln!(
            "{} (id {}): already shingled for k = {}",
            report.name, report.source_id, report.shingle_length
        );
    } else {
        eprintln!(
            "{} (id {}): stored {} shingles",
            report.name, report.source_id, report.outcome.inserted
        );
    }
}

fn print_text_comparison(a: &IngestReport, b: &IngestReport, score: &SimilarityScore) {
    println!(
        "Jaccard similarity for '{}' and '{}' (k = {}) = {}",
        a.name, b.name, score.shingle_length, score.jaccard
    );
    println!("  Shared shingles: {}", score.intersection);
    println!("  Total distinct shingles: {}", score.union);
}

fn print_json_comparison(
    a: &IngestReport,
    b: &IngestReport,
    score: &SimilarityScore,
) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "input_a": a,
        "input_b": b,
        "score": score,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_comparison(score: &SimilarityScore) {
    println!("source_a\tsource_b\tk\tintersection\tunion\tjaccard");
    println!(
        "{}\t{}\t{}\t{}\t{}\t{}",
        score.source_a,
        score.source_b,
        score.shingle_length,
        score.intersection,
        score.union,
        score.jaccard,
    );
}
