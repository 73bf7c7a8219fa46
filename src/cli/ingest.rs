use std::path::PathBuf;

use clap::Args;

use crate::cli::{OutputFormat, StoreArgs};
use crate::pipeline::{ingest_file, IngestReport};
use crate::store::GenomeDb;

#[derive(Args)]
pub struct IngestArgs {
    /// Sequence files to register and shingle
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    #[command(flatten)]
    pub store: StoreArgs,
}

pub fn run(args: IngestArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = args.store.resolve()?;
    let db = GenomeDb::open(&config.database)?;

    if verbose {
        eprintln!(
            "Ingesting {} file(s) into {} with k = {}",
            args.inputs.len(),
            config.database.display(),
            config.shingle_length
        );
    }

    let reports = args
        .inputs
        .iter()
        .map(|path| ingest_file(&db, path, config.shingle_length))
        .collect::<Result<Vec<_>, _>>()?;

    match format {
        OutputFormat::Text => print_text_reports(&reports),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Tsv => print_tsv_reports(&reports),
    }

    Ok(())
}

fn print_text_reports(reports: &[IngestReport]) {
    for report in reports {
        let status = if report.outcome.skipped {
            "already shingled".to_string()
        } else {
            format!("stored {} shingles", report.outcome.inserted)
        };
        println!(
            "{} (id {}, k = {}): {}",
            report.name, report.source_id, report.shingle_length, status
        );
    }
}

fn print_tsv_reports(reports: &[IngestReport]) {
    println!("name\tsource_id\tk\textracted\tinserted\tskipped");
    for report in reports {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            report.name,
            report.source_id,
            report.shingle_length,
            report.extracted,
            report.outcome.inserted,
            report.outcome.skipped,
        );
    }
}
