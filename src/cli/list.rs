use clap::Args;
use serde::Serialize;

use crate::cli::{OutputFormat, StoreArgs};
use crate::core::sequence::{SequenceRecord, ShingledLength};
use crate::store::GenomeDb;

#[derive(Args)]
pub struct ListArgs {
    // With -k, or a config file that sets shingle_length, only that length is shown
    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Serialize)]
struct ListEntry {
    #[serde(flatten)]
    record: SequenceRecord,
    shingled: Vec<ShingledLength>,
}

pub fn run(args: ListArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = args.store.resolve()?;
    let length_filter = args.store.explicit_shingle_length()?;
    let db = GenomeDb::open(&config.database)?;

    let records = db.registry().list()?;
    if verbose {
        eprintln!(
            "{} registered sequence(s) in {}",
            records.len(),
            config.database.display()
        );
    }

    let mut entries = Vec::with_capacity(records.len());
    for record in records {
        let mut shingled = db.shingles().ingested_lengths(record.id)?;
        if let Some(k) = length_filter {
            shingled.retain(|s| s.length == k);
        }
        entries.push(ListEntry { record, shingled });
    }

    match format {
        OutputFormat::Text => print_text_list(&entries),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Tsv => print_tsv_list(&entries),
    }

    Ok(())
}

fn print_text_list(entries: &[ListEntry]) {
    if entries.is_empty() {
        println!("No sequences registered.");
        return;
    }

    for entry in entries {
        println!("{:>6}  {}", entry.record.id, entry.record.name);
        if entry.shingled.is_empty() {
            println!("        (no shingles stored)");
        }
        for s in &entry.shingled {
            println!("        k = {:<4} {} shingles", s.length, s.count);
        }
    }
}

fn print_tsv_list(entries: &[ListEntry]) {
    println!("source_id\tname\tmd5\tk\tshingles");
    for entry in entries {
        let md5 = entry.record.md5.as_deref().unwrap_or("");
        if entry.shingled.is_empty() {
            println!("{}\t{}\t{}\t\t", entry.record.id, entry.record.name, md5);
        }
        for s in &entry.shingled {
            println!(
                "{}\t{}\t{}\t{}\t{}",
                entry.record.id, entry.record.name, md5, s.length, s.count
            );
        }
    }
}
