use clap::Parser;
use tracing_subscriber::EnvFilter;

use genome_jaccard::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("genome_jaccard=debug,info")
    } else {
        EnvFilter::new("genome_jaccard=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Compare(args) => {
            cli::compare::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Ingest(args) => {
            cli::ingest::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::List(args) => {
            cli::list::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
