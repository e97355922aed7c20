use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use clap::Parser;
use ezi_lookup::{load_csv, run_session, Index, LookupConfig, LookupError, Result, Stage};
use tracing::info;

/// Look up property records by EZI_ADD address.
///
/// Queries are read from stdin, one per line. Matching records are written
/// to OUTPUT and a comparison summary per query goes to stdout.
#[derive(Parser, Debug)]
#[command(name = "ezi-lookup", version)]
struct Cli {
    /// 1 = linear scan, 2 = PATRICIA trie
    #[arg(value_parser = clap::value_parser!(u8).range(1..=2))]
    stage: u8,

    /// Address dataset (CSV)
    input: PathBuf,

    /// File receiving the matched records
    output: PathBuf,

    /// Report NOTFOUND instead of the closest key on a trie miss
    #[arg(long)]
    exact: bool,

    /// CSV field delimiter (single ASCII character)
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Treat the first CSV row as data
    #[arg(long)]
    no_header: bool,

    /// Show diagnostic logs on stderr
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all logs
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn config(&self) -> Result<LookupConfig> {
        if !self.delimiter.is_ascii() {
            return Err(LookupError::Config(format!(
                "delimiter {:?} is not a single ASCII character",
                self.delimiter
            )));
        }
        Ok(LookupConfig {
            stage: Stage::try_from(self.stage)?,
            closest_match: !self.exact,
            delimiter: self.delimiter as u8,
            has_headers: !self.no_header,
        })
    }
}

fn init_tracing(cli: &Cli) {
    // --quiet silences everything; --verbose honours RUST_LOG and falls back
    // to info; otherwise only warnings (skipped rows, bad coordinates) show.
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("off")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.config()?;
    let records = load_csv(&cli.input, &config)?;

    let file = File::create(&cli.output).map_err(|source| LookupError::Create {
        path: cli.output.clone(),
        source,
    })?;
    let mut records_out = BufWriter::new(file);

    let index = Index::build(&records, &config);
    info!(stage = %config.stage, records = records.len(), "index ready");

    let stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    run_session(&index, stdin, &mut records_out, &mut stdout)?;
    Ok(())
}
