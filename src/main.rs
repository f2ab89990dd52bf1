mod config;
mod error;
mod extract;
mod fields;
mod format;
mod sanitize;
mod source;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use polity_types::EntityRecord;
use tracing_subscriber::EnvFilter;

use error::AppError;
use format::{FormatOptions, Layout};
use source::{DirectorySource, DocumentSource, WikipediaSource};

#[derive(Parser)]
#[command(
    name = "polity_compare",
    about = "Compare country infobox statistics side by side"
)]
struct Cli {
    /// Page titles to compare, e.g. "Canada" "France" (default: Canada France Italy)
    entities: Vec<String>,

    /// MediaWiki API endpoint
    #[arg(long, env = "POLITY_API_URL", default_value = config::DEFAULT_API_URL)]
    api_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "POLITY_TIMEOUT", default_value_t = config::DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Read `<entity>.wiki` files from this directory instead of the network
    #[arg(long, env = "POLITY_SOURCE_DIR")]
    source_dir: Option<PathBuf>,

    /// Do not color the winning cell of each row
    #[arg(long)]
    no_color: bool,

    /// List every extracted field instead of the grouped sections
    #[arg(long)]
    all_fields: bool,

    /// Debug logging on stderr (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(report) => {
            print!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "comparison failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter(verbose))),
        )
        .init();
}

fn run(cli: &Cli) -> Result<String, AppError> {
    let entities: Vec<String> = if cli.entities.is_empty() {
        config::DEFAULT_ENTITIES
            .iter()
            .map(|s| s.to_string())
            .collect()
    } else {
        cli.entities.clone()
    };

    let source: Box<dyn DocumentSource> = match &cli.source_dir {
        Some(dir) => Box::new(DirectorySource::new(dir)),
        None => Box::new(WikipediaSource::new(
            &cli.api_url,
            Duration::from_secs(cli.timeout),
        )?),
    };

    let records = collect_records(source.as_ref(), &entities)?;

    let mut options = FormatOptions::default();
    if cli.no_color {
        options.highlight = false;
    }
    if cli.all_fields {
        options.layout = Layout::Flat;
    }
    Ok(format::format_report(&entities, &records, options)?)
}

/// Fetch and parse each entity in order; the first failure aborts the run.
fn collect_records(
    source: &dyn DocumentSource,
    entities: &[String],
) -> Result<Vec<EntityRecord>, AppError> {
    let mut records = Vec::with_capacity(entities.len());
    for entity in entities {
        let document = source.fetch(entity)?;
        tracing::debug!(
            entity = %entity,
            source = source.kind(),
            bytes = document.len(),
            "fetched document"
        );

        let record = fields::build_record(&document)?;
        let absent = record.absent_keys();
        if !absent.is_empty() {
            tracing::debug!(entity = %entity, absent = ?absent, "fields not found");
        }
        records.push(record);
    }
    Ok(records)
}
