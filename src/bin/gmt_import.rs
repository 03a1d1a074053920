use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use gmt_import::config::{ConfigLoader, Overrides};
use gmt_import::domain::{DedupPolicy, OutputForm, SourceLocator};
use gmt_import::error::GmtError;
use gmt_import::importer::{ImportResult, Importer};
use gmt_import::output::{GmtOutput, ImportSummary, JsonOutput};
use gmt_import::source::HttpSourceClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Counts and duplicate report as JSON.
    Summary,
    /// Full result as JSON.
    Json,
    /// GMT text (collection output only).
    Gmt,
}

#[derive(Parser)]
#[command(name = "gmt-import")]
#[command(about = "Import a GMT gene-set file from a path or URL (gzip-aware)")]
#[command(version)]
struct Cli {
    /// Local path or http(s) URL of the GMT resource.
    source: String,

    /// Gene identifier namespace (symbol, entrez, ensembl, uniprot or any tag).
    #[arg(long)]
    id_type: Option<String>,

    #[arg(long, value_enum)]
    dedup: Option<DedupPolicy>,

    #[arg(long, value_enum)]
    output: Option<OutputForm>,

    #[arg(long, value_enum, default_value_t = Format::Summary)]
    format: Format,

    /// Write GMT output to this file instead of stdout.
    #[arg(long)]
    out: Option<Utf8PathBuf>,

    #[arg(long)]
    config: Option<String>,

    /// Network timeout in seconds for remote sources.
    #[arg(long)]
    timeout: Option<u64>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<GmtError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &GmtError) -> u8 {
    match error {
        GmtError::MalformedLine { .. } | GmtError::DuplicateNames(_) => 2,
        GmtError::SourceUnavailable { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    // Duplicate-name warnings stay visible unless RUST_LOG says otherwise
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ConfigLoader::resolve(cli.config.as_deref())?.apply_overrides(Overrides {
        gene_id_type: cli.id_type.clone(),
        dedup: cli.dedup,
        output: cli.output,
        timeout_secs: cli.timeout,
    })?;

    if cli.format == Format::Gmt && config.output == OutputForm::Mapping {
        return Err(miette::Report::msg(
            "GMT output needs descriptions; use --output collection",
        ));
    }

    let source: SourceLocator = cli.source.parse()?;
    let importer = Importer::new(HttpSourceClient::with_timeout(config.timeout)?);
    let outcome = importer.import_with_report(&source, &config.import_options())?;

    match cli.format {
        Format::Summary => {
            let summary = ImportSummary::from_outcome(&cli.source, &outcome);
            JsonOutput::print_summary(&summary).into_diagnostic()?;
        }
        Format::Json => JsonOutput::print_result(&outcome.result).into_diagnostic()?,
        Format::Gmt => {
            let ImportResult::Collection(collection) = &outcome.result else {
                return Err(miette::Report::msg("GMT output needs a collection result"));
            };
            match &cli.out {
                Some(path) => GmtOutput::write_atomic(collection, path)?,
                None => GmtOutput::print(collection).into_diagnostic()?,
            }
        }
    }
    Ok(())
}
