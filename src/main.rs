use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use phpdoc_extract::config::Config;
use phpdoc_extract::render::render;
use phpdoc_extract::{ExtractError, FileReport, OutputFormat, extract_path};

/// Extract PHPDoc parameter and return types from PHP files.
#[derive(Parser, Debug)]
#[command(name = "phpdoc-extract", version, about)]
struct Cli {
    /// Output format (defaults to the config value, then `line`).
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Configuration file to use instead of the implicit locations.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Resolve class names in docblocks against namespaces and imports.
    #[arg(long)]
    qualify_doc_types: bool,

    /// Increase log verbosity (`-v` info, `-vv` debug).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// PHP files or directories to scan.
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<PathBuf>,
}

/// Exit code for a file that could not be parsed.
const EXIT_SYNTAX: u8 = 1;
/// Exit code for a configuration or input path error.
const EXIT_FATAL: u8 = 2;

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<Vec<FileReport>, ExtractError> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = Config::load(cli.config.as_deref(), &cwd)?;

    let mut options = config.extract;
    options.qualify_doc_types |= cli.qualify_doc_types;
    let format = cli.format.unwrap_or(config.output.format);

    let mut reports = Vec::new();
    for path in &cli.paths {
        reports.extend(extract_path(path, &options)?);
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    render(&reports, format, &mut out).map_err(|source| ExtractError::Io {
        path: PathBuf::from("<stdout>"),
        source,
    })?;
    out.flush().map_err(|source| ExtractError::Io {
        path: PathBuf::from("<stdout>"),
        source,
    })?;

    Ok(reports)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let reports = match run(&cli) {
        Ok(reports) => reports,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(EXIT_FATAL);
        }
    };

    let mut failed = 0usize;
    let mut records = 0usize;
    let mut diagnostics = 0usize;
    for report in &reports {
        match &report.outcome {
            Ok(extraction) => {
                records += extraction.functions.len();
                diagnostics += extraction.diagnostics.len();
            }
            Err(e) => {
                failed += 1;
                tracing::error!(path = %report.path.display(), error = %e, "file skipped");
            }
        }
    }
    tracing::info!(
        files = reports.len(),
        records,
        diagnostics,
        failed,
        "done"
    );

    if failed > 0 {
        ExitCode::from(EXIT_SYNTAX)
    } else {
        ExitCode::SUCCESS
    }
}
