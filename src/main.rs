//! Artboard Batch CLI
//!
//! Usage:
//!   artboard-batch [OPTIONS] <COMMAND>
//!
//! Commands:
//!   import    Generate artboards for every row
//!   update    Regenerate the selected artboards from matching rows
//!   validate  Check rows against the required fields
//!   session   Answer line-delimited JSON requests on stdin
//!
//! Options:
//!   -c, --config <FILE>  Field mapping configuration (TOML format)
//!   -v, --verbose        Raise log verbosity (repeatable)
//!   -h, --help           Print help

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use thiserror::Error;
use tracing::Level;

use artboard_batch::{
    import, update_selection, validate_rows, ConfigError, DocumentError, MemoryDocument,
    PipelineConfig, PipelineError, Request, Row, Session,
};

#[derive(Parser)]
#[command(name = "artboard-batch")]
#[command(about = "Generate design artboards from spreadsheet rows")]
struct Cli {
    /// Field mapping configuration (TOML format)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate artboards for every row and lay them out on the canvas
    Import {
        /// Document JSON holding the template page
        document: PathBuf,
        /// Rows as a JSON array of objects
        rows: PathBuf,
        /// Where to write the document (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Regenerate the document's selected artboards from matching rows
    Update {
        document: PathBuf,
        rows: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check rows against the required fields
    Validate { rows: PathBuf },
    /// Answer line-delimited JSON requests on stdin until the session closes
    Session {
        document: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Document(#[from] DocumentError),
    #[error("{0}")]
    Pipeline(#[from] PipelineError),
    #[error("failed to read rows '{path}': {source}")]
    Rows {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse rows '{path}': {source}")]
    RowsJson {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to write response: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode response: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };

    match cli.command {
        Command::Import {
            document,
            rows,
            output,
        } => {
            let mut doc = MemoryDocument::from_file(&document)?;
            let rows = read_rows(&rows)?;
            // Rows placed before a failure stay in the written document
            let result = import(&mut doc, &rows, &config);
            doc.write_file(output.as_deref().unwrap_or(&document))?;
            println!("Successfully imported {} artboards", result?.placed.len());
        }
        Command::Update {
            document,
            rows,
            output,
        } => {
            let mut doc = MemoryDocument::from_file(&document)?;
            let rows = read_rows(&rows)?;
            let result = update_selection(&mut doc, &rows, &config);
            doc.write_file(output.as_deref().unwrap_or(&document))?;
            println!("Successfully updated {} artboards", result?.placed.len());
        }
        Command::Validate { rows } => {
            let rows = read_rows(&rows)?;
            validate_rows(&rows, &config.required_fields)?;
            println!("{} rows are valid", rows.len());
        }
        Command::Session { document, output } => {
            let doc = MemoryDocument::from_file(&document)?;
            let doc = serve(Session::new(doc, config))?;
            doc.write_file(output.as_deref().unwrap_or(&document))?;
        }
    }
    Ok(())
}

/// Answer requests from stdin, one JSON object per line
fn serve(mut session: Session<MemoryDocument>) -> Result<MemoryDocument, CliError> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let request: Request = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("ignoring malformed request: {}", e);
                continue;
            }
        };

        let response = session.handle(request)?;
        writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
        stdout.flush()?;

        if session.is_closed() {
            break;
        }
    }

    Ok(session.into_document())
}

fn read_rows(path: &Path) -> Result<Vec<Row>, CliError> {
    let content = fs::read_to_string(path).map_err(|source| CliError::Rows {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CliError::RowsJson {
        path: path.to_path_buf(),
        source,
    })
}
