//! UBER Hypermedia CLI
//!
//! Command-line interface for converting JSON documents into UBER+JSON and
//! checking existing UBER documents.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use uber_hypermedia::{
    load_input, load_input_auto, to_uber_document, validate_document, BuildOptions, Link,
    Resource, ValidateError,
};

#[derive(Parser)]
#[command(name = "uber-hypermedia")]
#[command(about = "Convert JSON documents into UBER+JSON hypermedia")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a JSON document into an UBER document
    Convert {
        /// Input source: file path or URL (http:// or https://)
        source: String,

        /// Wrap the input in a resource with this link (repeatable)
        #[arg(long = "link", value_name = "REL=HREF", value_parser = parse_link)]
        links: Vec<Link>,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Disable cycle detection
        #[arg(long)]
        no_cycle_check: bool,

        /// Maximum nesting depth (0 for unlimited)
        #[arg(long, default_value_t = uber_hypermedia::DEFAULT_MAX_DEPTH)]
        max_depth: usize,

        /// Validate the produced document against the UBER+JSON schema
        #[arg(long)]
        validate: bool,
    },

    /// Check an UBER document against the UBER+JSON schema
    Check {
        /// UBER document to check
        document: PathBuf,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            source,
            links,
            output,
            pretty,
            no_cycle_check,
            max_depth,
            validate,
        } => {
            let options = BuildOptions::new()
                .detect_cycles(!no_cycle_check)
                .max_depth((max_depth > 0).then_some(max_depth));
            run_convert(&source, links, output, pretty, validate, &options)
        }

        Commands::Check { document, json } => run_check(&document, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Log to stderr; `RUST_LOG` overrides the default `warn` level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_link(s: &str) -> Result<Link, String> {
    match s.split_once('=') {
        Some((rel, href)) if !rel.is_empty() && !href.is_empty() => Ok(Link::new(href, rel)),
        _ => Err(format!("expected REL=HREF, got '{}'", s)),
    }
}

fn run_convert(
    source: &str,
    links: Vec<Link>,
    output: Option<PathBuf>,
    pretty: bool,
    validate: bool,
    options: &BuildOptions,
) -> Result<(), u8> {
    let input = load_input_auto(source).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let document = if links.is_empty() {
        to_uber_document(&input, options)
    } else {
        debug!(links = links.len(), "wrapping input in a resource");
        to_uber_document(&Resource::new(input).with_links(links), options)
    }
    .map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    if validate {
        let rendered = document.to_json_value().map_err(|e| {
            eprintln!("Error: {}", e);
            e.exit_code() as u8
        })?;
        report_validation(&rendered, false)?;
    }

    let json_output = if pretty {
        document.to_json_string_pretty()
    } else {
        document.to_json_string()
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        e.exit_code() as u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

fn run_check(document: &Path, json_output: bool) -> Result<(), u8> {
    let document = load_input(document).map_err(|e| {
        report_error(json_output, &format!("loading document: {}", e));
        e.exit_code() as u8
    })?;

    report_validation(&document, json_output)?;

    if json_output {
        println!(r#"{{"valid":true}}"#);
    } else {
        println!("Valid");
    }
    Ok(())
}

/// Validate a rendered document, reporting failures in plain text or JSON.
fn report_validation(document: &Value, json_output: bool) -> Result<(), u8> {
    match validate_document(document) {
        Ok(()) => Ok(()),
        Err(ValidateError::Invalid { errors }) => {
            if json_output {
                let output = serde_json::json!({
                    "valid": false,
                    "errors": errors
                });
                println!("{}", output);
            } else {
                eprintln!("Validation failed:");
                for error in errors {
                    eprintln!("  {}", error);
                }
            }
            Err(1)
        }
        Err(e) => {
            report_error(json_output, &e.to_string());
            Err(e.exit_code() as u8)
        }
    }
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", serde_json::json!({"valid": false, "error": msg}));
    } else {
        eprintln!("Error: {}", msg);
    }
}
