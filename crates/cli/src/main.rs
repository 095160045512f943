//! YARPC CLI
//!
//! Command-line interface for compiling YARPC service descriptions into
//! OpenAPI 3.1 documents.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use yarpc_common::{OpenApiDocument, RpcDocument};
use yarpc_generator::{emit, transform, write_to_file, OutputFormat};
use yarpc_parser::RpcParser;

/// Output path that writes to stdout instead of a file
const STDOUT_PATH: &str = "-";

#[derive(Parser)]
#[command(name = "yarpc")]
#[command(version, about = "Compile YARPC service descriptions into OpenAPI documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an OpenAPI document from a YARPC file
    #[command(after_help = "EXAMPLES:\n  \
        # Write openapi.json next to the service description\n  \
        yarpc generate -i widgets.yarpc.yaml\n\n  \
        # Format follows the output extension\n  \
        yarpc generate -i widgets.yarpc.yaml -o openapi.yaml\n\n  \
        # Print YAML to stdout\n  \
        yarpc generate -i widgets.yarpc.yaml -o - -f yaml")]
    Generate {
        /// Input YARPC file path
        #[arg(short, long)]
        input: PathBuf,

        /// Output OpenAPI file path ("-" for stdout)
        #[arg(short, long, default_value = "openapi.json")]
        output: PathBuf,

        /// Output format (inferred from the output extension if not specified)
        #[arg(short, long)]
        format: Option<Format>,
    },

    /// Show the routes a YARPC file compiles to
    Inspect {
        /// Input YARPC file path
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Json => write!(f, "JSON"),
            Format::Yaml => write!(f, "YAML"),
        }
    }
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => OutputFormat::Json,
            Format::Yaml => OutputFormat::Yaml,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate {
            input,
            output,
            format,
        } => generate_command(&input, &output, format, cli.verbose),
        Commands::Inspect { input } => inspect_command(&input),
    }
}

/// Log to stderr; `RUST_LOG` wins over the verbosity flag
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load(input: &Path) -> Result<RpcDocument> {
    tracing::debug!(input = %input.display(), "Loading YARPC document");
    RpcParser::from_file(input)
        .map(RpcParser::into_document)
        .with_context(|| format!("Failed to load {}", input.display()))
}

fn compile(doc: &RpcDocument) -> Result<OpenApiDocument> {
    transform(doc).context("Failed to transform YARPC document")
}

fn generate_command(
    input: &Path,
    output: &Path,
    format: Option<Format>,
    verbose: bool,
) -> Result<()> {
    let to_stdout = output.as_os_str() == STDOUT_PATH;
    let format = resolve_format(format, output);

    // Progress lines would corrupt a document written to stdout
    let progress = |line: String| {
        if !to_stdout {
            println!("{}", line);
        }
    };

    progress(format!("{} Compiling {}", "→".cyan(), input.display()));
    if verbose {
        progress(format!("  Output: {}", output.display()));
        progress(format!("  Format: {}", OutputFormat::from(format)));
    }

    let doc = load(input)?;
    progress(format!(
        "{} Loaded {} queries and {} mutations",
        "✓".green(),
        doc.operations.queries.len(),
        doc.operations.mutations.len()
    ));

    let openapi = compile(&doc)?;
    progress(format!(
        "{} Generated {} paths",
        "✓".green(),
        openapi.paths.len()
    ));

    if to_stdout {
        let rendered = emit(&openapi, format.into()).context("Failed to serialize document")?;
        std::io::stdout()
            .write_all(rendered.as_bytes())
            .context("Failed to write to stdout")?;
        return Ok(());
    }

    write_to_file(&openapi, format.into(), output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("\n{}", "✓ Generation complete!".green().bold());
    println!("  📄 {} ({})", output.display(), format.to_string().yellow());

    Ok(())
}

fn inspect_command(input: &Path) -> Result<()> {
    println!("{} Inspecting {}", "→".cyan(), input.display());

    let doc = load(input)?;
    let openapi = compile(&doc)?;

    let hand_written = doc.paths.as_ref().map_or(0, |paths| paths.len());
    let derived: Vec<_> = doc
        .operations
        .queries
        .keys()
        .chain(doc.operations.mutations.keys())
        .collect();

    println!("\n{}", "Routes:".bold());
    for (path, item) in &openapi.paths {
        for (method, operation) in &item.operations {
            let operation_id = operation.operation_id.as_deref().unwrap_or("-");
            let marker = if derived.iter().any(|id| id.as_str() == operation_id) {
                operation_id.cyan()
            } else {
                operation_id.normal()
            };
            println!(
                "  {:<7} {} → {}",
                method.as_str().to_uppercase(),
                path,
                marker
            );
        }
    }

    println!("\n{}", "Summary:".bold());
    println!("  Queries: {}", doc.operations.queries.len());
    println!("  Mutations: {}", doc.operations.mutations.len());
    println!("  Hand-written paths: {}", hand_written);

    Ok(())
}

/// Explicit format, else the output extension, else JSON
fn resolve_format(format: Option<Format>, output: &Path) -> Format {
    format.unwrap_or_else(|| match OutputFormat::from_extension(output) {
        Some(OutputFormat::Yaml) => Format::Yaml,
        _ => Format::Json,
    })
}
