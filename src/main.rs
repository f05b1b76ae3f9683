use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use twirpcpp::codegen::{self, GenerationStats};
use twirpcpp::plugin::{self, InputSource};

/// protoc plugin generating C++ Twirp clients and servers.
///
/// Invoked by protoc with no arguments, it reads a CodeGeneratorRequest on
/// stdin and writes the CodeGeneratorResponse to stdout. The subcommands
/// replay a request captured by `protodump` without protoc.
#[derive(Parser)]
#[command(name = "protoc-gen-twirpcpp", version, about)]
struct Cli {
    /// Read the request from a base64 fixture file instead of stdin.
    #[arg(long, env = "PROTO_SOURCE", global = true)]
    proto_source: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate and write the artifacts to a directory.
    Render {
        /// Output directory for generated C++ files.
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Suppress non-error output.
        #[arg(long, short)]
        quiet: bool,
    },

    /// Print the generation context of every target file as JSON.
    Describe,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");

        // Print cause chain.
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = std::error::Error::source(cause);
        }

        process::exit(1);
    }
}

/// Log to stderr; stdout is reserved for the protoc response.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("TWIRPCPP_LOG").unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> twirpcpp::error::Result<()> {
    let source = InputSource::from_config(cli.proto_source);
    let graph = plugin::decode(&source.read()?)?;

    match cli.command {
        None => {
            let artifacts = codegen::generate(&graph)?;
            let response = plugin::encode(&artifacts);
            plugin::write_response(&response, std::io::stdout().lock())?;
        }

        Some(Commands::Render { output_dir, quiet }) => {
            let artifacts = codegen::generate(&graph)?;
            codegen::write_artifacts(&artifacts, &output_dir)?;

            if !quiet {
                let stats = GenerationStats::for_graph(&graph);
                eprintln!(
                    "Generated {} files for {} services ({} methods) in {}",
                    stats.artifacts_written,
                    stats.services_generated,
                    stats.methods_generated,
                    output_dir.display()
                );
            }
        }

        Some(Commands::Describe) => {
            let contexts = codegen::contexts(&graph)?;
            println!("{}", serde_json::to_string_pretty(&contexts)?);
        }
    }

    Ok(())
}
