use clap::{Parser, Subcommand};
use iff85::id::ID_JJJJ;
use iff85::{iff, RawChunk, RawEngine};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "iff", about = "Inspect and assemble IFF-85 files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a file's structure
    Check {
        input: PathBuf,
    },
    /// Print a file's chunk tree
    Print {
        input: PathBuf,
        /// Dump the tree as JSON instead of the indented listing
        #[arg(long)]
        json: bool,
        /// Indent level of the root chunk
        #[arg(short, long, default_value = "0")]
        indent: usize,
    },
    /// Compare two files structurally; exits with status 1 when they differ
    Compare {
        first:  PathBuf,
        second: PathBuf,
    },
    /// Wrap the root chunks of several files into one CAT
    Join {
        #[arg(short, long)]
        output: PathBuf,
        #[arg(required = true, num_args = 1..)]
        input: Vec<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {

        // ── Check ────────────────────────────────────────────────────────────
        Commands::Check { input } => {
            let chunk = iff::read(&input, &RawEngine, &[])?;
            iff::check(&chunk, &RawEngine, &[])?;
            println!("{}: valid IFF-85 file", input.display());
        }

        // ── Print ────────────────────────────────────────────────────────────
        Commands::Print { input, json, indent } => {
            let chunk = iff::read(&input, &RawEngine, &[])?;
            if json {
                println!("{}", serde_json::to_string_pretty(&chunk)?);
            } else {
                let stdout = std::io::stdout();
                iff::print(&mut stdout.lock(), &chunk, indent, &RawEngine, &[])?;
            }
        }

        // ── Compare ──────────────────────────────────────────────────────────
        Commands::Compare { first, second } => {
            let a = iff::read(&first, &RawEngine, &[])?;
            let b = iff::read(&second, &RawEngine, &[])?;
            if iff::compare(&a, &b, &RawEngine, &[]) {
                println!("The IFF files are equal");
            } else {
                println!("The IFF files are not equal");
                std::process::exit(1);
            }
        }

        // ── Join ─────────────────────────────────────────────────────────────
        Commands::Join { output, input } => {
            let mut chunks = Vec::with_capacity(input.len());
            for path in &input {
                chunks.push(iff::read(path, &RawEngine, &[])?);
                println!("  joined  {}", path.display());
            }
            let cat = RawChunk::cat(ID_JJJJ, chunks);
            iff::check(&cat, &RawEngine, &[])?;
            iff::write(&output, &cat, &RawEngine, &[])?;
            println!("Created: {}", output.display());
        }
    }

    Ok(())
}
