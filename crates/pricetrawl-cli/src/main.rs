mod collect;
mod extract;
mod output;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use pricetrawl_core::ExtractRules;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pricetrawl")]
#[command(about = "Extract deduplicated product records from captured JSON API payloads")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch every configured source and write the deduplicated items to CSV
    Collect {
        /// Sources file (defaults to `PRICETRAWL_SOURCES_PATH`)
        #[arg(long)]
        sources: Option<PathBuf>,

        /// Output CSV path (defaults to `PRICETRAWL_OUT_CSV`)
        #[arg(long)]
        out: Option<PathBuf>,

        /// List the sources that would be fetched without fetching them
        #[arg(long)]
        dry_run: bool,
    },
    /// Run the extraction pipeline over an NDJSON capture file
    Replay {
        /// Capture file with one `{"url", "body"}` record per line
        #[arg(long)]
        capture: PathBuf,

        /// Output CSV path (defaults to `PRICETRAWL_OUT_CSV`)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Sources file whose `rules:` section replaces the default rules
        #[arg(long)]
        sources: Option<PathBuf>,
    },
    /// Extract items from a single JSON document and print them as JSON lines
    Extract {
        /// URL the document was served from
        #[arg(long)]
        origin: String,

        /// JSON document to read
        file: PathBuf,

        /// Sources file whose `rules:` section replaces the default rules
        #[arg(long)]
        sources: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = pricetrawl_core::load_app_config()?;
    init_tracing(&config.log_level)?;

    match cli.command {
        Some(Commands::Collect {
            sources,
            out,
            dry_run,
        }) => collect::run_collect(&config, sources, out, dry_run).await,
        Some(Commands::Replay {
            capture,
            out,
            sources,
        }) => {
            let rules = load_rules(sources.as_deref())?;
            collect::run_replay(&config, &capture, out, rules).await
        }
        Some(Commands::Extract {
            origin,
            file,
            sources,
        }) => {
            let rules = load_rules(sources.as_deref())?;
            extract::run_extract(&origin, &file, &rules)
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

/// `RUST_LOG` wins when set; otherwise the configured level applies.
/// Logs go to stderr so `extract` output on stdout stays machine-readable.
fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .with_context(|| format!("invalid log filter `{log_level}`"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn load_rules(sources: Option<&Path>) -> anyhow::Result<ExtractRules> {
    match sources {
        Some(path) => {
            let file = pricetrawl_core::load_sources(path)
                .with_context(|| format!("loading rules from {}", path.display()))?;
            Ok(file.rules)
        }
        None => Ok(ExtractRules::default()),
    }
}
