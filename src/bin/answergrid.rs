#![forbid(unsafe_code)]

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use answergrid::api::{self, BatchRequest};
use answergrid::reference::NoReferenceData;

/// Run a batch of analyst questions across companies and print the grid.
#[derive(Parser)]
#[command(name = "answergrid", version, about = "Answer grid batch runner")]
struct Cli {
    /// Request JSON file; "-" reads from stdin.
    #[arg(long, default_value = "-")]
    input: PathBuf,

    /// Pretty-print the response JSON.
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let raw = if cli.input.to_str() == Some("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(&cli.input)?
    };

    let request: BatchRequest = serde_json::from_str(&raw)?;
    let response = api::run_request(request, Arc::new(NoReferenceData)).await;

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{rendered}");

    if response.is_error() {
        std::process::exit(1);
    }
    Ok(())
}
