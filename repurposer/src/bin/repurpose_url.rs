use anyhow::Result;
use clap::Parser;
use common::Config;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use repurposer::processing::{create_llm_provider, Repurposer};
use repurposer::scraping::{ArticleExtractor, ContentExtractor, PageFetcher};

/// Run the pipeline once for a URL and print the result as JSON.
#[derive(Parser, Debug)]
#[command(name = "repurpose-url")]
struct Args {
    /// Article URL
    url: String,

    /// Path to config.toml (layered over config.default.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only print the extracted article text; no model call
    #[arg(long)]
    extract_only: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenv::dotenv();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::INFO)
        .init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load_layered(Path::new("."), args.config.as_deref())
        .await?
        .apply_env()?;

    if args.extract_only {
        let extractor = ContentExtractor::new(
            PageFetcher::new(&config.fetch)?,
            ArticleExtractor::new(&config.extraction),
        );
        let text = extractor.extract(&args.url).await?;
        println!("{}", text);
        return Ok(());
    }

    let provider = create_llm_provider(&config)?;
    let content = Repurposer::from_config(&config, provider)?
        .repurpose(&args.url)
        .await?;

    println!("{}", serde_json::to_string_pretty(&content)?);
    Ok(())
}
