use std::path::PathBuf;
use clap::Parser;
use anyhow::Result;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use enrichment_cache::CacheConfig;
use enrichment_cache_cli::{execute, open_cache, resolve_store_path, Commands};

#[derive(Parser)]
#[command(name = "enrichment-cache")]
#[command(about = "Inspect and maintain the movie metadata enrichment cache", long_about = None)]
struct Cli {
    /// Cache store file (defaults to ENRICHMENT_CACHE_PATH, then ./data/enrichment-cache.json)
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Key namespace (defaults to ENRICHMENT_CACHE_NAMESPACE, then tmdb_cache)
    #[arg(short, long)]
    namespace: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "enrichment_cache=info,enrichment_cache_cli=info".into())
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = CacheConfig::from_env()?;
    if let Some(namespace) = cli.namespace {
        let configured = config.clone();
        config.namespace = namespace;
        config.validate()?;

        if config.namespace != configured.namespace && config.overlaps(&configured) {
            warn!(
                "Namespace {:?} overlaps {:?}; commands will also touch its entries",
                config.namespace, configured.namespace
            );
        }
    }

    let path = resolve_store_path(cli.store, &config);
    let cache = open_cache(&path, config)?;

    println!("{}", execute(&cache, &cli.command)?);
    Ok(())
}
