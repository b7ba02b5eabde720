//! Admin commands over an on-disk enrichment cache

use anyhow::{Context, Result};
use clap::Subcommand;
use enrichment_cache::{CacheConfig, EnrichmentCache, FileStorage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Store location used when neither `--store` nor `ENRICHMENT_CACHE_PATH` is given
pub const DEFAULT_STORE_PATH: &str = "./data/enrichment-cache.json";

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Show entry count, footprint and hit statistics
    Stats,

    /// Remove expired and unreadable entries
    Cleanup,

    /// Remove every entry in the namespace
    Clear,

    /// List the keys in the namespace
    Keys,

    /// Print the cached payload for a lookup
    Get {
        /// Movie title
        title: String,

        /// Release year
        #[arg(short, long)]
        year: Option<u32>,

        /// Director
        #[arg(short, long)]
        director: Option<String>,
    },

    /// Cache a JSON payload for a lookup
    Set {
        /// Movie title
        title: String,

        /// Payload as JSON
        json: String,

        /// Release year
        #[arg(short, long)]
        year: Option<u32>,

        /// Director
        #[arg(short, long)]
        director: Option<String>,
    },
}

/// Pick the store path: explicit flag, then configuration, then the default
pub fn resolve_store_path(flag: Option<PathBuf>, config: &CacheConfig) -> PathBuf {
    flag.or_else(|| config.store_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH))
}

/// Open the cache on the file store at `path`
pub fn open_cache(path: &Path, config: CacheConfig) -> Result<EnrichmentCache> {
    let storage = FileStorage::open(path, config.quota_bytes)
        .with_context(|| format!("Failed to open cache store: {:?}", path))?
        .with_bytes_per_unit(config.bytes_per_char);
    info!("Using cache store {:?} (namespace: {})", path, config.namespace);
    Ok(EnrichmentCache::new(config, Arc::new(storage)))
}

/// Run one command and return what should be printed
pub fn execute(cache: &EnrichmentCache, command: &Commands) -> Result<String> {
    let output = match command {
        Commands::Stats => {
            let stats = cache.stats();
            let bytes = cache.size_in_bytes();
            let kb = (bytes as f64 / 1024.0).round() as u64;

            let mut out = String::new();
            out.push_str(&format!("Namespace: {}\n", cache.config().namespace));
            out.push_str(&format!("Entries:   {}\n", stats.size));
            out.push_str(&format!("Size:      {} bytes ({}KB)\n", bytes, kb));
            out.push_str(&format!("Hits:      {}\n", stats.hits));
            out.push_str(&format!("Misses:    {}\n", stats.misses));
            out.push_str(&format!("Hit rate:  {}%", stats.hit_rate));
            out
        }

        Commands::Cleanup => {
            let removed = cache.cleanup();
            format!("Removed {} expired cache entries", removed)
        }

        Commands::Clear => {
            let removed = cache.clear();
            format!("Cleared {} cache entries", removed)
        }

        Commands::Keys => {
            let keys = cache.namespace_keys().context("Failed to list cache keys")?;
            if keys.is_empty() {
                "No cached entries".to_string()
            } else {
                keys.join("\n")
            }
        }

        Commands::Get {
            title,
            year,
            director,
        } => match cache.get::<serde_json::Value>(title, *year, director.as_deref()) {
            Some(payload) => serde_json::to_string_pretty(&payload)?,
            None => "miss".to_string(),
        },

        Commands::Set {
            title,
            json,
            year,
            director,
        } => {
            let payload: serde_json::Value =
                serde_json::from_str(json).context("Payload is not valid JSON")?;
            let key = cache.key_for(title, *year, director.as_deref());

            cache.set(title, &payload, *year, director.as_deref());

            // The cache swallows write failures; read back to see what landed
            let stored = cache.peek::<serde_json::Value>(title, *year, director.as_deref());
            if stored.as_ref() == Some(&payload) {
                info!("Cached {}", key);
                format!("Cached {}", key)
            } else {
                warn!("Write for {} did not reach the store", key);
                format!("Not cached (write failed) {}", key)
            }
        }
    };

    Ok(output)
}
