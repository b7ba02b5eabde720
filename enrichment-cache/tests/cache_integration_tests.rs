//! Integration tests for the enrichment cache
//!
//! These tests exercise the cache facade end to end over real storage media:
//! - Hit/miss accounting and statistics
//! - Expiration and self-healing reads
//! - Key normalization across differently written titles
//! - Recovery from storage failures and full media
//! - Persistence across process restarts

use enrichment_cache::storage::utf16_len;
use enrichment_cache::{
    CacheConfig, CacheError, CacheStats, Clock, EnrichmentCache, EntryCodec, FileStorage,
    ManualClock, MemoryStorage, Result, StorageBackend, SystemClock,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);
const T0: i64 = 1_700_000_000_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Rating {
    rating: f64,
}

fn cache_on(storage: Arc<dyn StorageBackend>) -> (EnrichmentCache, ManualClock) {
    let clock = ManualClock::new(T0);
    let cache = EnrichmentCache::with_clock(CacheConfig::default(), storage, Arc::new(clock.clone()));
    (cache, clock)
}

/// Memory storage whose operations can be made to fail on demand
#[derive(Default)]
struct FlakyStorage {
    inner: MemoryStorage,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_keys: AtomicBool,
}

impl StorageBackend for FlakyStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(CacheError::Storage("read failed".to_string()));
        }
        self.inner.read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CacheError::Storage("write failed".to_string()));
        }
        self.inner.write(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        if self.fail_keys.load(Ordering::SeqCst) {
            return Err(CacheError::Storage("enumeration failed".to_string()));
        }
        self.inner.keys()
    }
}

/// Memory storage that counts single and batched removals
#[derive(Default)]
struct CountingStorage {
    inner: MemoryStorage,
    single_removes: AtomicUsize,
    batch_removes: AtomicUsize,
}

impl StorageBackend for CountingStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        self.inner.read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.inner.write(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.single_removes.fetch_add(1, Ordering::SeqCst);
        self.inner.remove(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.inner.keys()
    }

    fn remove_many(&self, keys: &[String]) -> Result<usize> {
        self.batch_removes.fetch_add(1, Ordering::SeqCst);
        self.inner.remove_many(keys)
    }
}

#[test]
fn test_dunkirk_round_trip() {
    let (cache, _) = cache_on(Arc::new(MemoryStorage::new()));

    cache.set(
        "Dunkirk",
        &Rating { rating: 7.8 },
        Some(2017),
        Some("Christopher Nolan"),
    );
    let value: Option<Rating> = cache.get("Dunkirk", Some(2017), Some("Christopher Nolan"));

    assert_eq!(value, Some(Rating { rating: 7.8 }));
    assert_eq!(cache.stats().hits, 1);
}

#[test]
fn test_unknown_movie_on_empty_cache() {
    let (cache, _) = cache_on(Arc::new(MemoryStorage::new()));

    let value: Option<Rating> = cache.get("Unknown Movie", None, None);
    assert!(value.is_none());

    let stats = cache.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.hit_rate, 0);
}

#[test]
fn test_clear_after_activity() {
    let (cache, _) = cache_on(Arc::new(MemoryStorage::new()));

    cache.set("Fury", &Rating { rating: 7.5 }, Some(2014), Some("David Ayer"));
    cache.set("Midway", &Rating { rating: 6.7 }, Some(2019), None);
    let _: Option<Rating> = cache.get("Fury", Some(2014), Some("David Ayer"));
    let _: Option<Rating> = cache.get("Fury", Some(2014), Some("David Ayer"));
    let _: Option<Rating> = cache.get("Greyhound", Some(2020), None);

    let before = cache.stats();
    assert_eq!((before.hits, before.misses, before.hit_rate), (2, 1, 67));

    cache.clear();
    assert_eq!(
        cache.stats(),
        CacheStats {
            hits: 0,
            misses: 0,
            size: 0,
            hit_rate: 0
        }
    );
}

#[test]
fn test_differently_written_titles_share_an_entry() {
    let (cache, _) = cache_on(Arc::new(MemoryStorage::new()));

    assert_eq!(
        cache.key_for("The Pianist", Some(2002), Some("Roman Polanski")),
        cache.key_for("the   PIANIST!!", Some(2002), Some("Roman Polanski"))
    );

    cache.set("The Pianist", &Rating { rating: 8.4 }, Some(2002), Some("Roman Polanski"));
    let value: Option<Rating> = cache.get("the   PIANIST!!", Some(2002), Some("Roman Polanski"));
    assert_eq!(value, Some(Rating { rating: 8.4 }));
    assert_eq!(cache.stats().size, 1);
}

#[test]
fn test_year_and_director_distinguish_entries() {
    let (cache, _) = cache_on(Arc::new(MemoryStorage::new()));

    cache.set("Midway", &Rating { rating: 6.8 }, Some(1976), None);
    cache.set("Midway", &Rating { rating: 6.7 }, Some(2019), None);
    cache.set("Midway", &Rating { rating: 6.6 }, Some(2019), Some("Roland Emmerich"));

    assert_eq!(cache.stats().size, 3);
    assert_eq!(
        cache.get::<Rating>("Midway", Some(1976), None),
        Some(Rating { rating: 6.8 })
    );
    assert_eq!(cache.get::<Rating>("Midway", None, None), None);
}

#[test]
fn test_expiration_boundary() {
    let (cache, clock) = cache_on(Arc::new(MemoryStorage::new()));

    cache.set("Fury", &Rating { rating: 7.5 }, None, None);
    clock.advance(DAY - Duration::from_millis(1));
    assert!(cache.get::<Rating>("Fury", None, None).is_some());

    clock.advance(Duration::from_millis(2));
    assert!(cache.get::<Rating>("Fury", None, None).is_none());
}

#[test]
fn test_self_healing_read_shrinks_size() {
    let (cache, clock) = cache_on(Arc::new(MemoryStorage::new()));

    cache.set("Fury", &Rating { rating: 7.5 }, Some(2014), None);
    cache.set("Greyhound", &Rating { rating: 7.0 }, Some(2020), None);
    assert_eq!(cache.stats().size, 2);

    clock.advance(DAY + Duration::from_millis(1));
    assert!(cache.get::<Rating>("Fury", Some(2014), None).is_none());

    // Only the entry that was read is removed; the other waits for cleanup
    assert_eq!(cache.stats().size, 1);
    assert_eq!(cache.cleanup(), 1);
    assert_eq!(cache.stats().size, 0);
}

#[test]
fn test_expired_entry_never_becomes_valid_again() {
    let (cache, clock) = cache_on(Arc::new(MemoryStorage::new()));

    cache.set("Fury", &Rating { rating: 7.5 }, None, None);
    clock.advance(DAY * 2);
    assert!(cache.get::<Rating>("Fury", None, None).is_none());

    clock.rewind(DAY * 2);
    assert!(cache.get::<Rating>("Fury", None, None).is_none());
}

#[test]
fn test_clock_skew_keeps_entries_valid() {
    let (cache, clock) = cache_on(Arc::new(MemoryStorage::new()));

    cache.set("Fury", &Rating { rating: 7.5 }, None, None);
    clock.rewind(Duration::from_secs(3600));

    assert!(cache.get::<Rating>("Fury", None, None).is_some());
    assert_eq!(cache.cleanup(), 0);
}

#[test]
fn test_written_at_comes_from_wall_clock() {
    let storage = Arc::new(MemoryStorage::new());
    let cache = EnrichmentCache::new(CacheConfig::default(), storage.clone());

    let before = SystemClock.now_millis();
    cache.set("Dunkirk", &Rating { rating: 7.8 }, Some(2017), None);
    let after = SystemClock.now_millis();

    let key = cache.key_for("Dunkirk", Some(2017), None);
    let raw = storage.read(&key).unwrap().unwrap();
    let entry = EntryCodec::decode::<Rating>(&raw).unwrap();

    assert_eq!(entry.payload, Rating { rating: 7.8 });
    assert!(entry.written_at >= before && entry.written_at <= after);
}

#[test]
fn test_initialize_sweeps_leftovers() {
    let storage = Arc::new(MemoryStorage::new());
    let prefix = CacheConfig::default().key_prefix();
    let two_days_ago = T0 - 2 * DAY.as_millis() as i64;

    let stale = EntryCodec::encode(&1u8, two_days_ago).unwrap();
    let fresh = EntryCodec::encode(&1u8, T0).unwrap();
    storage.write(&format!("{}stale_unknown_unknown", prefix), &stale).unwrap();
    storage.write(&format!("{}garbage_unknown_unknown", prefix), "not json at all").unwrap();
    storage.write(&format!("{}fresh_unknown_unknown", prefix), &fresh).unwrap();
    storage.write("unrelated", "not json either").unwrap();

    let (cache, _) = cache_on(storage.clone());
    assert_eq!(cache.initialize(), 2);
    assert_eq!(cache.stats().size, 1);
    assert_eq!(storage.read("unrelated").unwrap().as_deref(), Some("not json either"));
}

#[test]
fn test_full_medium_triggers_cleanup_without_surfacing_error() {
    let payload = Rating { rating: 1.0 };
    let key = CacheConfig::default().key_prefix() + "a_unknown_unknown";
    let value = EntryCodec::encode(&payload, T0).unwrap();
    let footprint = (utf16_len(&key) + utf16_len(&value)) * 2;

    let storage = Arc::new(MemoryStorage::with_quota(footprint + footprint / 2));
    let (cache, clock) = cache_on(storage.clone());

    cache.set("A", &payload, None, None);
    assert_eq!(cache.stats().size, 1);

    clock.advance(DAY + Duration::from_secs(3600));

    // Medium is full: the write fails, cleanup frees the expired entry, no retry
    cache.set("B", &payload, None, None);
    assert_eq!(cache.stats().size, 0);
    assert!(cache.get::<Rating>("B", None, None).is_none());

    // The next write fits
    cache.set("B", &payload, None, None);
    assert_eq!(cache.get::<Rating>("B", None, None), Some(payload));
}

#[test]
fn test_storage_failures_degrade_to_misses() {
    let storage = Arc::new(FlakyStorage::default());
    let (cache, _) = cache_on(storage.clone());

    cache.set("Fury", &Rating { rating: 7.5 }, None, None);

    storage.fail_reads.store(true, Ordering::SeqCst);
    assert!(cache.get::<Rating>("Fury", None, None).is_none());
    assert_eq!(cache.stats().misses, 1);
    assert_eq!(cache.size_in_bytes(), 0);
    storage.fail_reads.store(false, Ordering::SeqCst);

    // The entry survived the failed read
    assert!(cache.get::<Rating>("Fury", None, None).is_some());

    storage.fail_keys.store(true, Ordering::SeqCst);
    assert_eq!(cache.stats().size, 0);
    assert_eq!(cache.cleanup(), 0);
    assert_eq!(cache.size_in_bytes(), 0);
    assert_eq!(cache.clear(), 0);
    assert_eq!(cache.stats().hits, 0);
    storage.fail_keys.store(false, Ordering::SeqCst);

    storage.fail_writes.store(true, Ordering::SeqCst);
    cache.set("Greyhound", &Rating { rating: 7.0 }, None, None);
    assert!(cache.get::<Rating>("Greyhound", None, None).is_none());
}

#[test]
fn test_caches_share_a_medium_last_write_wins() {
    let storage: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::new());
    let (first, _) = cache_on(storage.clone());
    let (second, _) = cache_on(storage.clone());

    first.set("Fury", &Rating { rating: 7.0 }, None, None);
    second.set("Fury", &Rating { rating: 7.5 }, None, None);

    assert_eq!(first.get::<Rating>("Fury", None, None), Some(Rating { rating: 7.5 }));
    assert_eq!(first.stats().hits, 1);
    assert_eq!(second.stats().hits, 0);
    assert_eq!(second.stats().size, 1);
}

#[test]
fn test_namespaces_are_isolated() {
    let storage: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::new());
    let movies = EnrichmentCache::new(CacheConfig::default(), storage.clone());
    let posters = EnrichmentCache::new(
        CacheConfig::builder().namespace("poster_cache").build(),
        storage.clone(),
    );

    movies.set("Fury", &Rating { rating: 7.5 }, None, None);
    posters.set("Fury", &"https://example.org/fury.jpg".to_string(), None, None);

    assert_eq!(movies.stats().size, 1);
    assert_eq!(posters.clear(), 1);
    assert_eq!(movies.get::<Rating>("Fury", None, None), Some(Rating { rating: 7.5 }));
}

#[test]
fn test_namespaces_sharing_leading_characters_are_isolated() {
    let storage: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::new());
    let short = CacheConfig::builder().namespace("tmdb").build();
    let longer = CacheConfig::builder().namespace("tmdb2").build();
    assert!(!short.overlaps(&longer));

    let movies = EnrichmentCache::new(longer, storage.clone());
    let other = EnrichmentCache::new(short, storage.clone());

    movies.set("Fury", &Rating { rating: 7.5 }, Some(2014), None);

    assert_eq!(other.stats().size, 0);
    assert_eq!(other.cleanup(), 0);
    assert_eq!(other.clear(), 0);
    assert_eq!(
        movies.get::<Rating>("Fury", Some(2014), None),
        Some(Rating { rating: 7.5 })
    );
}

#[test]
fn test_overlapping_namespaces_claim_each_others_keys() {
    let storage: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::new());
    let movies_config = CacheConfig::default();
    let other_config = CacheConfig::builder().namespace("tmdb").build();

    // Sharing a medium between these two is a configuration error
    assert!(other_config.overlaps(&movies_config));

    let movies = EnrichmentCache::new(movies_config, storage.clone());
    let other = EnrichmentCache::new(other_config, storage.clone());
    movies.set("Fury", &Rating { rating: 7.5 }, None, None);

    // A title can legitimately produce the other cache's key
    assert_eq!(
        other.key_for("cache_fury", None, None),
        movies.key_for("Fury", None, None)
    );
    assert_eq!(other.stats().size, 1);
}

#[test]
fn test_size_in_bytes_counts_utf16_units() {
    let storage = Arc::new(MemoryStorage::new());
    let (cache, _) = cache_on(storage.clone());

    cache.set("Amélie", &"🎬".to_string(), None, None);

    let key = cache.key_for("Amélie", None, None);
    let raw = storage.read(&key).unwrap().unwrap();
    assert_eq!(cache.size_in_bytes(), (utf16_len(&key) + utf16_len(&raw)) * 2);
    assert!(cache.size_in_bytes() > (key.chars().count() + raw.chars().count()) * 2);
}

#[test]
fn test_cleanup_and_clear_remove_in_one_batch() {
    let storage = Arc::new(CountingStorage::default());
    let (cache, clock) = cache_on(storage.clone());

    for title in ["Fury", "Greyhound", "Dunkirk", "Midway", "Patton"] {
        cache.set(title, &Rating { rating: 7.0 }, None, None);
    }
    clock.advance(DAY * 2);
    cache.set("Hacksaw Ridge", &Rating { rating: 8.1 }, None, None);

    assert_eq!(cache.cleanup(), 5);
    assert_eq!(storage.batch_removes.load(Ordering::SeqCst), 1);

    assert_eq!(cache.clear(), 1);
    assert_eq!(storage.batch_removes.load(Ordering::SeqCst), 2);
    assert_eq!(storage.single_removes.load(Ordering::SeqCst), 0);

    // Nothing stale left: no commit at all
    assert_eq!(cache.cleanup(), 0);
    assert_eq!(storage.batch_removes.load(Ordering::SeqCst), 2);
}

#[test]
fn test_reported_size_matches_quota_accounting() {
    let config = CacheConfig::builder().bytes_per_char(4).quota_bytes(Some(4096)).build();
    let storage = Arc::new(MemoryStorage::with_quota(4096).with_bytes_per_unit(config.bytes_per_char));
    let cache = EnrichmentCache::new(config, storage.clone());

    cache.set("Fury", &Rating { rating: 7.5 }, Some(2014), None);
    cache.set("Greyhound", &Rating { rating: 7.0 }, Some(2020), None);

    assert_eq!(cache.stats().size, 2);
    assert_eq!(cache.size_in_bytes(), storage.used_bytes().unwrap());
}

#[test]
fn test_file_storage_survives_restart() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("enrichment-cache.json");

    {
        let storage = FileStorage::open(&path, None).unwrap();
        let (cache, _) = cache_on(Arc::new(storage));
        cache.set("Dunkirk", &Rating { rating: 7.8 }, Some(2017), Some("Christopher Nolan"));
        cache.dispose();
    }

    let storage = FileStorage::open(&path, None).unwrap();
    let (cache, _) = cache_on(Arc::new(storage));
    assert_eq!(cache.initialize(), 0);
    assert_eq!(
        cache.get::<Rating>("Dunkirk", Some(2017), Some("Christopher Nolan")),
        Some(Rating { rating: 7.8 })
    );
}

#[test]
fn test_payload_shape_change_is_treated_as_corruption() {
    #[derive(Debug, Serialize, Deserialize)]
    struct Detailed {
        rating: f64,
        runtime: u32,
    }

    let (cache, _) = cache_on(Arc::new(MemoryStorage::new()));
    cache.set("Fury", &Rating { rating: 7.5 }, None, None);

    assert!(cache.get::<Detailed>("Fury", None, None).is_none());
    assert_eq!(cache.stats().size, 0);
}
