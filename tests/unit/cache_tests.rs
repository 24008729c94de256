/// Unit tests for the cache backends
///
/// Every backend must honour the same contract:
/// - a stored body is returned until its duration runs out
/// - a duration of zero or less leaves nothing retrievable
/// - a later put replaces an earlier one
use std::sync::Arc;
use std::thread;

use tempfile::TempDir;

use eveapi::{Cache, DiskCache, MemoryCache, NullCache, TieredCache};

fn backends(temp_dir: &TempDir) -> Vec<(&'static str, Arc<dyn Cache>)> {
    vec![
        ("memory", Arc::new(MemoryCache::new(100))),
        ("disk", Arc::new(DiskCache::new(temp_dir.path().join("disk")))),
        (
            "tiered",
            Arc::new(TieredCache::new(
                MemoryCache::new(100),
                DiskCache::new(temp_dir.path().join("tiered")),
            )),
        ),
    ]
}

#[test]
fn test_put_then_get() {
    let temp_dir = TempDir::new().unwrap();
    for (name, cache) in backends(&temp_dir) {
        cache.put("key", "<eveapi/>", 3600).unwrap();
        assert_eq!(
            cache.get("key").unwrap().as_deref(),
            Some("<eveapi/>"),
            "{} backend",
            name
        );
        assert_eq!(cache.get("other").unwrap(), None, "{} backend", name);
    }
}

#[test]
fn test_non_positive_duration_is_absent() {
    let temp_dir = TempDir::new().unwrap();
    for (name, cache) in backends(&temp_dir) {
        cache.put("zero", "body", 0).unwrap();
        cache.put("negative", "body", -100).unwrap();
        assert_eq!(cache.get("zero").unwrap(), None, "{} backend", name);
        assert_eq!(cache.get("negative").unwrap(), None, "{} backend", name);
    }
}

#[test]
fn test_non_positive_duration_drops_existing_entry() {
    let temp_dir = TempDir::new().unwrap();
    for (name, cache) in backends(&temp_dir) {
        cache.put("key", "fresh", 3600).unwrap();
        cache.put("key", "stale", 0).unwrap();
        assert_eq!(cache.get("key").unwrap(), None, "{} backend", name);
    }
}

#[test]
fn test_put_replaces() {
    let temp_dir = TempDir::new().unwrap();
    for (name, cache) in backends(&temp_dir) {
        cache.put("key", "first", 3600).unwrap();
        cache.put("key", "second", 3600).unwrap();
        assert_eq!(
            cache.get("key").unwrap().as_deref(),
            Some("second"),
            "{} backend",
            name
        );
    }
}

#[test]
fn test_disk_cache_survives_new_instance() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("persist");

    DiskCache::new(dir.clone()).put("key", "body", 3600).unwrap();

    let reopened = DiskCache::new(dir);
    assert_eq!(reopened.get("key").unwrap().as_deref(), Some("body"));
    assert!(reopened.contains("key").unwrap());
}

#[test]
fn test_tiered_cache_promotes_disk_hits() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("tiered");

    // Written through a different instance, so only the disk tier has it
    DiskCache::new(dir.clone()).put("key", "body", 3600).unwrap();

    let tiered = TieredCache::new(MemoryCache::new(10), DiskCache::new(dir));
    assert!(!tiered.memory().contains("key"));
    assert_eq!(tiered.get("key").unwrap().as_deref(), Some("body"));
    assert!(tiered.memory().contains("key"));
}

#[test]
fn test_null_cache_never_stores() {
    let cache = NullCache;
    cache.put("key", "body", 3600).unwrap();
    assert_eq!(cache.get("key").unwrap(), None);
}

#[test]
fn test_concurrent_access_to_one_key() {
    let cache: Arc<dyn Cache> = Arc::new(MemoryCache::new(100));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for _ in 0..50 {
                    cache.put("shared", &format!("writer-{}", i), 3600).unwrap();
                    let seen = cache.get("shared").unwrap();
                    assert!(seen.is_some_and(|body| body.starts_with("writer-")));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(cache.get("shared").unwrap().is_some());
}
