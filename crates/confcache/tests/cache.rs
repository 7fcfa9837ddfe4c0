// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for the two-tier cache coordinator.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;

use confcache::{Cache, ErrorKind, MemoryStorage, StorageMedium};
use confcache_tier::testing::{MockStorage, StorageOp};
use futures::executor::block_on;
use tick::{Clock, ClockControl};

const HOT_TTL: Duration = Duration::from_secs(60);

fn two_tier(clock: Clock) -> (Cache<String>, MockStorage) {
    let storage = MockStorage::new();
    let cache = Cache::builder::<String>(clock)
        .storage(StorageMedium::Custom(Arc::new(storage.clone())))
        .build()
        .expect("custom storage always opens");
    (cache, storage)
}

fn reads(storage: &MockStorage) -> usize {
    storage.count_operations(|op| matches!(op, StorageOp::GetItem(_)))
}

/// Pends once before completing, so a joined future gets a turn.
struct YieldOnce(bool);

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

#[test]
fn set_then_get_hits_hot_tier() {
    block_on(async {
        let (cache, storage) = two_tier(Clock::new_frozen());

        cache.set("config:brandA:web:color", "blue".to_string()).await;
        storage.clear_operations();

        assert_eq!(cache.get("config:brandA:web:color").await.as_deref(), Some("blue"));
        assert_eq!(reads(&storage), 0);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.size, 1);
    });
}

#[test]
fn set_writes_both_tiers() {
    block_on(async {
        let (cache, storage) = two_tier(Clock::new_frozen());

        cache.set("k", "v".to_string()).await;

        assert!(cache.has("k"));
        assert!(storage.contains_key("confcache:k"));
    });
}

#[test]
fn warm_hit_is_promoted_and_read_once() {
    block_on(async {
        let control = ClockControl::new();
        let (cache, storage) = two_tier(control.to_clock());

        cache.set("k", "v".to_string()).await;
        control.advance(HOT_TTL);
        assert!(!cache.has("k"));
        storage.clear_operations();

        assert_eq!(cache.get("k").await.as_deref(), Some("v"));
        assert!(cache.has("k"));
        assert_eq!(cache.get("k").await.as_deref(), Some("v"));

        assert_eq!(reads(&storage), 1);

        // The expired hot read counted as a miss, the promoted read as a hit.
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    });
}

#[test]
fn promotion_uses_hot_ttl() {
    block_on(async {
        let control = ClockControl::new();
        let storage = MemoryStorage::new();
        let cache = Cache::builder::<String>(control.to_clock())
            .ttl(Duration::from_secs(10))
            .storage(StorageMedium::Custom(Arc::new(storage)))
            .build()
            .expect("builds");

        cache.set("k", "v".to_string()).await;
        control.advance(Duration::from_secs(10));
        assert_eq!(cache.get("k").await.as_deref(), Some("v"));

        control.advance(Duration::from_millis(9_999));
        assert!(cache.has("k"));
        control.advance(Duration::from_millis(1));
        assert!(!cache.has("k"));
    });
}

#[test]
fn miss_in_both_tiers() {
    block_on(async {
        let (cache, storage) = two_tier(Clock::new_frozen());

        assert_eq!(cache.get("absent").await, None);
        assert_eq!(reads(&storage), 1);
        assert_eq!(cache.stats().misses, 1);
    });
}

#[test]
fn fresh_cache_reads_through_shared_medium() {
    block_on(async {
        let clock = Clock::new_frozen();
        let medium = Arc::new(MemoryStorage::new());

        let writer = Cache::builder::<Vec<u32>>(clock.clone())
            .storage(StorageMedium::Custom(medium.clone()))
            .build()
            .expect("builds");
        writer.set("numbers", vec![1, 2, 3]).await;

        let reader = Cache::builder::<Vec<u32>>(clock)
            .storage(StorageMedium::Custom(medium))
            .build()
            .expect("builds");
        assert!(!reader.has("numbers"));
        assert_eq!(reader.get("numbers").await, Some(vec![1, 2, 3]));
        assert!(reader.has("numbers"));
    });
}

#[test]
fn differently_typed_cache_does_not_destroy_shared_entries() {
    block_on(async {
        let clock = Clock::new_frozen();
        let medium = Arc::new(MemoryStorage::new());

        let strings = Cache::builder::<String>(clock.clone())
            .storage(StorageMedium::Custom(medium.clone()))
            .build()
            .expect("builds");
        strings.set("k", "v".to_string()).await;

        let numbers = Cache::builder::<u32>(clock.clone())
            .storage(StorageMedium::Custom(medium.clone()))
            .build()
            .expect("builds");
        assert_eq!(numbers.get("k").await, None);

        let fresh = Cache::builder::<String>(clock)
            .storage(StorageMedium::Custom(medium))
            .build()
            .expect("builds");
        assert_eq!(fresh.get("k").await.as_deref(), Some("v"));
    });
}

#[test]
fn set_with_ttl_applies_to_both_tiers() {
    block_on(async {
        let control = ClockControl::new();
        let (cache, storage) = two_tier(control.to_clock());

        cache.set_with_ttl("short", "v".to_string(), Duration::from_secs(10)).await;
        control.advance(Duration::from_millis(9_999));
        assert_eq!(cache.get("short").await.as_deref(), Some("v"));

        control.advance(Duration::from_millis(1));
        assert_eq!(cache.get("short").await, None);
        assert!(!storage.contains_key("confcache:short"));
    });
}

#[test]
fn delete_removes_from_both_tiers() {
    block_on(async {
        let (cache, storage) = two_tier(Clock::new_frozen());

        cache.set("k", "v".to_string()).await;
        cache.delete("k").await;

        assert!(!cache.has("k"));
        assert!(!storage.contains_key("confcache:k"));
        assert_eq!(cache.get("k").await, None);

        // Deleting a missing key is harmless.
        cache.delete("k").await;
    });
}

#[test]
fn clear_is_idempotent_and_resets_counters() {
    block_on(async {
        let (cache, storage) = two_tier(Clock::new_frozen());
        storage.seed("other-app:k", "untouched");

        cache.set("a", "1".to_string()).await;
        cache.set("b", "2".to_string()).await;
        let _ = cache.get("a").await;
        let _ = cache.get("missing").await;

        cache.clear().await;
        cache.clear().await;

        let stats = cache.stats();
        assert_eq!(stats.size, 0);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert!(!storage.contains_key("confcache:a"));
        assert!(!storage.contains_key("confcache:b"));
        assert_eq!(storage.raw("other-app:k").as_deref(), Some("untouched"));
    });
}

#[test]
fn invalidate_without_pattern_clears() {
    block_on(async {
        let (cache, storage) = two_tier(Clock::new_frozen());

        cache.set("a", "1".to_string()).await;
        cache.invalidate(None).await.expect("no pattern to compile");

        assert_eq!(cache.stats().size, 0);
        assert_eq!(storage.entry_count(), 0);
    });
}

#[test]
fn invalidate_pattern_spans_both_tiers() {
    block_on(async {
        let (cache, storage) = two_tier(Clock::new_frozen());

        cache.set("config:brandA:web:color", "blue".to_string()).await;
        cache.set("config:brandA:ios:color", "red".to_string()).await;
        cache.set("config:brandB:web:color", "green".to_string()).await;

        cache.invalidate(Some("^config:brandA:")).await.expect("valid pattern");

        assert!(!cache.has("config:brandA:web:color"));
        assert!(!cache.has("config:brandA:ios:color"));
        assert!(cache.has("config:brandB:web:color"));
        assert!(!storage.contains_key("confcache:config:brandA:web:color"));
        assert!(!storage.contains_key("confcache:config:brandA:ios:color"));
        assert!(storage.contains_key("confcache:config:brandB:web:color"));

        // Nothing invalidated in the warm tier comes back through promotion.
        assert_eq!(cache.get("config:brandA:web:color").await, None);
    });
}

#[test]
fn invalidate_matching_reports_removed_counts() {
    block_on(async {
        let (cache, _storage) = two_tier(Clock::new_frozen());

        cache.set("user:1", "a".to_string()).await;
        cache.set("user:2", "b".to_string()).await;
        cache.set("team:1", "c".to_string()).await;

        let pattern = confcache::KeyPattern::new("^user:").expect("valid pattern");
        assert_eq!(cache.invalidate_matching(&pattern).await, (2, 2));
    });
}

#[test]
fn invalid_pattern_touches_nothing() {
    block_on(async {
        let (cache, storage) = two_tier(Clock::new_frozen());

        cache.set("config:brandA:web:color", "blue".to_string()).await;
        storage.clear_operations();

        let error = cache.invalidate(Some("[")).await.expect_err("unterminated class");
        assert_eq!(error.kind(), ErrorKind::InvalidPattern);

        assert!(cache.has("config:brandA:web:color"));
        assert!(storage.operations().is_empty());
    });
}

#[test]
fn has_does_not_count_or_read_warm_tier() {
    block_on(async {
        let (cache, storage) = two_tier(Clock::new_frozen());

        cache.set("k", "v".to_string()).await;
        storage.clear_operations();

        assert!(cache.has("k"));
        assert!(!cache.has("missing"));

        assert_eq!(reads(&storage), 0);
        assert_eq!(cache.stats().hits, 0);
        assert_eq!(cache.stats().misses, 0);
    });
}

#[test]
fn hit_rate_reflects_lookups() {
    block_on(async {
        let cache = Cache::builder::<u32>(Clock::new_frozen()).build().expect("builds");

        cache.set("k", 1).await;
        for _ in 0..3 {
            assert_eq!(cache.get("k").await, Some(1));
        }
        assert_eq!(cache.get("missing").await, None);

        let stats = cache.stats();
        assert_eq!(stats.hits, 3);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate - 0.75).abs() < f64::EPSILON);
    });
}

#[test]
fn hot_capacity_holds_after_promotions() {
    block_on(async {
        let control = ClockControl::new();
        let medium = Arc::new(MemoryStorage::new());
        let cache = Cache::builder::<u32>(control.to_clock())
            .max_size(2)
            .storage(StorageMedium::Custom(medium))
            .build()
            .expect("builds");

        for i in 0..5 {
            cache.set(&format!("k{i}"), i).await;
            assert!(cache.stats().size <= 2);
        }

        // Every key is still served, from the warm tier when the hot tier evicted it.
        for i in 0..5 {
            assert_eq!(cache.get(&format!("k{i}")).await, Some(i));
            assert!(cache.stats().size <= 2);
        }
    });
}

#[test]
fn zero_capacity_stores_nothing_hot() {
    block_on(async {
        let cache = Cache::builder::<u32>(Clock::new_frozen()).max_size(0).build().expect("builds");

        cache.set("k", 1).await;

        assert_eq!(cache.stats().size, 0);
        assert_eq!(cache.get("k").await, None);
    });
}

#[test]
fn disabled_cache_bypasses_everything() {
    block_on(async {
        let storage = MockStorage::new();
        let cache = Cache::builder::<String>(Clock::new_frozen())
            .enabled(false)
            .storage(StorageMedium::Custom(Arc::new(storage.clone())))
            .build()
            .expect("builds");

        cache.set("k", "v".to_string()).await;
        assert_eq!(cache.get("k").await, None);
        assert!(!cache.has("k"));
        cache.delete("k").await;
        cache.clear().await;
        cache.invalidate(Some("[")).await.expect("disabled caches do not compile patterns");

        let stats = cache.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.size, 0);
        assert!(stats.hit_rate.abs() < f64::EPSILON);
        assert!(!cache.has_warm_tier());
        assert!(storage.operations().is_empty());
    });
}

#[test]
fn disabled_prefetch_always_fetches() {
    block_on(async {
        let cache = Cache::builder::<u32>(Clock::new_frozen()).enabled(false).build().expect("builds");
        let calls = AtomicUsize::new(0);
        let calls = &calls;

        for _ in 0..2 {
            let value = cache
                .prefetch("k", move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, std::io::Error>(7)
                })
                .await
                .expect("fetch succeeds");
            assert_eq!(value, 7);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.stats().size, 0);
    });
}

#[test]
fn warm_write_failure_is_invisible() {
    block_on(async {
        let (cache, storage) = two_tier(Clock::new_frozen());
        storage.fail_when(|op| matches!(op, StorageOp::SetItem { .. }));

        cache.set("k", "v".to_string()).await;

        assert_eq!(cache.get("k").await.as_deref(), Some("v"));
        assert!(!storage.contains_key("confcache:k"));
    });
}

#[test]
fn warm_read_failure_is_a_miss() {
    block_on(async {
        let control = ClockControl::new();
        let (cache, storage) = two_tier(control.to_clock());

        cache.set("k", "v".to_string()).await;
        control.advance(HOT_TTL);
        storage.fail_when(|op| matches!(op, StorageOp::GetItem(_)));

        assert_eq!(cache.get("k").await, None);

        storage.clear_failures();
        assert_eq!(cache.get("k").await.as_deref(), Some("v"));
    });
}

#[test]
fn warm_enumeration_failure_still_clears_hot_tier() {
    block_on(async {
        let (cache, storage) = two_tier(Clock::new_frozen());
        cache.set("k", "v".to_string()).await;
        storage.fail_when(|op| matches!(op, StorageOp::Keys));

        cache.clear().await;
        cache.invalidate(Some("^k$")).await.expect("valid pattern");

        assert!(!cache.has("k"));
    });
}

#[test]
fn prefetch_miss_fetches_once_then_serves_cache() {
    block_on(async {
        let (cache, storage) = two_tier(Clock::new_frozen());
        let calls = AtomicUsize::new(0);
        let calls = &calls;
        let fetch = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, std::io::Error>("fetched".to_string())
        };

        assert_eq!(cache.prefetch("k", fetch).await.expect("fetch succeeds"), "fetched");
        assert_eq!(cache.prefetch("k", fetch).await.expect("cached"), "fetched");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(storage.contains_key("confcache:k"));
    });
}

#[test]
fn prefetch_error_propagates_and_caches_nothing() {
    block_on(async {
        let (cache, storage) = two_tier(Clock::new_frozen());

        let error = cache
            .prefetch("k", || async { Err::<String, _>("service unavailable") })
            .await
            .expect_err("fetcher fails");

        assert_eq!(error, "service unavailable");
        assert!(!cache.has("k"));
        assert!(!storage.contains_key("confcache:k"));
    });
}

#[test]
fn concurrent_prefetch_is_not_coalesced() {
    block_on(async {
        let cache = Cache::builder::<u32>(Clock::new_frozen()).build().expect("builds");
        let calls = AtomicUsize::new(0);
        let calls = &calls;
        let fetch = move |value: u32| {
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                YieldOnce(false).await;
                Ok::<_, std::io::Error>(value)
            }
        };

        let (first, second) = futures::future::join(cache.prefetch("k", fetch(1)), cache.prefetch("k", fetch(2))).await;

        assert_eq!(first.expect("first fetch"), 1);
        assert_eq!(second.expect("second fetch"), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        // Last write wins.
        assert_eq!(cache.get("k").await, Some(2));
    });
}
