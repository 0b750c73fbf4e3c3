//! Bounded memoization for live upstream results.
//!
//! Entries live until evicted (least recently used first) unless the policy
//! sets a TTL. Failed computations are never stored, and concurrent misses for
//! the same key share a single computation.

use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use moka::policy::EvictionPolicy;
use tracing::debug;

pub const DEFAULT_MAX_ENTRIES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub max_entries: usize,
    /// `None` keeps entries for the lifetime of the process.
    pub ttl: Option<Duration>,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self { max_entries: DEFAULT_MAX_ENTRIES, ttl: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Current,
    Forecast,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: QueryKind,
    pub city: String,
    pub days: Option<u8>,
}

impl CacheKey {
    pub fn current(city: &str) -> Self {
        Self { kind: QueryKind::Current, city: city.to_string(), days: None }
    }

    pub fn forecast(city: &str, days: u8) -> Self {
        Self { kind: QueryKind::Forecast, city: city.to_string(), days: Some(days) }
    }
}

/// `None` when the policy allows no entries at all.
pub struct ResultCache<K, V> {
    policy: CachePolicy,
    inner: Option<Cache<K, V>>,
}

impl<K, V> Debug for ResultCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache").field("policy", &self.policy).finish_non_exhaustive()
    }
}

impl<K, V> Default for ResultCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(CachePolicy::default())
    }
}

impl<K, V> ResultCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(policy: CachePolicy) -> Self {
        let inner = (policy.max_entries > 0).then(|| {
            let builder = Cache::builder()
                .max_capacity(policy.max_entries as u64)
                .eviction_policy(EvictionPolicy::lru());
            match policy.ttl {
                Some(ttl) => builder.time_to_live(ttl).build(),
                None => builder.build(),
            }
        });

        Self { policy, inner }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Return the cached value for `key`, or run `compute` and cache its success.
    ///
    /// Callers racing on the same missing key all receive the outcome of one
    /// `compute`; an error is handed to each of them behind an `Arc`.
    pub async fn get_or_compute<F, Fut, E>(&self, key: K, compute: F) -> Result<V, Arc<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: Send + Sync + 'static,
    {
        let Some(inner) = &self.inner else {
            return compute().await.map_err(Arc::new);
        };

        let miss_key = key.clone();
        inner
            .try_get_with(key, async move {
                debug!(key = ?miss_key, "cache miss");
                compute().await
            })
            .await
    }

    /// Number of live entries, after pending evictions have been applied.
    pub async fn len(&self) -> u64 {
        match &self.inner {
            Some(inner) => {
                inner.run_pending_tasks().await;
                inner.entry_count()
            }
            None => 0,
        }
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cache(max_entries: usize) -> ResultCache<CacheKey, String> {
        ResultCache::new(CachePolicy { max_entries, ttl: None })
    }

    async fn fill(cache: &ResultCache<CacheKey, String>, key: CacheKey, value: &str) {
        let value = value.to_string();
        let _ = cache.get_or_compute(key, || async move { Ok::<_, ()>(value) }).await;
        // Apply the write so recency order is deterministic.
        cache.len().await;
    }

    async fn peek(cache: &ResultCache<CacheKey, String>, key: &CacheKey) -> Option<String> {
        cache.inner.as_ref()?.get(key).await
    }

    #[tokio::test]
    async fn hit_skips_compute() {
        let cache = cache(10);
        let calls = AtomicUsize::new(0);
        let calls = &calls;

        for _ in 0..3 {
            let value = cache
                .get_or_compute(CacheKey::current("London"), || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>("rainy".to_string())
                })
                .await
                .unwrap();
            assert_eq!(value, "rainy");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache = cache(10);
        let key = CacheKey::forecast("Paris", 3);

        let err = cache
            .get_or_compute(key.clone(), || async { Err::<String, _>("timeout") })
            .await
            .unwrap_err();
        assert_eq!(*err, "timeout");
        assert!(cache.is_empty().await);

        let value = cache
            .get_or_compute(key, || async { Ok::<_, &str>("cloudy".to_string()) })
            .await
            .unwrap();
        assert_eq!(value, "cloudy");
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn keys_differ_by_kind_and_days() {
        let cache = cache(10);
        fill(&cache, CacheKey::current("Tokyo"), "now").await;
        fill(&cache, CacheKey::forecast("Tokyo", 3), "three").await;
        fill(&cache, CacheKey::forecast("Tokyo", 5), "five").await;

        assert_eq!(cache.len().await, 3);
        assert_eq!(peek(&cache, &CacheKey::forecast("Tokyo", 3)).await.as_deref(), Some("three"));
    }

    #[tokio::test]
    async fn evicts_least_recently_used() {
        let cache = cache(2);
        fill(&cache, CacheKey::current("A"), "a").await;
        fill(&cache, CacheKey::current("B"), "b").await;

        // Touch A so B becomes the eviction candidate.
        assert!(peek(&cache, &CacheKey::current("A")).await.is_some());
        cache.len().await;
        fill(&cache, CacheKey::current("C"), "c").await;

        assert_eq!(cache.len().await, 2);
        assert!(peek(&cache, &CacheKey::current("A")).await.is_some());
        assert!(peek(&cache, &CacheKey::current("B")).await.is_none());
        assert!(peek(&cache, &CacheKey::current("C")).await.is_some());
    }

    #[tokio::test]
    async fn default_policy_bounds_at_one_hundred() {
        let cache: ResultCache<CacheKey, String> = ResultCache::default();
        for i in 0..150 {
            fill(&cache, CacheKey::current(&format!("city-{i}")), "x").await;
        }
        assert_eq!(cache.len().await, DEFAULT_MAX_ENTRIES as u64);
        assert!(peek(&cache, &CacheKey::current("city-0")).await.is_none());
        assert!(peek(&cache, &CacheKey::current("city-149")).await.is_some());
    }

    async fn count_lookup(cache: &ResultCache<CacheKey, usize>, calls: &AtomicUsize) -> usize {
        cache
            .get_or_compute(CacheKey::current("Dubai"), || async move {
                Ok::<_, ()>(calls.fetch_add(1, Ordering::SeqCst))
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn expired_entries_are_recomputed() {
        let cache: ResultCache<CacheKey, usize> = ResultCache::new(CachePolicy {
            max_entries: 10,
            ttl: Some(Duration::from_millis(50)),
        });
        let calls = AtomicUsize::new(0);

        assert_eq!(count_lookup(&cache, &calls).await, 0);
        assert_eq!(count_lookup(&cache, &calls).await, 0);
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(count_lookup(&cache, &calls).await, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn zero_capacity_disables_storage() {
        let cache = cache(0);
        let calls = AtomicUsize::new(0);
        let calls = &calls;

        for _ in 0..2 {
            cache
                .get_or_compute(CacheKey::current("Berlin"), || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>("x".to_string())
                })
                .await
                .unwrap();
        }

        assert!(cache.is_empty().await);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_misses_share_one_computation() {
        let cache = Arc::new(cache(10));
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    cache
                        .get_or_compute(CacheKey::current("Mumbai"), || async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(50)).await;
                            Ok::<_, ()>("humid".to_string())
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), "humid");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_failure_reaches_every_waiter() {
        let cache = Arc::new(cache(10));
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    cache
                        .get_or_compute(CacheKey::forecast("Cairo", 2), || async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(50)).await;
                            Err::<String, _>("upstream down")
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(*task.await.unwrap().unwrap_err(), "upstream down");
        }
        assert!(calls.load(Ordering::SeqCst) >= 1);
        assert!(cache.is_empty().await);
    }
}
