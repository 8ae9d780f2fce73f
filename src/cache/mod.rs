//! Query cache for content reads
//!
//! This module keeps the last result of every content query in memory, keyed
//! by operation and parameters. It provides stale-while-fetch reads: a page
//! that asks for a key gets the cached value straight away while a refresh
//! runs in the background, and concurrent requests for a key share a single
//! in-flight fetch.
//!
//! Entries are never evicted; the cache lives as long as the process. One
//! cache is built at startup and handed to the pages, so tests can build
//! their own.

use chrono::{DateTime, Utc};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

/// Identity of a query: operation name plus parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    operation: &'static str,
    params: Vec<String>,
}

impl QueryKey {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            params: Vec::new(),
        }
    }

    /// Append a parameter to the key
    pub fn param(mut self, value: impl Into<String>) -> Self {
        self.params.push(value.into());
        self
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            write!(f, "{}", self.operation)
        } else {
            write!(f, "{}({})", self.operation, self.params.join(", "))
        }
    }
}

/// What a consumer sees for a query
#[derive(Debug)]
pub enum QueryState<T> {
    /// No value yet and no failed attempt
    Pending,
    /// The last attempt failed and nothing is cached
    Error(Arc<str>),
    /// A cached value, possibly being refreshed
    Populated(Snapshot<T>),
}

/// A cached value
#[derive(Debug)]
pub struct Snapshot<T> {
    pub value: Arc<T>,
    pub fetched_at: DateTime<Utc>,
    /// A background refresh was running when the snapshot was taken
    pub refreshing: bool,
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            fetched_at: self.fetched_at,
            refreshing: self.refreshing,
        }
    }
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Pending => Self::Pending,
            Self::Error(message) => Self::Error(Arc::clone(message)),
            Self::Populated(snapshot) => Self::Populated(snapshot.clone()),
        }
    }
}

impl<T> QueryState<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Populated(snapshot) => Some(&snapshot.value),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_populated(&self) -> bool {
        matches!(self, Self::Populated(_))
    }
}

type Erased = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
struct Entry {
    value: Option<(Erased, DateTime<Utc>)>,
    error: Option<Arc<str>>,
    /// Signalled once the running fetch has written its result
    in_flight: Option<watch::Receiver<()>>,
}

impl Entry {
    fn state<T: Send + Sync + 'static>(&self, key: &QueryKey) -> QueryState<T> {
        match &self.value {
            Some((erased, fetched_at)) => match Arc::clone(erased).downcast::<T>() {
                Ok(value) => QueryState::Populated(Snapshot {
                    value,
                    fetched_at: *fetched_at,
                    refreshing: self.in_flight.is_some(),
                }),
                Err(_) => {
                    tracing::warn!(key = %key, "Cached value has an unexpected type");
                    QueryState::Pending
                }
            },
            None => match &self.error {
                Some(message) => QueryState::Error(Arc::clone(message)),
                None => QueryState::Pending,
            },
        }
    }
}

/// Key-addressed, process-lifetime cache of query results
#[derive(Clone, Default)]
pub struct QueryCache {
    entries: Arc<Mutex<HashMap<QueryKey, Entry>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a consumer for `key` without waiting.
    ///
    /// Returns the current state immediately. Starts `fetch` unless a fetch
    /// for the key is already running, in which case the running one is
    /// shared. A cached value is returned as-is while the refresh runs.
    pub fn observe<T, F, Fut, E>(&self, key: &QueryKey, fetch: F) -> QueryState<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        self.mount(key, fetch).0
    }

    /// Mount a consumer for `key`, waiting up to `wait` for a first result.
    ///
    /// A cached value is returned without waiting. When nothing is cached the
    /// call waits for the in-flight fetch; if `wait` elapses first the fetch
    /// keeps running in the background and `Pending` is returned.
    pub async fn query<T, F, Fut, E>(&self, key: &QueryKey, fetch: F, wait: Duration) -> QueryState<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let (state, in_flight) = self.mount(key, fetch);
        if state.is_populated() {
            return state;
        }

        if let Some(mut done) = in_flight {
            if tokio::time::timeout(wait, done.changed()).await.is_err() {
                tracing::debug!(key = %key, "No result within {:?}", wait);
            }
        }
        self.peek(key)
    }

    /// Current state for `key`, without starting a fetch
    pub fn peek<T: Send + Sync + 'static>(&self, key: &QueryKey) -> QueryState<T> {
        match self.lock().get(key) {
            Some(entry) => entry.state(key),
            None => QueryState::Pending,
        }
    }

    /// All keys seen so far, sorted
    pub fn keys(&self) -> Vec<QueryKey> {
        let mut keys: Vec<_> = self.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn mount<T, F, Fut, E>(
        &self,
        key: &QueryKey,
        fetch: F,
    ) -> (QueryState<T>, Option<watch::Receiver<()>>)
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let mut entries = self.lock();
        let entry = entries.entry(key.clone()).or_default();

        if entry.in_flight.is_none() {
            let (done_tx, done_rx) = watch::channel(());
            entry.in_flight = Some(done_rx);
            self.spawn_fetch(key.clone(), fetch(), done_tx);
        }

        (entry.state(key), entry.in_flight.clone())
    }

    fn spawn_fetch<T, Fut, E>(&self, key: QueryKey, fetch: Fut, done: watch::Sender<()>)
    where
        T: Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let entries = Arc::clone(&self.entries);
        tracing::debug!(key = %key, "Fetching");

        tokio::spawn(async move {
            let result = fetch.await;
            {
                let mut entries = lock(&entries);
                let entry = entries.entry(key.clone()).or_default();
                // Last completed fetch wins
                match result {
                    Ok(value) => {
                        entry.value = Some((Arc::new(value) as Erased, Utc::now()));
                        entry.error = None;
                        tracing::debug!(key = %key, "Query updated");
                    }
                    Err(e) => {
                        tracing::warn!(key = %key, error = %e, "Query failed");
                        entry.error = Some(Arc::from(e.to_string()));
                    }
                }
                entry.in_flight = None;
            }
            let _ = done.send(());
        });
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        lock(&self.entries)
    }
}

fn lock(entries: &Mutex<HashMap<QueryKey, Entry>>) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    const WAIT: Duration = Duration::from_secs(5);

    fn counted<T: Send + 'static>(
        calls: &Arc<AtomicUsize>,
        gate: &Arc<Notify>,
        value: T,
    ) -> impl FnOnce() -> std::pin::Pin<Box<dyn Future<Output = Result<T, Infallible>> + Send>>
    {
        let calls = Arc::clone(calls);
        let gate = Arc::clone(gate);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                gate.notified().await;
                Ok(value)
            })
        }
    }

    async fn settle(cache: &QueryCache, key: &QueryKey) {
        for _ in 0..100 {
            let done = cache.lock().get(key).map_or(true, |e| e.in_flight.is_none());
            if done {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("fetch for {} never settled", key);
    }

    #[test]
    fn test_key_display() {
        assert_eq!(QueryKey::new("posts").to_string(), "posts");
        assert_eq!(
            QueryKey::new("post").param("hello-world").to_string(),
            "post(hello-world)"
        );
        assert_ne!(QueryKey::new("post").param("a"), QueryKey::new("post").param("b"));
    }

    #[tokio::test]
    async fn test_concurrent_subscribers_share_one_fetch() {
        let cache = QueryCache::new();
        let key = QueryKey::new("posts");
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());

        let first: QueryState<Vec<u32>> = cache.observe(&key, counted(&calls, &gate, vec![1]));
        let second: QueryState<Vec<u32>> = cache.observe(&key, counted(&calls, &gate, vec![2]));
        assert!(first.is_pending());
        assert!(second.is_pending());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        gate.notify_one();
        settle(&cache, &key).await;

        let state: QueryState<Vec<u32>> = cache.peek(&key);
        assert_eq!(state.value(), Some(&vec![1]));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_queries_wait_on_the_same_fetch() {
        let cache = QueryCache::new();
        let key = QueryKey::new("categories");
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());

        let a = cache.query(&key, counted(&calls, &gate, "shared"), WAIT);
        let b = cache.query(&key, counted(&calls, &gate, "duplicate"), WAIT);
        let release = async {
            tokio::task::yield_now().await;
            gate.notify_one();
        };
        let (a, b, ()) = tokio::join!(a, b, release);

        assert_eq!(a.value(), Some(&"shared"));
        assert_eq!(b.value(), Some(&"shared"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_remount_returns_stale_value_while_refreshing() {
        let cache = QueryCache::new();
        let key = QueryKey::new("posts");
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());

        gate.notify_one();
        let initial = cache
            .query(&key, counted(&calls, &gate, "v1".to_string()), WAIT)
            .await;
        assert_eq!(initial.value().map(String::as_str), Some("v1"));

        // Second mount: the old value comes back synchronously
        let remount: QueryState<String> =
            cache.observe(&key, counted(&calls, &gate, "v2".to_string()));
        match &remount {
            QueryState::Populated(snapshot) => {
                assert_eq!(snapshot.value.as_str(), "v1");
                assert!(snapshot.refreshing);
            }
            other => panic!("expected cached value, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        gate.notify_one();
        settle(&cache, &key).await;
        let refreshed: QueryState<String> = cache.peek(&key);
        assert_eq!(refreshed.value().map(String::as_str), Some("v2"));
    }

    #[tokio::test]
    async fn test_failed_first_fetch_is_an_error() {
        let cache = QueryCache::new();
        let key = QueryKey::new("posts");

        let state: QueryState<Vec<u32>> = cache
            .query(&key, || async { Err::<Vec<u32>, _>("backend down") }, WAIT)
            .await;
        match state {
            QueryState::Error(message) => assert_eq!(&*message, "backend down"),
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_cached_value() {
        let cache = QueryCache::new();
        let key = QueryKey::new("posts");

        cache
            .query(&key, || async { Ok::<_, Infallible>(7u32) }, WAIT)
            .await;
        let state: QueryState<u32> = cache
            .observe(&key, || async { Err::<u32, _>("backend down") });
        assert_eq!(state.value(), Some(&7));

        settle(&cache, &key).await;
        let state: QueryState<u32> = cache.peek(&key);
        assert_eq!(state.value(), Some(&7));
    }

    #[tokio::test]
    async fn test_wait_elapses_without_cancelling_fetch() {
        let cache = QueryCache::new();
        let key = QueryKey::new("post").param("slow");
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());

        let state = cache
            .query(
                &key,
                counted(&calls, &gate, 1u8),
                Duration::from_millis(10),
            )
            .await;
        assert!(state.is_pending());

        // The fetch is still running and is shared with the next mount
        let again: QueryState<u8> = cache.observe(&key, counted(&calls, &gate, 2u8));
        assert!(again.is_pending());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        gate.notify_one();
        settle(&cache, &key).await;
        let state: QueryState<u8> = cache.peek(&key);
        assert_eq!(state.value(), Some(&1));
    }

    #[tokio::test]
    async fn test_keys_are_listed_sorted() {
        let cache = QueryCache::new();
        assert!(cache.is_empty());

        for key in [
            QueryKey::new("posts"),
            QueryKey::new("categories"),
            QueryKey::new("post").param("a"),
        ] {
            cache
                .query(&key, || async { Ok::<_, Infallible>(()) }, WAIT)
                .await;
        }

        let keys: Vec<String> = cache.keys().iter().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["categories", "post(a)", "posts"]);
        assert_eq!(cache.len(), 3);
    }
}
