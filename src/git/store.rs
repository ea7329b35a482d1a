//! Per-file blame cache.
//!
//! Each file identifier maps to one shared computation: the first request
//! inserts it before anything is awaited, and every later request (while it is
//! still pending or after it finished) awaits the same computation and gets
//! the same `Arc<BlameResult>`.
//! - Failures are cached too; callers retry by invalidating the file
//! - Invalidation removes the entry only. A computation already handed out
//!   keeps running for whoever is awaiting it
//!
//! Used by: host document events (see `events.rs`) and range queries from the
//! editor's visible area.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use crate::error::{BlameError, Result};
use crate::git::parser::parse_blame;
use crate::git::source::BlameSource;
use crate::models::{BlameResult, Range, ShaBlame};

type SharedBlame = Shared<BoxFuture<'static, Result<Arc<BlameResult>>>>;

/// Memoizing blame store with an injected text source.
pub struct BlameStore<S> {
    source: Arc<S>,
    /// file identifier -> pending or finished computation
    entries: Mutex<HashMap<String, SharedBlame>>,
}

impl<S: BlameSource + 'static> BlameStore<S> {
    pub fn new(source: S) -> Self {
        Self::with_shared_source(Arc::new(source))
    }

    pub fn with_shared_source(source: Arc<S>) -> Self {
        Self {
            source,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Full blame for a file, computed at most once until invalidated.
    pub async fn blame_file(&self, file: &str) -> Result<Arc<BlameResult>> {
        let computation = {
            let mut entries = self.lock_entries();
            match entries.get(file) {
                Some(existing) => {
                    tracing::debug!("Blame cache hit: {}", file);
                    existing.clone()
                }
                None => {
                    tracing::debug!("Blame cache miss: {}", file);
                    let computation = self.new_computation(file.to_string());
                    entries.insert(file.to_string(), computation.clone());
                    computation
                }
            }
        };

        computation.await
    }

    /// Blame restricted to the lines of `range`, with only the commits they reference.
    pub async fn blame_for_range(&self, file: &str, range: &Range) -> Result<BlameResult> {
        let blame = self.blame_file(file).await?;
        Ok(blame.for_range(range))
    }

    /// Lines of `range` attributed to `hash`, plus that commit if known.
    pub async fn blame_for_sha_range(
        &self,
        file: &str,
        hash: &str,
        range: &Range,
    ) -> Result<ShaBlame> {
        let blame = self.blame_file(file).await?;
        Ok(blame.for_sha_range(hash, range))
    }

    /// Drop the cached entry for a file. No-op if absent.
    pub fn invalidate(&self, file: &str) {
        if self.lock_entries().remove(file).is_some() {
            tracing::debug!("Blame cache invalidated: {}", file);
        }
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        let mut entries = self.lock_entries();
        tracing::debug!("Blame cache cleared: {} entries", entries.len());
        entries.clear();
    }

    pub fn is_cached(&self, file: &str) -> bool {
        self.lock_entries().contains_key(file)
    }

    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }

    /// Build the (not yet started) computation for `file`.
    fn new_computation(&self, file: String) -> SharedBlame {
        let source = Arc::clone(&self.source);

        async move {
            let start = Instant::now();
            let text = source.raw_blame(&file).await.map_err(|e| {
                tracing::warn!("Blame source failed for {}: {:#}", file, e);
                BlameError::from_source(&file, &e)
            })?;

            let result = parse_blame(&text);
            tracing::info!(
                "Blame parsed for {}: {} lines, {} commits in {:?}",
                file,
                result.lines.len(),
                result.commits.len(),
                start.elapsed()
            );
            Ok(Arc::new(result))
        }
        .boxed()
        .shared()
    }

    // Poisoning is ignored.
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, SharedBlame>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    const SAMPLE: &str = "\
aaaaaaaa src/lib.rs 1 (Ann Lee 2020-01-02 03:04:05 +0000 1) a
aaaaaaaa src/lib.rs 2 (Ann Lee 2020-01-02 03:04:05 +0000 2) b
bbbbbbbb src/lib.rs 3 (Bo Chen 2021-05-06 07:08:09 +0200 3) c
bbbbbbbb src/lib.rs 4 (Bo Chen 2021-05-06 07:08:09 +0200 4) d
cccccccc src/old.rs 9 (Cy Diaz 2022-10-11 12:13:14 -0500 5) e
cccccccc src/old.rs 10 (Cy Diaz 2022-10-11 12:13:14 -0500 6) f
bbbbbbbb src/lib.rs 7 (Bo Chen 2021-05-06 07:08:09 +0200 7) g
aaaaaaaa src/lib.rs 8 (Ann Lee 2020-01-02 03:04:05 +0000 8) h
cccccccc src/old.rs 11 (Cy Diaz 2022-10-11 12:13:14 -0500 9) i
cccccccc src/old.rs 12 (Cy Diaz 2022-10-11 12:13:14 -0500 10) j
";

    struct CountingSource {
        text: &'static str,
        fail: bool,
        calls: AtomicUsize,
    }

    impl CountingSource {
        fn ok(text: &'static str) -> Arc<Self> {
            Arc::new(Self {
                text,
                fail: false,
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                text: "",
                fail: true,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BlameSource for CountingSource {
        async fn raw_blame(&self, _file: &str) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if self.fail {
                anyhow::bail!("git blame exited with status 128");
            }
            Ok(self.text.to_string())
        }
    }

    /// First call blocks until released; later calls return immediately.
    struct GatedSource {
        calls: AtomicUsize,
        gate: Notify,
    }

    #[async_trait]
    impl BlameSource for GatedSource {
        async fn raw_blame(&self, _file: &str) -> anyhow::Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call == 0 {
                self.gate.notified().await;
                Ok("aaaaaaaa a.rs 1 (Ann Lee 2020-01-02 03:04:05 +0000 1) old".to_string())
            } else {
                Ok("bbbbbbbb a.rs 1 (Bo Chen 2021-05-06 07:08:09 +0200 1) new".to_string())
            }
        }
    }

    #[tokio::test]
    async fn test_blame_file_memoized() {
        let source = CountingSource::ok(SAMPLE);
        let store = BlameStore::with_shared_source(source.clone());

        let first = store.blame_file("src/lib.rs").await.unwrap();
        let second = store.blame_file("src/lib.rs").await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.calls(), 1);
        assert_eq!(first.lines.len(), 10);
        assert_eq!(first.commits.len(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_computation() {
        let source = CountingSource::ok(SAMPLE);
        let store = BlameStore::with_shared_source(source.clone());

        let (a, b) = tokio::join!(store.blame_file("src/lib.rs"), store.blame_file("src/lib.rs"));

        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_files_cached_separately() {
        let source = CountingSource::ok(SAMPLE);
        let store = BlameStore::with_shared_source(source.clone());

        store.blame_file("one.rs").await.unwrap();
        store.blame_file("two.rs").await.unwrap();

        assert_eq!(source.calls(), 2);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_recompute() {
        let source = CountingSource::ok(SAMPLE);
        let store = BlameStore::with_shared_source(source.clone());

        let first = store.blame_file("src/lib.rs").await.unwrap();
        store.invalidate("src/lib.rs");
        assert!(!store.is_cached("src/lib.rs"));

        let second = store.blame_file("src/lib.rs").await.unwrap();
        assert_eq!(source.calls(), 2);
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
    }

    #[tokio::test]
    async fn test_invalidate_unknown_is_noop() {
        let store = BlameStore::with_shared_source(CountingSource::ok(SAMPLE));
        store.invalidate("never-seen.rs");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_clear_drops_everything() {
        let source = CountingSource::ok(SAMPLE);
        let store = BlameStore::with_shared_source(source.clone());

        store.blame_file("one.rs").await.unwrap();
        store.blame_file("two.rs").await.unwrap();
        store.clear();

        assert!(store.is_empty());
        store.blame_file("one.rs").await.unwrap();
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn test_failure_shared_until_invalidated() {
        let source = CountingSource::failing();
        let store = BlameStore::with_shared_source(source.clone());

        let first = store.blame_file("src/lib.rs").await.unwrap_err();
        let second = store.blame_file("src/lib.rs").await.unwrap_err();

        assert_eq!(first, second);
        assert_eq!(source.calls(), 1);
        match first {
            BlameError::Source { file, message } => {
                assert_eq!(file, "src/lib.rs");
                assert!(message.contains("status 128"));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        store.invalidate("src/lib.rs");
        assert!(store.blame_file("src/lib.rs").await.is_err());
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_mid_flight_supersedes() {
        let source = Arc::new(GatedSource {
            calls: AtomicUsize::new(0),
            gate: Notify::new(),
        });
        let store = Arc::new(BlameStore::with_shared_source(source.clone()));

        let pending = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.blame_file("a.rs").await })
        };
        while source.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        store.invalidate("a.rs");
        let fresh = store.blame_file("a.rs").await.unwrap();
        assert!(fresh.commits.contains_key("bbbbbbbb"));

        source.gate.notify_one();
        let stale = pending.await.unwrap().unwrap();
        assert!(stale.commits.contains_key("aaaaaaaa"));

        // the superseding entry stays cached
        let again = store.blame_file("a.rs").await.unwrap();
        assert!(Arc::ptr_eq(&fresh, &again));
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_blame_for_range() {
        let store = BlameStore::with_shared_source(CountingSource::ok(SAMPLE));

        let result = store
            .blame_for_range("src/lib.rs", &Range::lines(2, 5))
            .await
            .unwrap();

        let rows: Vec<usize> = result.lines.iter().map(|l| l.current_line).collect();
        assert_eq!(rows, vec![2, 3, 4, 5]);
        let mut hashes: Vec<&str> = result.commits.keys().map(|h| h.as_str()).collect();
        hashes.sort();
        assert_eq!(hashes, vec!["bbbbbbbb", "cccccccc"]);
    }

    #[tokio::test]
    async fn test_blame_for_sha_range() {
        let store = BlameStore::with_shared_source(CountingSource::ok(SAMPLE));

        let view = store
            .blame_for_sha_range("src/lib.rs", "bbbbbbbb", &Range::lines(0, 9))
            .await
            .unwrap();

        let rows: Vec<usize> = view.lines.iter().map(|l| l.current_line).collect();
        assert_eq!(rows, vec![2, 3, 6]);
        let commit = view.commit.unwrap();
        assert_eq!(commit.author, "Bo Chen");
        assert_eq!(commit.file_name, "src/lib.rs");
    }

    #[tokio::test]
    async fn test_sha_range_unknown_hash() {
        let store = BlameStore::with_shared_source(CountingSource::ok(SAMPLE));

        let view = store
            .blame_for_sha_range("src/lib.rs", "ffffffff", &Range::lines(0, 9))
            .await
            .unwrap();
        assert!(view.commit.is_none());
        assert!(view.lines.is_empty());
    }

    #[tokio::test]
    async fn test_empty_file() {
        let store = BlameStore::with_shared_source(CountingSource::ok(""));

        let full = store.blame_file("empty.rs").await.unwrap();
        assert!(full.lines.is_empty());
        assert!(full.commits.is_empty());

        let ranged = store
            .blame_for_range("empty.rs", &Range::lines(3, 12))
            .await
            .unwrap();
        assert!(ranged.lines.is_empty());
        assert!(ranged.commits.is_empty());
    }
}
