//! Accumulating, de-duplicating collection of the viewed profile's posts.
//!
//! A [`PostCollector`] survives across scans: each scan adds whatever new
//! qualifying posts the current document shows, so scrolling the feed grows
//! the collection monotonically until [`PostCollector::reset`].

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use ema_core::{CollectionSnapshot, CollectorSettings, PostRecord};
use tokio::time::Instant;
use url::Url;

use crate::dom::{owner_handle, selector};
use crate::error::ScraperError;
use crate::page::{Page, PageSnapshot};
use crate::post::{extract_post, permalink_hint, Extracted};

/// Elements that may hold a post.
const POST_CANDIDATES: &str =
    r#"article[data-testid="tweet"], [data-testid="cellInnerDiv"] article"#;

/// Posts collected so far, keyed by id, plus every permalink already taken.
#[derive(Debug, Default)]
pub struct CollectionState {
    posts: HashMap<String, PostRecord>,
    seen_urls: HashSet<String>,
}

impl CollectionState {
    #[must_use]
    pub fn has_seen(&self, permalink: &str) -> bool {
        self.seen_urls.contains(permalink)
    }

    #[must_use]
    pub fn contains_id(&self, id: &str) -> bool {
        self.posts.contains_key(id)
    }

    /// Adds `post` unless its id is already collected. The first record for
    /// an id is never replaced.
    pub fn insert(&mut self, post: PostRecord) {
        self.seen_urls.insert(post.permalink_url.clone());
        self.posts.entry(post.id.clone()).or_insert(post);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Sorted, materialized view of the collection.
    #[must_use]
    pub fn to_snapshot(&self, extracted_at: DateTime<Utc>) -> CollectionSnapshot {
        CollectionSnapshot::from_posts(self.posts.values().cloned().collect(), extracted_at)
    }
}

pub struct PostCollector {
    state: CollectionState,
    running: bool,
    last_scan: Option<Instant>,
    cooldown: Duration,
    cached: Option<CollectionSnapshot>,
}

impl PostCollector {
    #[must_use]
    pub fn new(cooldown: Duration) -> Self {
        Self {
            state: CollectionState::default(),
            running: false,
            last_scan: None,
            cooldown,
            cached: None,
        }
    }

    #[must_use]
    pub fn from_settings(settings: &CollectorSettings) -> Self {
        Self::new(settings.scan_cooldown())
    }

    /// Wraps the collector for sharing between the refresh loop and the
    /// command bridge.
    #[must_use]
    pub fn shared(self) -> SharedCollector {
        Arc::new(Mutex::new(self))
    }

    /// Scans the current document of `page` for new posts by the profile
    /// whose URL it shows.
    ///
    /// Within the cool-down of the previous scan's start (or while a scan is
    /// running) the last snapshot is returned without reading the page.
    /// Faults never escape: they come back as [`CollectionSnapshot::failed`].
    pub fn scan<P: Page + ?Sized>(&mut self, page: &P) -> CollectionSnapshot {
        if self.is_throttled() {
            tracing::debug!(
                running = self.running,
                cooldown = ?self.cooldown,
                "scan throttled, returning previous snapshot"
            );
            return self.snapshot();
        }

        let mut scan = RunningScan::begin(self);
        let result = page.snapshot().and_then(|document| scan.collect(&document));
        drop(scan);

        match result {
            Ok(snapshot) => {
                self.cached = Some(snapshot.clone());
                snapshot
            }
            Err(e) => {
                tracing::warn!(error = %e, "scan failed");
                CollectionSnapshot::failed(e.to_string(), Utc::now())
            }
        }
    }

    fn is_throttled(&self) -> bool {
        self.running
            || self
                .last_scan
                .is_some_and(|started| started.elapsed() < self.cooldown)
    }

    fn collect(&mut self, document: &PageSnapshot) -> Result<CollectionSnapshot, ScraperError> {
        let invalid = || ScraperError::InvalidProfileUrl {
            url: document.url.clone(),
        };
        let owner = owner_handle(&document.url).ok_or_else(invalid)?;
        let base = Url::parse(&document.url).map_err(|_| invalid())?;

        let extracted_at = Utc::now();
        let html = document.parse();
        let candidates = selector(POST_CANDIDATES);

        let mut examined = 0usize;
        let mut added = 0usize;
        for element in html.select(&candidates) {
            examined += 1;
            match extract_post(element, &owner, &base, &self.state, extracted_at) {
                Ok(Extracted::Post(post)) => {
                    self.state.insert(post);
                    added += 1;
                }
                Ok(Extracted::Skipped(reason)) => {
                    tracing::debug!(
                        %reason,
                        permalink = %permalink_hint(element),
                        "post element skipped"
                    );
                }
                Err(e) => {
                    tracing::warn!(error = %e, "skipping malformed post element");
                }
            }
        }

        let snapshot = self.state.to_snapshot(extracted_at);
        if added > 0 {
            tracing::info!(
                owner = %owner,
                examined,
                added,
                total = snapshot.total_found,
                "scan complete"
            );
        } else {
            tracing::debug!(owner = %owner, examined, "scan found no new posts");
        }
        Ok(snapshot)
    }

    /// The most recent successful snapshot, or the current collection if no
    /// scan has completed since the last reset.
    #[must_use]
    pub fn snapshot(&self) -> CollectionSnapshot {
        self.cached
            .clone()
            .unwrap_or_else(|| self.state.to_snapshot(Utc::now()))
    }

    /// Forgets every collected post and the scan throttle.
    pub fn reset(&mut self) {
        self.state = CollectionState::default();
        self.running = false;
        self.last_scan = None;
        self.cached = None;
        tracing::debug!("collector reset");
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.state.len()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Default for PostCollector {
    fn default() -> Self {
        Self::from_settings(&CollectorSettings::default())
    }
}

/// Marks a collector as scanning for as long as it lives. The flag is cleared
/// on drop, including during unwinding.
struct RunningScan<'a> {
    collector: &'a mut PostCollector,
}

impl<'a> RunningScan<'a> {
    fn begin(collector: &'a mut PostCollector) -> Self {
        collector.running = true;
        collector.last_scan = Some(Instant::now());
        Self { collector }
    }
}

impl std::ops::Deref for RunningScan<'_> {
    type Target = PostCollector;

    fn deref(&self) -> &PostCollector {
        self.collector
    }
}

impl std::ops::DerefMut for RunningScan<'_> {
    fn deref_mut(&mut self) -> &mut PostCollector {
        self.collector
    }
}

impl Drop for RunningScan<'_> {
    fn drop(&mut self) {
        self.collector.running = false;
    }
}

pub type SharedCollector = Arc<Mutex<PostCollector>>;

/// Locks a shared collector. A panic inside a previous scan does not leave
/// the collection unusable.
pub fn lock(collector: &SharedCollector) -> MutexGuard<'_, PostCollector> {
    collector.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[path = "collector_test.rs"]
mod tests;
