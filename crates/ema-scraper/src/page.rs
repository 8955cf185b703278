//! The host page as seen by the extractor: a readable document plus a stream
//! of mutation batches.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use scraper::Html;
use tokio::sync::mpsc;

use crate::dom::{query, selector};
use crate::error::ScraperError;

/// The document at one instant: its address and serialized markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot {
    pub url: String,
    pub html: String,
}

impl PageSnapshot {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }

    #[must_use]
    pub fn parse(&self) -> Html {
        Html::parse_document(&self.html)
    }
}

/// Subtree a mutation watch is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserveTarget {
    /// `main[role="main"]`, the feed container.
    MainContent,
    /// The whole document body.
    Body,
}

impl std::fmt::Display for ObserveTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObserveTarget::MainContent => write!(f, "main[role=\"main\"]"),
            ObserveTarget::Body => write!(f, "body"),
        }
    }
}

/// One observed change: how many nodes were attached and detached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationRecord {
    pub added_nodes: usize,
    pub removed_nodes: usize,
}

/// Records delivered together in one observer callback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationBatch {
    pub records: Vec<MutationRecord>,
}

impl MutationBatch {
    /// A batch with a single record adding `count` nodes.
    #[must_use]
    pub fn added(count: usize) -> Self {
        Self {
            records: vec![MutationRecord {
                added_nodes: count,
                removed_nodes: 0,
            }],
        }
    }

    /// Whether any record in the batch attached at least one node.
    #[must_use]
    pub fn has_additions(&self) -> bool {
        self.records.iter().any(|r| r.added_nodes > 0)
    }
}

pub type MutationStream = mpsc::UnboundedReceiver<MutationBatch>;

/// A live document the extractor can read and watch.
///
/// Implementations are expected to stop delivering batches to a stream once
/// its receiver has been dropped; dropping the stream is how a watch is
/// disconnected.
pub trait Page: Send + Sync {
    /// Returns the current document.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::PageUnavailable`] when the document cannot be
    /// read.
    fn snapshot(&self) -> Result<PageSnapshot, ScraperError>;

    /// Starts a subtree watch on `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::TargetUnavailable`] if `target` does not exist
    /// in the current document.
    fn observe(&self, target: ObserveTarget) -> Result<MutationStream, ScraperError>;
}

/// In-memory [`Page`] whose document is replaced wholesale by the host.
///
/// Each [`MemoryPage::set_html`] emits one batch to every live watch, with
/// the growth in element count reported as added nodes.
pub struct MemoryPage {
    url: RwLock<String>,
    html: RwLock<String>,
    observers: Mutex<Vec<mpsc::UnboundedSender<MutationBatch>>>,
    reads: AtomicUsize,
}

impl MemoryPage {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: RwLock::new(url.into()),
            html: RwLock::new(html.into()),
            observers: Mutex::new(Vec::new()),
            reads: AtomicUsize::new(0),
        }
    }

    /// Replaces the document and notifies watchers.
    pub fn set_html(&self, html: impl Into<String>) {
        let html = html.into();
        let after = element_count(&html);
        let before = {
            let mut current = self.html.write().unwrap_or_else(PoisonError::into_inner);
            let before = element_count(&current);
            *current = html;
            before
        };
        self.emit(&MutationBatch {
            records: vec![MutationRecord {
                added_nodes: after.saturating_sub(before),
                removed_nodes: before.saturating_sub(after),
            }],
        });
    }

    /// Simulates navigation without touching the document.
    pub fn set_url(&self, url: impl Into<String>) {
        *self.url.write().unwrap_or_else(PoisonError::into_inner) = url.into();
    }

    /// Delivers `batch` to every live watch, pruning disconnected ones.
    pub fn emit(&self, batch: &MutationBatch) {
        let mut observers = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        observers.retain(|tx| tx.send(batch.clone()).is_ok());
    }

    /// Number of live watches.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        let mut observers = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        observers.retain(|tx| !tx.is_closed());
        observers.len()
    }

    /// How many times the document has been read through [`Page::snapshot`].
    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl Page for MemoryPage {
    fn snapshot(&self) -> Result<PageSnapshot, ScraperError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let url = self.url.read().unwrap_or_else(PoisonError::into_inner).clone();
        let html = self
            .html
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        Ok(PageSnapshot { url, html })
    }

    fn observe(&self, target: ObserveTarget) -> Result<MutationStream, ScraperError> {
        if target == ObserveTarget::MainContent {
            let html = self.html.read().unwrap_or_else(PoisonError::into_inner);
            let document = Html::parse_document(&html);
            if query(document.root_element(), r#"main[role="main"]"#).is_none() {
                return Err(ScraperError::TargetUnavailable {
                    target: target.to_string(),
                });
            }
        }
        let (tx, rx) = mpsc::unbounded_channel();
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        Ok(rx)
    }
}

fn element_count(html: &str) -> usize {
    let any = selector("*");
    Html::parse_document(html).select(&any).count()
}
