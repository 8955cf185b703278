//! Keeps the collection growing while the feed is scrolled.
//!
//! While observing, one background task owns the mutation stream and two
//! timers: a one-shot settle delay for the initial scan, and a debounce that
//! every batch adding nodes pushes back. The debounce is a single pinned
//! [`tokio::time::Sleep`] that is reset in place, so bursts coalesce into one
//! scan.

use std::sync::Arc;
use std::time::Duration;

use ema_core::CollectorSettings;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::bridge::{Notification, Notifier};
use crate::collector::{lock, SharedCollector};
use crate::page::{MutationBatch, MutationStream, ObserveTarget, Page};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Observing,
}

struct Watch {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
    observed: Option<ObserveTarget>,
}

pub struct RefreshController<P: Page + ?Sized + 'static> {
    page: Arc<P>,
    collector: SharedCollector,
    notifier: Arc<dyn Notifier>,
    settle_delay: Duration,
    debounce: Duration,
    watch: Option<Watch>,
}

impl<P: Page + ?Sized + 'static> RefreshController<P> {
    pub fn new(
        page: Arc<P>,
        collector: SharedCollector,
        notifier: Arc<dyn Notifier>,
        settings: &CollectorSettings,
    ) -> Self {
        Self {
            page,
            collector,
            notifier,
            settle_delay: settings.settle_delay(),
            debounce: settings.debounce(),
            watch: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> ControllerState {
        if self.watch.is_some() {
            ControllerState::Observing
        } else {
            ControllerState::Idle
        }
    }

    /// Subtree the current watch is attached to, if any.
    #[must_use]
    pub fn observed(&self) -> Option<ObserveTarget> {
        self.watch.as_ref().and_then(|w| w.observed)
    }

    /// Starts observing from a clean collection. A watch that is already
    /// running is stopped first.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn start(&mut self) {
        if self.watch.is_some() {
            self.stop().await;
        }
        lock(&self.collector).reset();

        let (stream, observed) = self.open_stream();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let worker = RefreshLoop {
            page: Arc::clone(&self.page),
            collector: Arc::clone(&self.collector),
            notifier: Arc::clone(&self.notifier),
            settle_at: Instant::now() + self.settle_delay,
            debounce: self.debounce,
            last_notified: 0,
        };
        let task = tokio::spawn(worker.run(stream, shutdown_rx));

        tracing::info!(
            observed = ?observed,
            settle = ?self.settle_delay,
            debounce = ?self.debounce,
            "refresh controller observing"
        );
        self.watch = Some(Watch {
            shutdown: shutdown_tx,
            task,
            observed,
        });
    }

    fn open_stream(&self) -> (Option<MutationStream>, Option<ObserveTarget>) {
        match self.page.observe(ObserveTarget::MainContent) {
            Ok(stream) => return (Some(stream), Some(ObserveTarget::MainContent)),
            Err(e) => tracing::debug!(error = %e, "falling back to observing the body"),
        }
        match self.page.observe(ObserveTarget::Body) {
            Ok(stream) => (Some(stream), Some(ObserveTarget::Body)),
            Err(e) => {
                tracing::warn!(error = %e, "no mutation watch available; initial scan only");
                (None, None)
            }
        }
    }

    /// Cancels the watch and any pending debounce. Does nothing when idle.
    pub async fn stop(&mut self) {
        let Some(watch) = self.watch.take() else {
            return;
        };
        // The task may already have exited on its own.
        let _ = watch.shutdown.send(());
        if let Err(e) = watch.task.await {
            tracing::warn!(error = %e, "refresh task ended abnormally");
        }
        tracing::info!("refresh controller stopped");
    }
}

impl<P: Page + ?Sized + 'static> Drop for RefreshController<P> {
    fn drop(&mut self) {
        if let Some(watch) = self.watch.take() {
            watch.task.abort();
        }
    }
}

struct RefreshLoop<P: Page + ?Sized> {
    page: Arc<P>,
    collector: SharedCollector,
    notifier: Arc<dyn Notifier>,
    settle_at: Instant,
    debounce: Duration,
    last_notified: usize,
}

impl<P: Page + ?Sized> RefreshLoop<P> {
    async fn run(mut self, mut stream: Option<MutationStream>, mut shutdown: oneshot::Receiver<()>) {
        let settle = tokio::time::sleep_until(self.settle_at);
        tokio::pin!(settle);
        let mut settle_pending = true;

        let debounce = tokio::time::sleep(self.debounce);
        tokio::pin!(debounce);
        let mut debounce_armed = false;

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => break,

                () = &mut settle, if settle_pending => {
                    settle_pending = false;
                    self.scan_and_notify();
                }

                () = &mut debounce, if debounce_armed => {
                    debounce_armed = false;
                    self.scan_and_notify();
                }

                batch = next_batch(&mut stream) => match batch {
                    Some(batch) if batch.has_additions() => {
                        debounce.as_mut().reset(Instant::now() + self.debounce);
                        debounce_armed = true;
                    }
                    Some(_) => {}
                    None => {
                        tracing::debug!("mutation stream closed");
                        stream = None;
                        if !settle_pending && !debounce_armed {
                            break;
                        }
                    }
                },
            }
        }
    }

    fn scan_and_notify(&mut self) {
        let count = {
            let mut collector = lock(&self.collector);
            let snapshot = collector.scan(self.page.as_ref());
            if let Some(error) = snapshot.error.as_deref() {
                tracing::debug!(error, "refresh scan produced no posts");
            }
            collector.count()
        };

        if count <= self.last_notified {
            return;
        }
        tracing::info!(count, previous = self.last_notified, "post count increased");
        self.last_notified = count;
        if let Err(e) = self.notifier.notify(Notification::CountChanged { count }) {
            tracing::debug!(error = %e, "count notification not delivered");
        }
    }
}

/// Next batch from the watch, or never once the stream is gone.
async fn next_batch(stream: &mut Option<MutationStream>) -> Option<MutationBatch> {
    match stream {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
