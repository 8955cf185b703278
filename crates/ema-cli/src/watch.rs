//! Live post counting over a page file that is rewritten in place.
//!
//! The file is polled; each change replaces the in-memory document, which
//! feeds the refresh controller exactly like a live feed would. Bridge
//! replies and count notifications are printed to stdout one JSON object
//! per line until interrupted.

use std::sync::Arc;
use std::time::Duration;

use ema_core::CollectorSettings;
use ema_scraper::{Bridge, ChannelNotifier, Command, MemoryPage};
use tokio::time::MissedTickBehavior;

use crate::source::{read_html, PageArgs};

const MIN_POLL_MS: u64 = 50;

fn print_line<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

/// Watches the page file until ctrl-c, then stops counting and prints the
/// final count.
///
/// # Errors
///
/// Returns an error if the page file cannot be read initially, the ctrl-c
/// handler cannot be installed, or output cannot be serialized.
pub(crate) async fn run_watch(
    args: &PageArgs,
    settings: &CollectorSettings,
    poll_ms: u64,
) -> anyhow::Result<()> {
    let mut last_html = read_html(args)?;
    let page = Arc::new(MemoryPage::new(args.url.clone(), last_html.clone()));
    let (notifier, mut notifications) = ChannelNotifier::channel();
    let mut bridge = Bridge::new(Arc::clone(&page), Arc::new(notifier), settings);

    print_line(&bridge.dispatch(Command::StartCounting).await)?;
    tracing::info!(
        path = %args.html.display(),
        poll_ms,
        observed = ?bridge.controller().observed(),
        "watching page file"
    );

    let mut ticker = tokio::time::interval(Duration::from_millis(poll_ms.max(MIN_POLL_MS)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                result?;
                break;
            }
            Some(notification) = notifications.recv() => print_line(&notification)?,
            _ = ticker.tick() => match read_html(args) {
                Ok(html) if html != last_html => {
                    tracing::debug!(bytes = html.len(), "page file changed");
                    page.set_html(html.clone());
                    last_html = html;
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "page file unreadable, keeping last document"),
            },
        }
    }

    bridge.dispatch(Command::StopCounting).await;
    print_line(&bridge.dispatch(Command::GetCurrentCount).await)?;
    Ok(())
}
