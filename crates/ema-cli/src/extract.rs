//! One-shot extraction commands over a saved page.

use ema_core::{CollectionSnapshot, CollectorSettings, ProfileRecord, Readiness};
use ema_scraper::{extract_profile, MemoryPage, PostCollector};

use crate::print_json;
use crate::source::{load_snapshot, PageArgs};

/// Prints the profile header as JSON, or `null` off a profile page.
///
/// # Errors
///
/// Returns an error if the page file cannot be read.
pub(crate) fn run_profile(args: &PageArgs) -> anyhow::Result<()> {
    let profile: Option<ProfileRecord> = extract_profile(&load_snapshot(args)?);
    if profile.is_none() {
        tracing::warn!(url = %args.url, "no profile found on page");
    }
    print_json(&profile)
}

/// Runs one collection pass over the page file.
///
/// # Errors
///
/// Returns an error if the page file cannot be read.
pub(crate) fn collect_posts(
    args: &PageArgs,
    settings: &CollectorSettings,
) -> anyhow::Result<CollectionSnapshot> {
    let snapshot = load_snapshot(args)?;
    let page = MemoryPage::new(snapshot.url, snapshot.html);
    let mut collector = PostCollector::from_settings(settings);
    let result = collector.scan(&page);

    let readiness = Readiness::of(result.total_found, settings);
    tracing::info!(
        count = result.total_found,
        ?readiness,
        min_posts = settings.min_posts,
        "collection pass finished"
    );
    Ok(result)
}

/// Prints the collected posts with their statistics.
///
/// A snapshot carrying an error is still printed before failing.
///
/// # Errors
///
/// Returns an error if the page file cannot be read or the collection failed.
pub(crate) fn run_posts(args: &PageArgs, settings: &CollectorSettings) -> anyhow::Result<()> {
    let snapshot = collect_posts(args, settings)?;
    print_json(&snapshot)?;
    if let Some(error) = snapshot.error {
        anyhow::bail!("{error}");
    }
    Ok(())
}
