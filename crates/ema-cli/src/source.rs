//! Loading saved profile pages from disk.

use std::path::PathBuf;

use clap::Args;
use ema_scraper::PageSnapshot;

/// A saved page and the address it was captured from.
#[derive(Debug, Clone, Args)]
pub struct PageArgs {
    /// Path to the saved HTML document
    #[arg(long)]
    pub html: PathBuf,
    /// URL the document was loaded from (e.g. `https://x.com/handle`)
    #[arg(long)]
    pub url: String,
}

/// Reads the HTML file named by `args`.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub(crate) fn read_html(args: &PageArgs) -> anyhow::Result<String> {
    std::fs::read_to_string(&args.html).map_err(|e| {
        anyhow::anyhow!("failed to read page file '{}': {e}", args.html.display())
    })
}

/// Loads `args` as a document snapshot.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub(crate) fn load_snapshot(args: &PageArgs) -> anyhow::Result<PageSnapshot> {
    Ok(PageSnapshot::new(args.url.clone(), read_html(args)?))
}
