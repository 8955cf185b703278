//! Profile audit command: extract, validate, analyze.

use ema_analyzer::{audit, AnalyzerError, FallbackAnalyzer, GeminiAnalyzer};
use ema_core::{AppConfig, AuditResult, Readiness};
use ema_scraper::extract_profile;

use crate::extract::collect_posts;
use crate::print_json;
use crate::source::{load_snapshot, PageArgs};

/// Audits the profile on the page file and prints the result.
///
/// Without a configured API key the static fallback audit is produced.
///
/// # Errors
///
/// Returns an error if the page is not a profile, the collection fails or
/// holds too few posts, or the analyzer cannot be configured.
pub(crate) async fn run_audit(args: &PageArgs, config: &AppConfig) -> anyhow::Result<()> {
    let profile = extract_profile(&load_snapshot(args)?)
        .ok_or_else(|| anyhow::anyhow!("no profile found at {}", args.url))?;

    let snapshot = collect_posts(args, &config.collector)?;
    if let Some(error) = snapshot.error {
        anyhow::bail!("{error}");
    }
    if !Readiness::of(snapshot.total_found, &config.collector).can_extract() {
        tracing::warn!(
            count = snapshot.total_found,
            min_posts = config.collector.min_posts,
            "fewer posts than recommended for a reliable audit"
        );
    }

    let result: AuditResult = match GeminiAnalyzer::from_settings(&config.analyzer) {
        Ok(analyzer) => audit(&analyzer, &profile, &snapshot.posts).await?,
        Err(AnalyzerError::MissingApiKey) => {
            tracing::warn!("GEMINI_API_KEY is not set, producing fallback audit");
            audit(&FallbackAnalyzer, &profile, &snapshot.posts).await?
        }
        Err(e) => return Err(e.into()),
    };

    print_json(&result)
}
