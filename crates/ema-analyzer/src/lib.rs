//! Profile audit against a generative-language service.
//!
//! [`audit`] validates a profile and its collected posts, then hands them to
//! an [`Analyzer`]. [`GeminiAnalyzer`] calls the remote service with retry and
//! falls back to a static result when the service cannot be used;
//! [`FallbackAnalyzer`] never leaves the process.

pub mod client;
pub mod error;
pub mod fallback;
pub mod prompt;
pub(crate) mod retry;
pub mod types;
pub mod validate;

use std::future::Future;

use ema_core::{AuditResult, PostRecord, ProfileRecord};

pub use client::{parse_audit, GeminiAnalyzer};
pub use error::AnalyzerError;
pub use fallback::fallback_result;
pub use prompt::build_prompt;
pub use validate::{validate_request, MIN_POSTS_FOR_AUDIT};

/// Something that can turn a profile and its posts into an audit.
///
/// Implementations never fail: service errors degrade to a fallback result.
pub trait Analyzer {
    fn analyze(
        &self,
        profile: &ProfileRecord,
        posts: &[PostRecord],
    ) -> impl Future<Output = AuditResult> + Send;
}

/// Produces the static fallback audit without any network access.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackAnalyzer;

impl Analyzer for FallbackAnalyzer {
    async fn analyze(&self, profile: &ProfileRecord, posts: &[PostRecord]) -> AuditResult {
        fallback_result(profile, posts)
    }
}

/// Validates the request and runs `analyzer` over it.
///
/// # Errors
///
/// Returns [`AnalyzerError::InvalidRequest`] when the request fails
/// [`validate_request`]. Analysis itself does not fail.
pub async fn audit<A: Analyzer>(
    analyzer: &A,
    profile: &ProfileRecord,
    posts: &[PostRecord],
) -> Result<AuditResult, AnalyzerError> {
    validate_request(profile, posts)?;
    tracing::info!(
        handle = %profile.handle,
        posts = posts.len(),
        "auditing profile"
    );
    Ok(analyzer.analyze(profile, posts).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::fixtures::{posts, profile};

    #[tokio::test]
    async fn audit_rejects_invalid_request_before_analysis() {
        let err = audit(&FallbackAnalyzer, &profile(), &posts(2))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn fallback_analyzer_returns_fallback_result() {
        let result = audit(&FallbackAnalyzer, &profile(), &posts(5)).await.unwrap();
        assert!((result.score - fallback::FALLBACK_SCORE).abs() < f64::EPSILON);
        assert!(result.description.contains("5 posts"));
    }
}
