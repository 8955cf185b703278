//! HTTP client for the generative-language `generateContent` endpoint.
//!
//! Wraps `reqwest` with per-attempt timeouts, retry on transient failures,
//! and extraction of the audit JSON object from the model's free-text reply.

use std::sync::LazyLock;
use std::time::Duration;

use ema_core::{AnalyzerSettings, AuditResult, PostRecord, ProfileRecord};
use regex::Regex;
use reqwest::{Client, Url};

use crate::error::AnalyzerError;
use crate::fallback::fallback_result;
use crate::prompt::build_prompt;
use crate::retry::retry_with_backoff;
use crate::types::{GenerateRequest, GenerateResponse};
use crate::Analyzer;

/// Greedy match from the first `{` to the last `}` in a reply.
static JSON_OBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid JSON object regex"));

/// Client for the generative-language REST API.
///
/// Use [`GeminiAnalyzer::from_settings`] with loaded configuration, or
/// [`GeminiAnalyzer::new`] with an explicit key (for example against a mock
/// server in tests).
pub struct GeminiAnalyzer {
    client: Client,
    api_key: String,
    model: String,
    base_url: Url,
    max_attempts: u32,
    backoff_base_ms: u64,
    timeout_secs: u64,
}

impl std::fmt::Debug for GeminiAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiAnalyzer")
            .field("model", &self.model)
            .field("base_url", &self.base_url.as_str())
            .field("max_attempts", &self.max_attempts)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl GeminiAnalyzer {
    /// Creates a client using `api_key` and the remaining knobs from `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`AnalyzerError::InvalidBaseUrl`] if
    /// `settings.base_url` is not a valid URL.
    pub fn new(api_key: &str, settings: &AnalyzerSettings) -> Result<Self, AnalyzerError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent("ema/0.1 (profile-audit)")
            .build()?;

        // Exactly one trailing slash so joins append to the base path.
        let normalised = format!("{}/", settings.base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| AnalyzerError::InvalidBaseUrl {
            url: settings.base_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: settings.model.clone(),
            base_url,
            max_attempts: settings.max_attempts,
            backoff_base_ms: settings.backoff_base_ms,
            timeout_secs: settings.timeout_secs,
        })
    }

    /// Creates a client from configuration, requiring an API key.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::MissingApiKey`] when no key is configured, or
    /// any error from [`GeminiAnalyzer::new`].
    pub fn from_settings(settings: &AnalyzerSettings) -> Result<Self, AnalyzerError> {
        let key = settings
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(AnalyzerError::MissingApiKey)?;
        Self::new(key, settings)
    }

    /// Requests an audit of `profile` from the service.
    ///
    /// Transient failures are retried with back-off; the reply is then
    /// searched for a JSON object and deserialized.
    ///
    /// # Errors
    ///
    /// - [`AnalyzerError::Status`] or [`AnalyzerError::Http`] once retries are
    ///   exhausted or on a non-retriable status.
    /// - [`AnalyzerError::Timeout`] if the last attempt timed out.
    /// - [`AnalyzerError::EmptyReply`], [`AnalyzerError::NoJson`] or
    ///   [`AnalyzerError::Deserialize`] if the reply is unusable.
    pub async fn request_audit(
        &self,
        profile: &ProfileRecord,
        posts: &[PostRecord],
    ) -> Result<AuditResult, AnalyzerError> {
        let prompt = build_prompt(profile, posts);
        let url = self.endpoint()?;
        tracing::debug!(
            model = %self.model,
            posts = posts.len(),
            prompt_chars = prompt.len(),
            "requesting profile audit"
        );

        let text = retry_with_backoff(self.max_attempts, self.backoff_base_ms, || {
            self.generate(&url, &prompt)
        })
        .await?;
        parse_audit(&text)
    }

    /// Full `generateContent` URL for the configured model, key included.
    fn endpoint(&self) -> Result<Url, AnalyzerError> {
        let path = format!("v1beta/models/{}:generateContent", self.model);
        let mut url = self
            .base_url
            .join(&path)
            .map_err(|e| AnalyzerError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    /// One bounded attempt: POST the prompt and return the reply text.
    async fn generate(&self, url: &Url, prompt: &str) -> Result<String, AnalyzerError> {
        let secs = self.timeout_secs;
        tokio::time::timeout(Duration::from_secs(secs), self.send(url, prompt))
            .await
            .map_err(|_| AnalyzerError::Timeout { secs })?
    }

    async fn send(&self, url: &Url, prompt: &str) -> Result<String, AnalyzerError> {
        let response = self
            .client
            .post(url.clone())
            .json(&GenerateRequest::from_prompt(prompt))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AnalyzerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| AnalyzerError::Deserialize {
                context: format!("generateContent(model={})", self.model),
                source: e,
            })?;
        reply.text().ok_or(AnalyzerError::EmptyReply)
    }
}

impl Analyzer for GeminiAnalyzer {
    async fn analyze(&self, profile: &ProfileRecord, posts: &[PostRecord]) -> AuditResult {
        match self.request_audit(profile, posts).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(
                    handle = %profile.handle,
                    error = %e,
                    "profile audit failed, returning fallback result"
                );
                fallback_result(profile, posts)
            }
        }
    }
}

/// The outermost `{...}` span of `text`.
pub(crate) fn extract_json(text: &str) -> Result<&str, AnalyzerError> {
    JSON_OBJECT_RE
        .find(text)
        .map(|m| m.as_str())
        .ok_or(AnalyzerError::NoJson)
}

/// Parses an [`AuditResult`] out of free-form reply text.
///
/// # Errors
///
/// Returns [`AnalyzerError::NoJson`] if the text holds no object, or
/// [`AnalyzerError::Deserialize`] if the object has the wrong shape.
pub fn parse_audit(text: &str) -> Result<AuditResult, AnalyzerError> {
    let json = extract_json(text)?;
    serde_json::from_str(json).map_err(|e| AnalyzerError::Deserialize {
        context: "audit result".to_string(),
        source: e,
    })
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
