use thiserror::Error;

/// Errors raised while validating or running a profile analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The profile/posts pair is not fit for analysis.
    #[error("invalid audit request: {0}")]
    InvalidRequest(String),

    /// No API key was configured for the generative-language service.
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,

    /// The configured base URL could not be parsed or joined.
    #[error("invalid analyzer base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("analysis service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// One attempt exceeded its time budget.
    #[error("analysis request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The reply carried no text candidate.
    #[error("analysis reply contained no text")]
    EmptyReply,

    /// The reply text contained no JSON object.
    #[error("no JSON object found in analysis reply")]
    NoJson,

    /// A body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
