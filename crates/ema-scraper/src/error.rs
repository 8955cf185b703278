use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("page unavailable: {0}")]
    PageUnavailable(String),

    #[error("Invalid profile URL: {url}")]
    InvalidProfileUrl { url: String },

    #[error("observe target {target} is not present in the document")]
    TargetUnavailable { target: String },

    #[error("malformed post element: {reason}")]
    Element { reason: String },

    #[error("no listener attached for notification")]
    NoListener,

    #[error("malformed bridge command: {0}")]
    Command(#[from] serde_json::Error),
}
