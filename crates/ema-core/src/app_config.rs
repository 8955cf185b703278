use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Timing and threshold knobs for the post collector and refresh controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorSettings {
    /// Minimum spacing between two full scans.
    pub scan_cooldown_ms: u64,
    /// Delay before the first scan after observation starts.
    pub settle_delay_ms: u64,
    /// Quiet period after the last qualifying mutation batch before rescanning.
    pub debounce_ms: u64,
    /// Posts required before extraction is allowed.
    pub min_posts: usize,
    /// Posts at which the collection is considered complete.
    pub ready_posts: usize,
}

impl CollectorSettings {
    #[must_use]
    pub fn scan_cooldown(&self) -> Duration {
        Duration::from_millis(self.scan_cooldown_ms)
    }

    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            scan_cooldown_ms: 2_000,
            settle_delay_ms: 2_000,
            debounce_ms: 3_000,
            min_posts: 10,
            ready_posts: 15,
        }
    }
}

/// Settings for the downstream analysis service client.
#[derive(Clone, PartialEq, Eq)]
pub struct AnalyzerSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for AnalyzerSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyzerSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_attempts", &self.max_attempts)
            .field("backoff_base_ms", &self.backoff_base_ms)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.0-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/".to_string(),
            max_attempts: 3,
            backoff_base_ms: 1_000,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub collector: CollectorSettings,
    pub analyzer: AnalyzerSettings,
}
