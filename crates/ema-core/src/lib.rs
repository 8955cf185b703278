pub mod app_config;
pub mod audit;
pub mod config;
pub mod posts;
pub mod profile;
pub mod readiness;

use thiserror::Error;

pub use app_config::{AnalyzerSettings, AppConfig, CollectorSettings, Environment};
pub use audit::{AuditResult, ContentTopics, LowestPerforming, ShareMessage, TopPerforming};
pub use config::{load_app_config, load_app_config_from_env};
pub use posts::{
    CollectionSnapshot, CollectionStatistics, MediaFlags, PostKind, PostMetrics, PostRecord,
};
pub use profile::ProfileRecord;
pub use readiness::Readiness;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("config validation error: {0}")]
    Validation(String),
}
