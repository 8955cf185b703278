use serde::{Deserialize, Serialize};

use crate::app_config::CollectorSettings;

/// How far along a collection is relative to the configured thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Readiness {
    /// Below `min_posts`; extraction would be refused.
    NeedMore,
    /// At least `min_posts` but short of `ready_posts`.
    Extractable,
    /// `ready_posts` or more; callers may proceed without waiting.
    Ready,
}

impl Readiness {
    #[must_use]
    pub fn of(count: usize, settings: &CollectorSettings) -> Self {
        if count >= settings.ready_posts {
            Readiness::Ready
        } else if count >= settings.min_posts {
            Readiness::Extractable
        } else {
            Readiness::NeedMore
        }
    }

    #[must_use]
    pub fn can_extract(self) -> bool {
        !matches!(self, Readiness::NeedMore)
    }
}
