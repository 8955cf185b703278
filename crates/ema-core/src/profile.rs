use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Header data scraped from a profile page.
///
/// Follower and following counts keep the page's abbreviated form (`"1.2K"`)
/// rather than being expanded to integers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub display_name: String,
    /// Always starts with `@`.
    pub handle: String,
    /// Empty when no avatar image was found.
    pub avatar_url: String,
    pub bio: String,
    pub follower_count: String,
    pub following_count: String,
    pub source_url: String,
    pub extracted_at: DateTime<Utc>,
}

impl ProfileRecord {
    /// Placeholder used when the profile has no description.
    pub const DEFAULT_BIO: &'static str = "No bio available";
}
