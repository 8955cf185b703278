use serde::{Deserialize, Serialize};

/// Assessment returned by the analysis service for one profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResult {
    pub score: f64,
    #[serde(default = "default_max_score")]
    pub max_score: f64,
    pub description: String,
    #[serde(default)]
    pub doing_right: Vec<String>,
    #[serde(default)]
    pub doing_wrong: Vec<String>,
    #[serde(default)]
    pub should_start: Vec<String>,
    #[serde(default)]
    pub top_performing: TopPerforming,
    #[serde(default)]
    pub lowest_performing: LowestPerforming,
    #[serde(default)]
    pub content_topics: ContentTopics,
    #[serde(default)]
    pub share_message: ShareMessage,
}

fn default_max_score() -> f64 {
    10.0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPerforming {
    #[serde(default)]
    pub content: Vec<String>,
    #[serde(default)]
    pub why_it_worked: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowestPerforming {
    #[serde(default)]
    pub content: Vec<String>,
    #[serde(default)]
    pub why_it_failed: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTopics {
    #[serde(default)]
    pub best_performing: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShareMessage {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub vibe: String,
}
