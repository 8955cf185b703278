use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a collected post is an ordinary post or the profile's pinned one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Original,
    Pinned,
}

impl std::fmt::Display for PostKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostKind::Original => write!(f, "original"),
            PostKind::Pinned => write!(f, "pinned"),
        }
    }
}

/// Engagement counters read from a post's action bar. Each one is zero when
/// its control could not be found or parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMetrics {
    pub like_count: u64,
    pub repost_count: u64,
    pub reply_count: u64,
    pub view_count: u64,
}

impl PostMetrics {
    /// Likes + reposts + replies. Views are not interactions.
    #[must_use]
    pub fn engagement(&self) -> u64 {
        self.like_count
            .saturating_add(self.repost_count)
            .saturating_add(self.reply_count)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaFlags {
    pub has_image: bool,
    pub has_video: bool,
    pub has_media: bool,
}

impl MediaFlags {
    /// Builds flags with `has_media` derived from the other two.
    #[must_use]
    pub fn new(has_image: bool, has_video: bool) -> Self {
        Self {
            has_image,
            has_video,
            has_media: has_image || has_video,
        }
    }
}

/// A single post authored by the viewed profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    /// Numeric status id taken from the permalink.
    pub id: String,
    pub text: String,
    pub permalink_url: String,
    pub published_at: DateTime<Utc>,
    pub classification: PostKind,
    pub metrics: PostMetrics,
    pub media: MediaFlags,
    /// `@`-prefixed, lower-cased.
    pub author_handle: String,
    pub extracted_at: DateTime<Utc>,
}

impl PostRecord {
    #[must_use]
    pub fn is_pinned(&self) -> bool {
        self.classification == PostKind::Pinned
    }

    /// Collection order: pinned posts first, then newest first.
    #[must_use]
    pub fn display_order(a: &PostRecord, b: &PostRecord) -> Ordering {
        b.is_pinned()
            .cmp(&a.is_pinned())
            .then_with(|| b.published_at.cmp(&a.published_at))
    }
}

/// Aggregates over every post in a collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStatistics {
    pub total: usize,
    pub originals: usize,
    pub pinned: usize,
    pub with_images: usize,
    pub with_videos: usize,
    /// Mean like count, rounded half-up. Zero for an empty collection.
    pub avg_likes: u64,
}

impl CollectionStatistics {
    #[must_use]
    pub fn from_posts(posts: &[PostRecord]) -> Self {
        let total = posts.len();
        if total == 0 {
            return Self::default();
        }

        let pinned = posts.iter().filter(|p| p.is_pinned()).count();
        let like_sum: u64 = posts.iter().map(|p| p.metrics.like_count).sum();
        let n = total as u64;

        Self {
            total,
            originals: total - pinned,
            pinned,
            with_images: posts.iter().filter(|p| p.media.has_image).count(),
            with_videos: posts.iter().filter(|p| p.media.has_video).count(),
            avg_likes: (2 * like_sum + n) / (2 * n),
        }
    }
}

/// The collector's materialized view at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSnapshot {
    pub posts: Vec<PostRecord>,
    pub statistics: CollectionStatistics,
    pub extracted_at: DateTime<Utc>,
    pub total_found: usize,
    /// Set only when the scan could not run (page mismatch or scan fault).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CollectionSnapshot {
    /// Sorts `posts` into display order and computes statistics.
    #[must_use]
    pub fn from_posts(mut posts: Vec<PostRecord>, extracted_at: DateTime<Utc>) -> Self {
        posts.sort_by(PostRecord::display_order);
        let statistics = CollectionStatistics::from_posts(&posts);
        Self {
            total_found: posts.len(),
            posts,
            statistics,
            extracted_at,
            error: None,
        }
    }

    /// The empty-result shape carrying an error marker.
    #[must_use]
    pub fn failed(error: impl Into<String>, extracted_at: DateTime<Utc>) -> Self {
        Self {
            posts: Vec::new(),
            statistics: CollectionStatistics::default(),
            extracted_at,
            total_found: 0,
            error: Some(error.into()),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
