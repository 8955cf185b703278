//! Prompt construction for a profile audit.

use std::fmt::Write as _;

use ema_core::{PostRecord, ProfileRecord};

/// Most posts summarized in a prompt.
pub const MAX_SUMMARIZED_POSTS: usize = 20;
/// Characters of post text kept per summary.
pub const SUMMARY_TEXT_CHARS: usize = 200;
/// Posts listed in each of the top/bottom performer sections.
const PERFORMERS_SHOWN: usize = 3;

/// A post reduced to what the prompt needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSummary {
    pub text: String,
    pub likes: u64,
    pub reposts: u64,
    pub replies: u64,
    pub views: u64,
    pub engagement: u64,
}

impl PostSummary {
    fn of(post: &PostRecord) -> Self {
        Self {
            text: truncate_chars(&post.text, SUMMARY_TEXT_CHARS),
            likes: post.metrics.like_count,
            reposts: post.metrics.repost_count,
            replies: post.metrics.reply_count,
            views: post.metrics.view_count,
            engagement: post.metrics.engagement(),
        }
    }
}

/// First `max` characters of `text`.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// `posts` ordered by engagement, highest first. Ties keep input order.
#[must_use]
pub fn rank_by_engagement(posts: &[PostRecord]) -> Vec<&PostRecord> {
    let mut ranked: Vec<&PostRecord> = posts.iter().collect();
    ranked.sort_by(|a, b| b.metrics.engagement().cmp(&a.metrics.engagement()));
    ranked
}

/// Summaries of the most engaging posts, at most [`MAX_SUMMARIZED_POSTS`].
#[must_use]
pub fn summarize(posts: &[PostRecord]) -> Vec<PostSummary> {
    rank_by_engagement(posts)
        .into_iter()
        .take(MAX_SUMMARIZED_POSTS)
        .map(PostSummary::of)
        .collect()
}

const RESPONSE_SHAPE: &str = r#"{
  "score": [number between 1-10],
  "maxScore": 10,
  "description": "[2-3 sentence overall assessment]",
  "doingRight": ["[point 1]", "[point 2]", "[point 3]", "[point 4]"],
  "doingWrong": ["[point 1]", "[point 2]", "[point 3]"],
  "shouldStart": ["[recommendation 1]", "[recommendation 2]", "[recommendation 3]"],
  "topPerforming": {
    "content": ["[top post 1 summary]", "[top post 2 summary]", "[top post 3 summary]"],
    "whyItWorked": ["[reason 1]", "[reason 2]", "[reason 3]"]
  },
  "lowestPerforming": {
    "content": ["[low post 1 summary]", "[low post 2 summary]", "[low post 3 summary]"],
    "whyItFailed": ["[reason 1]", "[reason 2]", "[reason 3]"]
  },
  "contentTopics": {
    "bestPerforming": ["[topic 1]", "[topic 2]", "[topic 3]"],
    "recommendations": ["[content type 1]", "[content type 2]", "[content type 3]"]
  },
  "shareMessage": {
    "text": "[catchy message of at most 20 words about their strengths]",
    "emoji": "[1-2 relevant emojis]",
    "vibe": "[content personality, e.g. creative/professional/funny/authentic]"
  }
}"#;

const GUIDANCE: &str = "\
Analysis guidance:
- Identify the best performing topics and themes, not individual posts.
- Recommend specific content types and formats (threads, polls, images) for this audience.
- Mention timing patterns only if they are visible.
- Keep every recommendation practical and actionable.

For shareMessage: keep it under 20 words, personal to this account, matching its vibe, with one fitting emoji.

Respond ONLY with valid JSON.";

fn write_performer(out: &mut String, rank: usize, post: &PostSummary) {
    let _ = writeln!(
        out,
        "{rank}. \"{}\" ({} total interactions: {} likes, {} reposts, {} replies)",
        post.text, post.engagement, post.likes, post.reposts, post.replies
    );
}

/// Builds the audit prompt for `profile` from its posts.
#[must_use]
pub fn build_prompt(profile: &ProfileRecord, posts: &[PostRecord]) -> String {
    let summaries = summarize(posts);
    let total: u64 = summaries.iter().map(|s| s.engagement).sum();
    let count = u64::try_from(summaries.len()).unwrap_or(u64::MAX).max(1);
    let average = (total + count / 2) / count;

    let mut out = String::new();
    let _ = writeln!(
        out,
        "You are an expert X growth strategist. Audit this profile and answer in exactly this JSON format:"
    );
    let _ = writeln!(out, "{RESPONSE_SHAPE}\n");

    let _ = writeln!(out, "PROFILE:");
    let _ = writeln!(out, "- Name: {}", profile.display_name);
    let _ = writeln!(out, "- Handle: {}", profile.handle);
    let _ = writeln!(out, "- Bio: {}", profile.bio);
    let _ = writeln!(out, "- Followers: {}\n", profile.follower_count);

    let _ = writeln!(out, "PERFORMANCE:");
    let _ = writeln!(out, "Average engagement: {average} interactions per post\n");

    let _ = writeln!(out, "TOP PERFORMING POSTS:");
    for (i, post) in summaries.iter().take(PERFORMERS_SHOWN).enumerate() {
        write_performer(&mut out, i + 1, post);
    }

    let _ = writeln!(out, "\nLOWEST PERFORMING POSTS:");
    for (i, post) in summaries.iter().rev().take(PERFORMERS_SHOWN).enumerate() {
        write_performer(&mut out, i + 1, post);
    }

    let _ = writeln!(out, "\nRECENT POSTS ({} total):", posts.len());
    for (i, post) in summaries.iter().enumerate() {
        let _ = writeln!(out, "{}. \"{}\"", i + 1, post.text);
    }

    let _ = write!(out, "\n{GUIDANCE}");
    out
}
