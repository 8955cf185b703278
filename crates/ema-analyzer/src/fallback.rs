//! Static audit returned when the analysis service cannot be used.

use ema_core::{
    AuditResult, ContentTopics, LowestPerforming, PostRecord, ProfileRecord, ShareMessage,
    TopPerforming,
};
use rand::seq::IndexedRandom;

use crate::prompt::{rank_by_engagement, truncate_chars};

pub const FALLBACK_SCORE: f64 = 5.0;
const EXCERPT_CHARS: usize = 50;

struct CannedMessage {
    text: &'static str,
    emoji: &'static str,
    vibe: &'static str,
}

const CANNED_MESSAGES: &[CannedMessage] = &[
    CannedMessage {
        text: "{first} is building something special on X",
        emoji: "🚀",
        vibe: "ambitious",
    },
    CannedMessage {
        text: "Authentic voice with real potential for growth",
        emoji: "✨",
        vibe: "authentic",
    },
    CannedMessage {
        text: "Great foundation, ready for the next level",
        emoji: "🎯",
        vibe: "focused",
    },
    CannedMessage {
        text: "Consistent creator with engaging personality",
        emoji: "💫",
        vibe: "engaging",
    },
];

fn excerpt(post: Option<&&PostRecord>, placeholder: &str) -> String {
    post.map_or_else(
        || placeholder.to_string(),
        |p| format!("{}...", truncate_chars(&p.text, EXCERPT_CHARS)),
    )
}

fn share_message(profile: &ProfileRecord) -> ShareMessage {
    let first_name = profile
        .display_name
        .split_whitespace()
        .next()
        .unwrap_or(&profile.handle);
    let canned = CANNED_MESSAGES
        .choose(&mut rand::rng())
        .unwrap_or(&CANNED_MESSAGES[0]);
    ShareMessage {
        text: canned.text.replace("{first}", first_name),
        emoji: canned.emoji.to_string(),
        vibe: canned.vibe.to_string(),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// A neutral 5/10 audit naming the profile, quoting its best and worst
/// posts by engagement.
#[must_use]
pub fn fallback_result(profile: &ProfileRecord, posts: &[PostRecord]) -> AuditResult {
    let ranked = rank_by_engagement(posts);
    let top = excerpt(ranked.first(), "Sample high-performing content");
    let bottom = excerpt(ranked.last(), "Sample low-performing content");

    AuditResult {
        score: FALLBACK_SCORE,
        max_score: 10.0,
        description: format!(
            "Analysis could not be completed. This is fallback data for {} based on {} posts.",
            profile.handle,
            posts.len()
        ),
        doing_right: strings(&["Maintains a regular posting schedule."]),
        doing_wrong: strings(&["Could improve engagement with followers."]),
        should_start: strings(&["Experiment with different content formats."]),
        top_performing: TopPerforming {
            content: vec![
                top,
                "Engaging question-based posts".to_string(),
                "Content with a clear value proposition".to_string(),
            ],
            why_it_worked: strings(&[
                "Strong hook in the opening line",
                "Encouraged audience interaction",
                "Relevant and timely topic",
            ]),
        },
        lowest_performing: LowestPerforming {
            content: vec![
                bottom,
                "Generic promotional posts".to_string(),
                "Posts without a clear purpose".to_string(),
            ],
            why_it_failed: strings(&[
                "Lack of an engaging hook",
                "Too promotional without value",
                "Poor timing or formatting",
            ]),
        },
        content_topics: ContentTopics {
            best_performing: strings(&["Industry insights", "Personal experiences", "Helpful tips"]),
            recommendations: strings(&[
                "Share behind-the-scenes content",
                "Ask engaging questions",
                "Post educational threads",
            ]),
        },
        share_message: share_message(profile),
    }
}
