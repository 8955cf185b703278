//! Engagement counts and media flags read from a post element.
//!
//! Counts come from the accessible labels of the metric controls, e.g.
//! `aria-label="12 Likes. Like"`, never from the rendered abbreviations.

use std::sync::LazyLock;

use ema_core::{MediaFlags, PostMetrics};
use regex::Regex;
use scraper::ElementRef;

use crate::dom::{attr, clean_text, query, selector, text_content};

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:,\d+)*(?:\.\d+)?)").expect("valid number regex"));
static SCALED_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:,\d+)*(?:\.\d+)?)\s*([kmb]?)").expect("valid scaled number regex")
});
static VIEW_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:,\d+)*(?:\.\d+)?)\s*([kmb]?)\s*view").expect("valid view label regex")
});

pub const LIKE_CONTROLS: &[&str] = &[
    r#"[data-testid="like"]"#,
    r#"[data-testid="unlike"]"#,
    r#"[aria-label*="like"]"#,
    r#"[aria-label*="Like"]"#,
    r#"[aria-label*="unlike"]"#,
    r#"[aria-label*="Unlike"]"#,
];

pub const REPOST_CONTROLS: &[&str] = &[
    r#"[data-testid="retweet"]"#,
    r#"[data-testid="unretweet"]"#,
];

pub const REPLY_CONTROLS: &[&str] = &[r#"[data-testid="reply"]"#];

const ANALYTICS_CONTROL: &str = r#"[data-testid="analytics"]"#;
const VIEW_LABELLED: &str = r#"[aria-label*="view"], [aria-label*="View"]"#;

const PHOTO: &str = r#"[data-testid="tweetPhoto"]"#;
const VIDEO: &str = r#"[data-testid="videoPlayer"], [data-testid="gifPlayer"]"#;

fn to_number(digits: &str) -> Option<f64> {
    digits.replace(',', "").parse::<f64>().ok()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

fn magnitude(suffix: &str) -> f64 {
    match suffix.to_ascii_lowercase().as_str() {
        "k" => 1_000.0,
        "m" => 1_000_000.0,
        "b" => 1_000_000_000.0,
        _ => 1.0,
    }
}

/// First numeric token of `label`, comma grouping stripped, decimals rounded.
#[must_use]
pub fn parse_count(label: &str) -> Option<u64> {
    let caps = NUMBER_RE.captures(label)?;
    to_number(&caps[1]).map(round_count)
}

/// Like [`parse_count`] but honours a trailing `K`/`M`/`B` magnitude.
#[must_use]
pub fn parse_scaled_count(label: &str) -> Option<u64> {
    let caps = SCALED_NUMBER_RE.captures(label)?;
    let value = to_number(&caps[1])?;
    Some(round_count(value * magnitude(&caps[2])))
}

/// Scaled count from a label of the form `<n><suffix> view(s)`.
#[must_use]
pub fn parse_view_label(label: &str) -> Option<u64> {
    let caps = VIEW_LABEL_RE.captures(label)?;
    let value = to_number(&caps[1])?;
    Some(round_count(value * magnitude(&caps[2])))
}

/// The first control matching any of `controls` (in order) decides the
/// count; its label failing to parse yields `None` rather than trying the
/// next control.
fn control_count(post: ElementRef<'_>, controls: &[&str]) -> Option<u64> {
    let control = controls.iter().find_map(|css| query(post, css))?;
    attr(control, "aria-label").and_then(parse_count)
}

fn view_count(post: ElementRef<'_>) -> Option<u64> {
    if let Some(analytics) = query(post, ANALYTICS_CONTROL) {
        let label = attr(analytics, "aria-label")
            .map_or_else(|| clean_text(&text_content(analytics)), str::to_string);
        if let Some(count) = parse_scaled_count(&label) {
            return Some(count);
        }
    }

    let labelled = selector(VIEW_LABELLED);
    post.select(&labelled)
        .filter_map(|el| attr(el, "aria-label"))
        .filter(|label| label.contains("view"))
        .find_map(parse_view_label)
}

/// Reads all four counts from `post`. Anything missing is zero.
#[must_use]
pub fn read_metrics(post: ElementRef<'_>) -> PostMetrics {
    PostMetrics {
        like_count: control_count(post, LIKE_CONTROLS).unwrap_or(0),
        repost_count: control_count(post, REPOST_CONTROLS).unwrap_or(0),
        reply_count: control_count(post, REPLY_CONTROLS).unwrap_or(0),
        view_count: view_count(post).unwrap_or(0),
    }
}

#[must_use]
pub fn read_media(post: ElementRef<'_>) -> MediaFlags {
    MediaFlags::new(query(post, PHOTO).is_some(), query(post, VIDEO).is_some())
}
