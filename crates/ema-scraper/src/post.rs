//! Turns one post-like element into a [`PostRecord`], or says why not.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use ema_core::{PostKind, PostRecord};
use regex::Regex;
use scraper::ElementRef;
use url::Url;

use crate::collector::CollectionState;
use crate::dom::{attr, clean_text, handle_from_href, query, selector, text_content};
use crate::error::ScraperError;
use crate::metrics::{read_media, read_metrics};

static STATUS_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/status/(\d+)").expect("valid status regex"));

const PERMALINK: &str = r#"a[href*="/status/"]"#;
const AUTHOR_LINK: &str = r#"[data-testid="User-Name"] a[role="link"]"#;
const SOCIAL_CONTEXT: &str = r#"[data-testid="socialContext"]"#;
const QUOTED_POST: &str = r#"[data-testid="quoteTweet"]"#;
const POST_TEXT: &str = r#"[data-testid="tweetText"]"#;
const TIMESTAMP: &str = "time";

const EXCLUDED_CONTEXTS: &[&str] = &["retweeted", "reposted", "replying to"];
const MIN_TEXT_CHARS: usize = 3;

/// Why an element did not become a record. Checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    NoPermalink,
    AlreadySeen,
    ForeignAuthor,
    SocialContext,
    QuotedPost,
    NoText,
    NoTimestamp,
}

impl std::fmt::Display for Skip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Skip::NoPermalink => "no permalink",
            Skip::AlreadySeen => "already collected",
            Skip::ForeignAuthor => "authored by another account",
            Skip::SocialContext => "repost or reply context",
            Skip::QuotedPost => "contains a quoted post",
            Skip::NoText => "no text",
            Skip::NoTimestamp => "no timestamp",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extracted {
    Post(PostRecord),
    Skipped(Skip),
}

/// Applies the rejection filters to `element` and builds a record from what
/// survives.
///
/// `owner` is the lower-cased handle of the profile being viewed and `base`
/// the page URL relative links are resolved against.
///
/// # Errors
///
/// Returns [`ScraperError::Element`] if the element's permalink cannot be
/// resolved to an absolute URL.
pub fn extract_post(
    element: ElementRef<'_>,
    owner: &str,
    base: &Url,
    state: &CollectionState,
    extracted_at: DateTime<Utc>,
) -> Result<Extracted, ScraperError> {
    let Some(href) = query(element, PERMALINK).and_then(|a| attr(a, "href")) else {
        return Ok(Extracted::Skipped(Skip::NoPermalink));
    };
    let permalink = base.join(href).map_err(|e| ScraperError::Element {
        reason: format!("unresolvable permalink {href:?}: {e}"),
    })?;
    let permalink = permalink.to_string();
    let Some(id) = STATUS_ID_RE
        .captures(&permalink)
        .map(|caps| caps[1].to_string())
    else {
        return Ok(Extracted::Skipped(Skip::NoPermalink));
    };

    if state.has_seen(&permalink) || state.contains_id(&id) {
        return Ok(Extracted::Skipped(Skip::AlreadySeen));
    }

    let author = query(element, AUTHOR_LINK)
        .and_then(|a| attr(a, "href"))
        .and_then(|href| handle_from_href(base, href));
    if author.as_deref() != Some(owner) {
        return Ok(Extracted::Skipped(Skip::ForeignAuthor));
    }

    let context = query(element, SOCIAL_CONTEXT)
        .map(|el| text_content(el).to_lowercase())
        .unwrap_or_default();
    if EXCLUDED_CONTEXTS.iter().any(|c| context.contains(c)) {
        return Ok(Extracted::Skipped(Skip::SocialContext));
    }
    if query(element, QUOTED_POST).is_some() {
        return Ok(Extracted::Skipped(Skip::QuotedPost));
    }

    let text_selector = selector(POST_TEXT);
    let text = element
        .select(&text_selector)
        .map(|el| text_content(el).trim().to_string())
        .collect::<Vec<_>>()
        .join(" ");
    let text = text.trim();
    if text.chars().count() < MIN_TEXT_CHARS {
        return Ok(Extracted::Skipped(Skip::NoText));
    }

    let Some(published_at) = query(element, TIMESTAMP)
        .and_then(|t| attr(t, "datetime"))
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&Utc))
    else {
        return Ok(Extracted::Skipped(Skip::NoTimestamp));
    };

    let classification = if context.contains("pinned") {
        PostKind::Pinned
    } else {
        PostKind::Original
    };

    Ok(Extracted::Post(PostRecord {
        id,
        text: text.to_string(),
        permalink_url: permalink,
        published_at,
        classification,
        metrics: read_metrics(element),
        media: read_media(element),
        author_handle: format!("@{owner}"),
        extracted_at,
    }))
}

/// Display form of a skipped element's permalink, for logs.
pub(crate) fn permalink_hint(element: ElementRef<'_>) -> String {
    query(element, PERMALINK)
        .and_then(|a| attr(a, "href"))
        .map_or_else(|| "<none>".to_string(), clean_text)
}
