//! One-shot extraction of a profile header into a [`ProfileRecord`].
//!
//! Each field is resolved from an ordered table of [`Lookup`]s; the first
//! lookup producing an acceptable non-empty value wins. The tables are plain
//! data so each field can be tested against hand-written markup.

use chrono::Utc;
use ema_core::ProfileRecord;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::dom::{attr, clean_text, profile_segment, query, text_content};
use crate::page::PageSnapshot;

/// Marker of the keyboard-shortcut hint the header sometimes leaks into the
/// screen-name node.
const HANDLE_NOISE_MARKER: &str = "keyboard";
const HANDLE_NOISE_TEXT: &str = "View keyboard shortcuts";

/// One way of reading a field from the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Cleaned text of the first element matching the selector.
    Text(&'static str),
    /// Attribute of the first element matching the selector.
    Attr(&'static str, &'static str),
    /// The single path segment of a profile-page URL.
    PathSegment,
    /// Cleaned text of the first matching element whose text starts with the
    /// given prefix.
    TextWithPrefix(&'static str, &'static str),
}

impl Lookup {
    /// Runs this lookup. `accept` can veto a candidate, in which case the
    /// lookup reports a miss (or, for [`Lookup::TextWithPrefix`], keeps
    /// scanning).
    pub fn resolve(
        &self,
        root: ElementRef<'_>,
        url: Option<&Url>,
        accept: &dyn Fn(&str) -> bool,
    ) -> Option<String> {
        let candidate = match *self {
            Lookup::Text(css) => query(root, css).map(|el| clean_text(&text_content(el))),
            Lookup::Attr(css, name) => {
                query(root, css).and_then(|el| attr(el, name).map(str::to_string))
            }
            Lookup::PathSegment => url.and_then(|u| profile_segment(u.as_str())),
            Lookup::TextWithPrefix(css, prefix) => {
                let selector = Selector::parse(css).ok()?;
                return root
                    .select(&selector)
                    .map(|el| clean_text(&text_content(el)))
                    .find(|text| text.starts_with(prefix) && accept(text));
            }
        }?;

        (!candidate.is_empty() && accept(&candidate)).then_some(candidate)
    }
}

pub const NAME_LOOKUPS: &[Lookup] = &[
    Lookup::Text(r#"[data-testid="UserName"] span"#),
    Lookup::Text(r#"h1[role="heading"]"#),
    Lookup::Text(r#"[data-testid="UserProfileHeader_Items"] h1"#),
];

pub const HANDLE_LOOKUPS: &[Lookup] = &[
    Lookup::Text(r#"[data-testid="UserScreenName"]"#),
    Lookup::PathSegment,
    Lookup::TextWithPrefix(r#"[data-testid="UserProfileHeader_Items"] *"#, "@"),
];

pub const AVATAR_LOOKUPS: &[Lookup] = &[
    Lookup::Attr(r#"[data-testid^="UserAvatar-Container-"] img"#, "src"),
    Lookup::Attr(r#"img[alt*="profile"]"#, "src"),
    Lookup::Attr(r#"[data-testid="UserProfileHeader"] img"#, "src"),
];

pub const BIO_LOOKUPS: &[Lookup] = &[
    Lookup::Text(r#"[data-testid="UserDescription"]"#),
    Lookup::Text(r#"[data-testid="UserProfileHeader_Items"] div[dir="auto"]"#),
];

pub const FOLLOWERS_LOOKUPS: &[Lookup] = &[
    Lookup::Text(r#"a[href$="/verified_followers"] span"#),
    Lookup::Text(r#"a[href$="/followers"] span"#),
    Lookup::Text(r#"[data-testid="UserProfileHeader_Items"] a[href*="followers"]"#),
];

pub const FOLLOWING_LOOKUPS: &[Lookup] = &[
    Lookup::Text(r#"a[href$="/following"] span"#),
    Lookup::Text(r#"[data-testid="UserProfileHeader_Items"] a[href*="following"]"#),
];

/// First acceptable value across `lookups`, in order.
pub fn first_match(
    lookups: &[Lookup],
    root: ElementRef<'_>,
    url: Option<&Url>,
    accept: &dyn Fn(&str) -> bool,
) -> Option<String> {
    lookups
        .iter()
        .find_map(|lookup| lookup.resolve(root, url, accept))
}

fn any_value(_: &str) -> bool {
    true
}

fn not_keyboard_noise(candidate: &str) -> bool {
    !candidate.contains(HANDLE_NOISE_MARKER)
}

/// Strips the shortcut hint, keeps the first whitespace-delimited token and
/// guarantees a leading `@`. Returns `None` if nothing is left.
#[must_use]
pub fn normalize_handle(raw: &str) -> Option<String> {
    let stripped = raw.replace(HANDLE_NOISE_TEXT, "");
    let token = stripped.split_whitespace().next()?;
    if token.starts_with('@') {
        (token.len() > 1).then(|| token.to_string())
    } else {
        Some(format!("@{token}"))
    }
}

/// Keeps digits, `.` and the K/M/B magnitude suffixes; anything else is
/// dropped. Missing or fully stripped input becomes `"0"`.
#[must_use]
pub fn normalize_count(raw: Option<&str>) -> String {
    let kept: String = raw
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(*c, '.' | 'k' | 'K' | 'm' | 'M' | 'b' | 'B'))
        .collect();
    if kept.is_empty() {
        "0".to_string()
    } else {
        kept
    }
}

/// Extracts the profile header from `page`.
///
/// Returns `None` when the URL is not a profile page or when the display
/// name or handle cannot be resolved. Every other field falls back to a
/// default.
#[must_use]
pub fn extract_profile(page: &PageSnapshot) -> Option<ProfileRecord> {
    if profile_segment(&page.url).is_none() {
        tracing::debug!(url = %page.url, "not a profile page");
        return None;
    }
    let url = Url::parse(&page.url).ok();
    let document = page.parse();
    extract_from_document(&document, url.as_ref(), &page.url)
}

fn extract_from_document(
    document: &Html,
    url: Option<&Url>,
    source_url: &str,
) -> Option<ProfileRecord> {
    let root = document.root_element();

    let display_name = first_match(NAME_LOOKUPS, root, url, &any_value).unwrap_or_default();
    let handle = first_match(HANDLE_LOOKUPS, root, url, &not_keyboard_noise)
        .and_then(|raw| normalize_handle(&raw))
        .unwrap_or_default();

    if display_name.is_empty() || handle.is_empty() {
        tracing::info!(
            url = source_url,
            has_name = !display_name.is_empty(),
            has_handle = !handle.is_empty(),
            "required profile fields not found"
        );
        return None;
    }

    let avatar_url = first_match(AVATAR_LOOKUPS, root, url, &any_value).unwrap_or_default();
    let bio = first_match(BIO_LOOKUPS, root, url, &any_value)
        .unwrap_or_else(|| ProfileRecord::DEFAULT_BIO.to_string());
    let followers = first_match(FOLLOWERS_LOOKUPS, root, url, &any_value);
    let following = first_match(FOLLOWING_LOOKUPS, root, url, &any_value);

    let profile = ProfileRecord {
        display_name,
        handle,
        avatar_url,
        bio,
        follower_count: normalize_count(followers.as_deref()),
        following_count: normalize_count(following.as_deref()),
        source_url: source_url.to_string(),
        extracted_at: Utc::now(),
    };
    tracing::debug!(handle = %profile.handle, "profile extracted");
    Some(profile)
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
