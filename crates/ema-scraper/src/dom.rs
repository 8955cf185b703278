//! Small query helpers over a parsed document.
//!
//! Everything here degrades to `None`/empty on a miss; callers decide what
//! a default looks like.

use scraper::{ElementRef, Selector};
use url::Url;

/// Parses a selector that is known at compile time.
///
/// # Panics
///
/// Panics if `css` is not a valid selector. Only call with literals.
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e:?}"))
}

/// Trims and collapses every whitespace run (newlines included) to one space.
pub(crate) fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Concatenated text content of an element, like `textContent`.
pub(crate) fn text_content(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// First descendant of `scope` matching `css`. Invalid selectors match nothing.
pub(crate) fn query<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    scope.select(&selector).next()
}

/// Non-empty value of `attr` on `element`, trimmed.
pub(crate) fn attr<'a>(element: ElementRef<'a>, attr: &str) -> Option<&'a str> {
    element
        .value()
        .attr(attr)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Path segments of a URL, empty segments removed.
fn segments(url: &Url) -> Vec<&str> {
    url.path_segments()
        .map(|segs| segs.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}

/// The single path segment of a profile-page URL (`/<name>` or `/<name>/`).
///
/// Returns `None` for the root, for deeper paths such as `/<name>/status/1`,
/// and for URLs that fail to parse.
pub(crate) fn profile_segment(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let path = parsed.path();
    let trimmed = path.strip_prefix('/')?;
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    if trimmed.is_empty() || trimmed.contains('/') {
        return None;
    }
    Some(trimmed.to_string())
}

/// Lower-cased first path segment of the page URL: the handle of the profile
/// whose feed is being viewed.
pub(crate) fn owner_handle(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    segments(&parsed).first().map(|s| s.to_lowercase())
}

/// Lower-cased first path segment of an author link, absolute or relative.
pub(crate) fn handle_from_href(base: &Url, href: &str) -> Option<String> {
    let resolved = base.join(href).ok()?;
    segments(&resolved)
        .first()
        .map(|s| s.to_lowercase())
        .filter(|s| !s.is_empty())
}
