use super::*;
use crate::page::MemoryPage;

const PROFILE_URL: &str = "https://x.com/janedoe";

struct PostFixture<'a> {
    id: u64,
    author: &'a str,
    text: &'a str,
    datetime: &'a str,
    context: Option<&'a str>,
    extra: &'a str,
}

impl<'a> PostFixture<'a> {
    fn new(id: u64, text: &'a str, datetime: &'a str) -> Self {
        Self {
            id,
            author: "janedoe",
            text,
            datetime,
            context: None,
            extra: "",
        }
    }

    fn author(mut self, author: &'a str) -> Self {
        self.author = author;
        self
    }

    fn context(mut self, context: &'a str) -> Self {
        self.context = Some(context);
        self
    }

    fn extra(mut self, extra: &'a str) -> Self {
        self.extra = extra;
        self
    }

    fn render(&self) -> String {
        let context = self
            .context
            .map(|c| format!(r#"<div data-testid="socialContext">{c}</div>"#))
            .unwrap_or_default();
        format!(
            r#"<div data-testid="cellInnerDiv"><article data-testid="tweet">
                 {context}
                 <div data-testid="User-Name"><a role="link" href="/{author}">{author}</a></div>
                 <a href="/{author}/status/{id}"><time datetime="{datetime}">t</time></a>
                 <div data-testid="tweetText">{text}</div>
                 {extra}
               </article></div>"#,
            author = self.author,
            id = self.id,
            datetime = self.datetime,
            text = self.text,
            extra = self.extra,
        )
    }
}

fn feed(posts: &[PostFixture<'_>]) -> String {
    let body: String = posts.iter().map(PostFixture::render).collect();
    format!(r#"<html><body><main role="main">{body}</main></body></html>"#)
}

fn collector() -> PostCollector {
    PostCollector::new(Duration::from_millis(2_000))
}

struct PanickingPage;

impl Page for PanickingPage {
    fn snapshot(&self) -> Result<PageSnapshot, ScraperError> {
        panic!("document access panicked");
    }

    fn observe(
        &self,
        target: crate::page::ObserveTarget,
    ) -> Result<crate::page::MutationStream, ScraperError> {
        Err(ScraperError::TargetUnavailable {
            target: target.to_string(),
        })
    }
}

struct BrokenPage;

impl Page for BrokenPage {
    fn snapshot(&self) -> Result<PageSnapshot, ScraperError> {
        Err(ScraperError::PageUnavailable("document detached".to_string()))
    }

    fn observe(
        &self,
        target: crate::page::ObserveTarget,
    ) -> Result<crate::page::MutationStream, ScraperError> {
        Err(ScraperError::TargetUnavailable {
            target: target.to_string(),
        })
    }
}

#[test]
fn single_post_with_like_label() {
    let page = MemoryPage::new(
        PROFILE_URL,
        feed(&[PostFixture::new(1, "Hello world", "2024-01-01T00:00:00Z")
            .extra(r#"<button data-testid="like" aria-label="12 Likes. Like"></button>"#)]),
    );
    let mut collector = collector();
    let snapshot = collector.scan(&page);

    assert!(!snapshot.is_error());
    assert_eq!(collector.count(), 1);
    assert_eq!(snapshot.total_found, 1);
    assert_eq!(snapshot.posts[0].text, "Hello world");
    assert_eq!(snapshot.posts[0].metrics.like_count, 12);
    assert_eq!(snapshot.statistics.avg_likes, 12);
}

#[test]
fn missing_reply_control_counts_zero_and_keeps_post() {
    let page = MemoryPage::new(
        PROFILE_URL,
        feed(&[PostFixture::new(1, "No replies here", "2024-01-01T00:00:00Z")
            .extra(r#"<button data-testid="retweet" aria-label="3 reposts. Repost"></button>"#)]),
    );
    let snapshot = collector().scan(&page);
    assert_eq!(snapshot.posts.len(), 1);
    assert_eq!(snapshot.posts[0].metrics.reply_count, 0);
    assert_eq!(snapshot.posts[0].metrics.repost_count, 3);
}

#[test]
fn repeat_scan_within_cooldown_reuses_snapshot_without_reading() {
    let page = MemoryPage::new(
        PROFILE_URL,
        feed(&[PostFixture::new(1, "Hello world", "2024-01-01T00:00:00Z")]),
    );
    let mut collector = collector();
    let first = collector.scan(&page);
    let second = collector.scan(&page);

    assert_eq!(first, second);
    assert_eq!(page.reads(), 1);
}

#[tokio::test(start_paused = true)]
async fn scan_after_cooldown_reads_again_and_grows() {
    let page = MemoryPage::new(
        PROFILE_URL,
        feed(&[PostFixture::new(1, "First post", "2024-01-01T00:00:00Z")]),
    );
    let mut collector = collector();
    assert_eq!(collector.scan(&page).total_found, 1);

    page.set_html(feed(&[
        PostFixture::new(1, "First post", "2024-01-01T00:00:00Z"),
        PostFixture::new(2, "Second post", "2024-01-02T00:00:00Z"),
    ]));

    tokio::time::advance(Duration::from_millis(1_999)).await;
    assert_eq!(collector.scan(&page).total_found, 1);
    assert_eq!(page.reads(), 1);

    tokio::time::advance(Duration::from_millis(1)).await;
    assert_eq!(collector.scan(&page).total_found, 2);
    assert_eq!(page.reads(), 2);
}

#[tokio::test(start_paused = true)]
async fn collection_survives_posts_leaving_the_document() {
    let page = MemoryPage::new(
        PROFILE_URL,
        feed(&[PostFixture::new(1, "Scrolled away", "2024-01-01T00:00:00Z")]),
    );
    let mut collector = collector();
    collector.scan(&page);

    page.set_html(feed(&[PostFixture::new(2, "Newly visible", "2024-01-02T00:00:00Z")]));
    tokio::time::advance(Duration::from_millis(2_000)).await;
    let snapshot = collector.scan(&page);

    assert_eq!(snapshot.total_found, 2);
}

#[test]
fn duplicate_permalinks_collapse_to_one_record() {
    let page = MemoryPage::new(
        PROFILE_URL,
        feed(&[
            PostFixture::new(5, "Same post", "2024-01-01T00:00:00Z"),
            PostFixture::new(5, "Same post", "2024-01-01T00:00:00Z"),
        ]),
    );
    let snapshot = collector().scan(&page);
    assert_eq!(snapshot.total_found, 1);
}

#[test]
fn posts_by_other_authors_are_excluded() {
    let page = MemoryPage::new(
        PROFILE_URL,
        feed(&[
            PostFixture::new(1, "Mine", "2024-01-01T00:00:00Z"),
            PostFixture::new(2, "Theirs", "2024-01-02T00:00:00Z").author("someone"),
        ]),
    );
    let snapshot = collector().scan(&page);
    assert_eq!(snapshot.total_found, 1);
    assert!(snapshot.posts.iter().all(|p| p.author_handle == "@janedoe"));
}

#[test]
fn owner_match_ignores_case() {
    let page = MemoryPage::new(
        "https://x.com/JaneDoe",
        feed(&[PostFixture::new(1, "Mixed case", "2024-01-01T00:00:00Z").author("JANEDOE")]),
    );
    assert_eq!(collector().scan(&page).total_found, 1);
}

#[test]
fn reposts_replies_and_quotes_are_excluded() {
    let page = MemoryPage::new(
        PROFILE_URL,
        feed(&[
            PostFixture::new(1, "Reposted thing", "2024-01-01T00:00:00Z")
                .context("Jane Doe reposted"),
            PostFixture::new(2, "A reply to bob", "2024-01-01T00:00:00Z")
                .context("Replying to @bob"),
            PostFixture::new(3, "Look at this", "2024-01-01T00:00:00Z")
                .extra(r#"<div data-testid="quoteTweet">quoted</div>"#),
            PostFixture::new(4, "Plain original", "2024-01-01T00:00:00Z"),
        ]),
    );
    let snapshot = collector().scan(&page);
    assert_eq!(snapshot.total_found, 1);
    assert_eq!(snapshot.posts[0].id, "4");
}

#[test]
fn pinned_first_then_newest_first() {
    let page = MemoryPage::new(
        PROFILE_URL,
        feed(&[
            PostFixture::new(1, "Oldest", "2024-01-01T00:00:00Z"),
            PostFixture::new(2, "Newest", "2024-03-01T00:00:00Z"),
            PostFixture::new(3, "Pinned but old", "2023-01-01T00:00:00Z").context("Pinned"),
            PostFixture::new(4, "Middle", "2024-02-01T00:00:00Z"),
        ]),
    );
    let snapshot = collector().scan(&page);
    let ids: Vec<&str> = snapshot.posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["3", "2", "4", "1"]);
    assert_eq!(snapshot.statistics.pinned, 1);
    assert_eq!(snapshot.statistics.originals, 3);
}

#[test]
fn reset_then_scan_rebuilds_same_collection() {
    let page = MemoryPage::new(
        PROFILE_URL,
        feed(&[
            PostFixture::new(1, "One post", "2024-01-01T00:00:00Z"),
            PostFixture::new(2, "Two post", "2024-01-02T00:00:00Z"),
        ]),
    );
    let mut collector = collector();
    let before = collector.scan(&page).total_found;

    collector.reset();
    assert_eq!(collector.count(), 0);
    assert_eq!(collector.snapshot().total_found, 0);

    let after = collector.scan(&page).total_found;
    assert_eq!(before, after);
    assert_eq!(page.reads(), 2);
}

#[test]
fn page_without_handle_reports_invalid_profile_url() {
    let page = MemoryPage::new(
        "https://x.com/",
        feed(&[PostFixture::new(1, "Hello world", "2024-01-01T00:00:00Z")]),
    );
    let mut collector = collector();
    let snapshot = collector.scan(&page);

    assert!(snapshot.posts.is_empty());
    assert!(snapshot
        .error
        .as_deref()
        .is_some_and(|e| e.starts_with("Invalid profile URL")));
    assert!(!collector.is_running());
}

#[test]
fn unreadable_page_clears_running_and_reports_error() {
    let mut collector = collector();
    let snapshot = collector.scan(&BrokenPage);

    assert!(snapshot.is_error());
    assert_eq!(snapshot.total_found, 0);
    assert!(!collector.is_running());
}

#[test]
fn malformed_elements_do_not_abort_the_scan() {
    let html = format!(
        r#"<html><body><main role="main">
             <article data-testid="tweet"><div data-testid="tweetText">no link</div></article>
             {}
           </main></body></html>"#,
        PostFixture::new(9, "Still collected", "2024-01-01T00:00:00Z").render()
    );
    let page = MemoryPage::new(PROFILE_URL, html);
    let snapshot = collector().scan(&page);
    assert_eq!(snapshot.total_found, 1);
}

#[test]
fn collection_state_tracks_seen_permalinks() {
    let page = MemoryPage::new(
        PROFILE_URL,
        feed(&[PostFixture::new(1, "Hello world", "2024-01-01T00:00:00Z")]),
    );
    let mut state = CollectionState::default();
    assert!(state.is_empty());

    let snapshot = collector().scan(&page);
    state.insert(snapshot.posts[0].clone());
    assert_eq!(state.len(), 1);
    assert!(state.has_seen("https://x.com/janedoe/status/1"));
}

#[tokio::test(start_paused = true)]
async fn same_id_under_new_permalink_keeps_first_record() {
    let page = MemoryPage::new(
        PROFILE_URL,
        feed(&[PostFixture::new(42, "Original text", "2024-01-01T00:00:00Z")]),
    );
    let mut collector = collector();
    collector.scan(&page);

    page.set_html(
        feed(&[PostFixture::new(42, "Overwritten text", "2024-01-01T00:00:00Z")]).replace(
            r#"href="/janedoe/status/42""#,
            r#"href="/janedoe/status/42?s=20""#,
        ),
    );
    tokio::time::advance(Duration::from_millis(2_001)).await;
    let snapshot = collector.scan(&page);

    assert_eq!(page.reads(), 2);
    assert_eq!(snapshot.total_found, 1);
    assert_eq!(snapshot.posts[0].text, "Original text");
    assert_eq!(
        snapshot.posts[0].permalink_url,
        "https://x.com/janedoe/status/42"
    );
}

#[test]
fn insert_never_replaces_an_existing_id() {
    let page = MemoryPage::new(
        PROFILE_URL,
        feed(&[PostFixture::new(7, "Kept text", "2024-01-01T00:00:00Z")]),
    );
    let first = collector().scan(&page).posts[0].clone();
    let mut replacement = first.clone();
    replacement.text = "Replacement".to_string();

    let mut state = CollectionState::default();
    state.insert(first);
    state.insert(replacement);

    assert_eq!(state.len(), 1);
    assert!(state.contains_id("7"));
    let snapshot = state.to_snapshot(Utc::now());
    assert_eq!(snapshot.posts[0].text, "Kept text");
}

#[tokio::test(start_paused = true)]
async fn panic_during_scan_does_not_leave_collector_running() {
    let shared = collector().shared();
    let panicked = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        lock(&shared).scan(&PanickingPage)
    }));
    assert!(panicked.is_err());

    let mut collector = lock(&shared);
    assert!(!collector.is_running());

    tokio::time::advance(Duration::from_millis(2_001)).await;
    let page = MemoryPage::new(
        PROFILE_URL,
        feed(&[PostFixture::new(1, "After the fault", "2024-01-01T00:00:00Z")]),
    );
    let snapshot = collector.scan(&page);
    assert_eq!(page.reads(), 1);
    assert_eq!(snapshot.total_found, 1);
}
