//! Async-fetch state containers for the content feeds.
//!
//! Each feed (news, movies) is an independent `FeedState<T>` moving through
//! `Idle -> Loading -> {Succeeded, Failed}` and restartable from either
//! terminal state. A previously fetched list is preserved across `Loading`
//! and `Failed` so the UI can keep showing stale-but-available content.
use crate::api::NewsArticle;

/// Fetch lifecycle status of one feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeedStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// Generation token issued by [`FeedState::begin_fetch`]. A completion or
/// failure carrying a stale token is dropped, which fences off the
/// stale-overwrites-fresh race between overlapping fetches.
pub type FetchToken = u64;

/// State container for one content feed.
#[derive(Debug, Clone)]
pub struct FeedState<T> {
    items: Vec<T>,
    status: FeedStatus,
    error: Option<String>,
    generation: FetchToken,
}

impl<T> Default for FeedState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            status: FeedStatus::Idle,
            error: None,
            generation: 0,
        }
    }
}

impl<T> FeedState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transition into `Loading`: clears the error, keeps the previous item
    /// list, and issues a fresh generation token for the fetch in flight.
    pub fn begin_fetch(&mut self) -> FetchToken {
        self.status = FeedStatus::Loading;
        self.error = None;
        self.generation += 1;
        self.generation
    }

    /// Apply a successful fetch: full replace of the item list, no merge.
    ///
    /// Returns `false` (and leaves the state untouched) if `token` is stale,
    /// meaning a newer fetch has started since this one was issued.
    pub fn complete(&mut self, token: FetchToken, items: Vec<T>) -> bool {
        if token != self.generation {
            tracing::debug!(token = token, current = self.generation, "Dropping stale fetch result");
            return false;
        }
        self.items = items;
        self.status = FeedStatus::Succeeded;
        self.error = None;
        true
    }

    /// Apply a failed fetch: stores the message, preserves the previous list.
    ///
    /// Returns `false` if `token` is stale.
    pub fn fail(&mut self, token: FetchToken, message: impl Into<String>) -> bool {
        if token != self.generation {
            tracing::debug!(token = token, current = self.generation, "Dropping stale fetch failure");
            return false;
        }
        self.status = FeedStatus::Failed;
        self.error = Some(message.into());
        true
    }

    pub fn status(&self) -> FeedStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }
}

// ============================================================================
// Client-side Filters
// ============================================================================

/// "Trending" is just the head of the already-fetched list, no ranking.
pub fn trending(articles: &[NewsArticle], limit: usize) -> &[NewsArticle] {
    &articles[..articles.len().min(limit)]
}

/// Case-insensitive substring filter over title and description.
pub fn search_articles<'a>(articles: &'a [NewsArticle], query: &str) -> Vec<&'a NewsArticle> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return articles.iter().collect();
    }
    articles
        .iter()
        .filter(|article| {
            let haystack = format!(
                "{} {}",
                article.title,
                article.description.as_deref().unwrap_or("")
            )
            .to_lowercase();
            haystack.contains(&needle)
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn article(url: &str, title: &str, description: &str) -> NewsArticle {
        NewsArticle {
            url: url.to_string(),
            title: title.to_string(),
            description: Some(description.to_string()),
            source: None,
            published_at: None,
        }
    }

    #[test]
    fn test_initial_state_is_idle_and_empty() {
        let feed: FeedState<NewsArticle> = FeedState::new();
        assert_eq!(feed.status(), FeedStatus::Idle);
        assert!(feed.items().is_empty());
        assert!(feed.error().is_none());
    }

    #[test]
    fn test_success_replaces_list_verbatim() {
        let mut feed = FeedState::new();
        let token = feed.begin_fetch();
        assert_eq!(feed.status(), FeedStatus::Loading);

        assert!(feed.complete(token, vec![article("https://a", "A", "")]));
        assert_eq!(feed.status(), FeedStatus::Succeeded);
        assert_eq!(feed.items().len(), 1);

        // Second fetch fully replaces, no merge
        let token = feed.begin_fetch();
        assert!(feed.complete(
            token,
            vec![article("https://b", "B", ""), article("https://c", "C", "")]
        ));
        assert_eq!(feed.items().len(), 2);
        assert_eq!(feed.items()[0].url, "https://b");
    }

    #[test]
    fn test_failure_preserves_previous_list() {
        let mut feed = FeedState::new();
        let token = feed.begin_fetch();
        feed.complete(token, vec![article("https://a", "A", "")]);

        // Idle -> Loading -> Failed("Network error") keeps the prior list
        let token = feed.begin_fetch();
        assert!(feed.fail(token, "Network error"));
        assert_eq!(feed.status(), FeedStatus::Failed);
        assert_eq!(feed.error(), Some("Network error"));
        assert_eq!(feed.items().len(), 1);
    }

    #[test]
    fn test_loading_clears_error_keeps_items() {
        let mut feed = FeedState::new();
        let token = feed.begin_fetch();
        feed.complete(token, vec![article("https://a", "A", "")]);
        let token = feed.begin_fetch();
        feed.fail(token, "Network error");

        feed.begin_fetch();
        assert_eq!(feed.status(), FeedStatus::Loading);
        assert!(feed.error().is_none());
        assert_eq!(feed.items().len(), 1);
    }

    #[test]
    fn test_restartable_from_failed() {
        let mut feed: FeedState<NewsArticle> = FeedState::new();
        let token = feed.begin_fetch();
        feed.fail(token, "boom");

        let token = feed.begin_fetch();
        assert!(feed.complete(token, vec![article("https://a", "A", "")]));
        assert_eq!(feed.status(), FeedStatus::Succeeded);
    }

    #[test]
    fn test_stale_completion_dropped() {
        let mut feed = FeedState::new();
        let old_token = feed.begin_fetch();
        let new_token = feed.begin_fetch(); // overlapping fetch supersedes

        assert!(feed.complete(new_token, vec![article("https://fresh", "Fresh", "")]));
        // Late arrival from the first fetch must not overwrite the fresh list
        assert!(!feed.complete(old_token, vec![article("https://stale", "Stale", "")]));
        assert_eq!(feed.items()[0].url, "https://fresh");
        assert_eq!(feed.status(), FeedStatus::Succeeded);
    }

    #[test]
    fn test_stale_failure_dropped() {
        let mut feed = FeedState::new();
        let old_token = feed.begin_fetch();
        let new_token = feed.begin_fetch();

        feed.complete(new_token, vec![article("https://a", "A", "")]);
        assert!(!feed.fail(old_token, "too late"));
        assert_eq!(feed.status(), FeedStatus::Succeeded);
        assert!(feed.error().is_none());
    }

    #[test]
    fn test_trending_is_head_slice() {
        let articles = vec![
            article("https://a", "A", ""),
            article("https://b", "B", ""),
            article("https://c", "C", ""),
        ];
        assert_eq!(trending(&articles, 2).len(), 2);
        assert_eq!(trending(&articles, 2)[0].url, "https://a");
        assert_eq!(trending(&articles, 10).len(), 3);
    }

    #[test]
    fn test_search_matches_title_and_description_case_insensitive() {
        let articles = vec![
            article("https://a", "Rust 1.80 released", "compiler news"),
            article("https://b", "Quarterly results", "markets climbed on RUST demand"),
            article("https://c", "Weather", "sunny"),
        ];
        let hits = search_articles(&articles, "rust");
        assert_eq!(hits.len(), 2);

        let all = search_articles(&articles, "");
        assert_eq!(all.len(), 3);
    }
}
