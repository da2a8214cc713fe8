//! Process-wide client state container.
//!
//! All mutation goes through [`Dashboard`] methods (no field-level external
//! mutation), preserving the favorites identity-uniqueness and ordering
//! invariants. Favorites and preferences are flushed to the persistence
//! gateway before each mutating call returns; feed state is never persisted
//! (always refetched on load).
mod drag;
mod favorites;
mod feed;
mod preferences;

pub use drag::{DragState, DropOutcome};
pub use favorites::{article_identity, movie_identity, FavoriteItem, FavoritesList};
pub use feed::{search_articles, trending, FeedState, FeedStatus, FetchToken};
pub use preferences::PreferencesState;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, Movie, NewsArticle};
use crate::storage::Database;

/// Default feed error messages when a failure carries no usable text.
const NEWS_FETCH_FALLBACK: &str = "Failed to fetch news";
const MOVIES_FETCH_FALLBACK: &str = "Failed to fetch movies";

// ============================================================================
// Persisted Aggregate
// ============================================================================

/// The preferences aggregate as persisted and as mirrored by the server:
/// `{ "categories": [...], "darkMode": bool, "favorites": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferencesDoc {
    pub categories: Vec<String>,
    pub dark_mode: bool,
    pub favorites: Vec<FavoriteItem>,
}

/// Top-level persisted shape: the aggregate under a `preferences` key.
/// Only this is durable; feed state never is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    #[serde(default)]
    pub preferences: PreferencesDoc,
}

// ============================================================================
// Dashboard
// ============================================================================

/// Owns the favorites list, preferences, both feed states, and the drag
/// gesture machine. Lifecycle: [`Dashboard::init`] rehydrates from the
/// persistence gateway; [`Dashboard::flush`] writes the aggregate on
/// shutdown (mutating methods also flush eagerly).
pub struct Dashboard {
    db: Database,
    favorites: FavoritesList,
    preferences: PreferencesState,
    news: FeedState<NewsArticle>,
    movies: FeedState<Movie>,
    drag: DragState,
}

impl Dashboard {
    /// Rehydrate state from the persisted snapshot, or start fresh when no
    /// snapshot exists (or it is corrupt; the storage layer logs and
    /// returns `None` rather than failing startup).
    pub async fn init(db: Database) -> Result<Self> {
        let snapshot = db
            .load_snapshot()
            .await
            .context("Failed to load persisted state")?
            .unwrap_or_default();

        let mut favorites = FavoritesList::new();
        favorites.replace_all(snapshot.preferences.favorites);

        Ok(Self {
            db,
            favorites,
            preferences: PreferencesState::from_parts(
                snapshot.preferences.categories,
                snapshot.preferences.dark_mode,
            ),
            news: FeedState::new(),
            movies: FeedState::new(),
            drag: DragState::default(),
        })
    }

    // ========================================================================
    // Read Access
    // ========================================================================

    pub fn favorites(&self) -> &FavoritesList {
        &self.favorites
    }

    pub fn preferences(&self) -> &PreferencesState {
        &self.preferences
    }

    pub fn news(&self) -> &FeedState<NewsArticle> {
        &self.news
    }

    pub fn movies(&self) -> &FeedState<Movie> {
        &self.movies
    }

    pub fn drag(&self) -> &DragState {
        &self.drag
    }

    /// The persistable aggregate built from current state.
    pub fn to_doc(&self) -> PreferencesDoc {
        PreferencesDoc {
            categories: self.preferences.categories().to_vec(),
            dark_mode: self.preferences.dark_mode(),
            favorites: self.favorites.items().to_vec(),
        }
    }

    // ========================================================================
    // Favorites Mutations
    // ========================================================================

    /// Idempotent add; persists only when the collection actually changed.
    pub async fn add_favorite(&mut self, item: FavoriteItem) -> Result<bool> {
        if self.favorites.add(item) {
            self.flush().await?;
            return Ok(true);
        }
        Ok(false)
    }

    /// No-op-safe remove by identity.
    pub async fn remove_favorite(&mut self, identity: &str) -> Result<bool> {
        if self.favorites.remove(identity) {
            self.flush().await?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Array-move by index.
    pub async fn move_favorite(&mut self, from: usize, to: usize) -> Result<bool> {
        if self.favorites.move_item(from, to) {
            self.flush().await?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Begin a drag gesture on the favorite with the given identity.
    pub fn begin_drag(&mut self, identity: impl Into<String>) {
        self.drag.begin(identity);
    }

    /// Abort the active drag gesture, leaving favorites untouched.
    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    /// Drop the dragged favorite onto `target`, persisting when a reorder
    /// actually happened. Cancelled drops are not errors.
    pub async fn drop_favorite(&mut self, target: &str) -> Result<DropOutcome> {
        let outcome = self.drag.drop_on(&mut self.favorites, target);
        if let DropOutcome::Moved { from, to } = outcome {
            tracing::debug!(from = from, to = to, "Favorite reordered via drag");
            self.flush().await?;
        }
        Ok(outcome)
    }

    // ========================================================================
    // Preferences Mutations
    // ========================================================================

    pub async fn set_categories(&mut self, categories: Vec<String>) -> Result<()> {
        self.preferences.set_categories(categories);
        self.flush().await
    }

    /// Flip dark mode, returning the new value.
    pub async fn toggle_dark_mode(&mut self) -> Result<bool> {
        let on = self.preferences.toggle_dark_mode();
        self.flush().await?;
        Ok(on)
    }

    pub async fn set_dark_mode(&mut self, on: bool) -> Result<()> {
        self.preferences.set_dark_mode(on);
        self.flush().await
    }

    // ========================================================================
    // Feed Refresh
    // ========================================================================

    /// Fetch the news feed for a category and apply the result.
    pub async fn refresh_news(&mut self, api: &ApiClient, category: &str) {
        let token = self.news.begin_fetch();
        match api.fetch_news(category).await {
            Ok(articles) => {
                tracing::info!(category = %category, count = articles.len(), "News feed loaded");
                self.news.complete(token, articles);
            }
            Err(e) => {
                let message = e.feed_message(NEWS_FETCH_FALLBACK);
                tracing::warn!(category = %category, error = %message, "News fetch failed");
                self.news.fail(token, message);
            }
        }
    }

    /// Fetch the popular-movies feed and apply the result.
    pub async fn refresh_movies(&mut self, api: &ApiClient) {
        let token = self.movies.begin_fetch();
        match api.fetch_movies().await {
            Ok(movies) => {
                tracing::info!(count = movies.len(), "Movies feed loaded");
                self.movies.complete(token, movies);
            }
            Err(e) => {
                let message = e.feed_message(MOVIES_FETCH_FALLBACK);
                tracing::warn!(error = %message, "Movies fetch failed");
                self.movies.fail(token, message);
            }
        }
    }

    /// Refresh both feeds concurrently. Each feed resolves independently;
    /// one failing does not affect the other.
    pub async fn refresh_all(&mut self, api: &ApiClient, category: &str) {
        let news_token = self.news.begin_fetch();
        let movies_token = self.movies.begin_fetch();

        let (news_result, movies_result) =
            futures::join!(api.fetch_news(category), api.fetch_movies());

        match news_result {
            Ok(articles) => {
                self.news.complete(news_token, articles);
            }
            Err(e) => {
                self.news.fail(news_token, e.feed_message(NEWS_FETCH_FALLBACK));
            }
        }
        match movies_result {
            Ok(movies) => {
                self.movies.complete(movies_token, movies);
            }
            Err(e) => {
                self.movies
                    .fail(movies_token, e.feed_message(MOVIES_FETCH_FALLBACK));
            }
        }
    }

    // ========================================================================
    // Server Sync
    // ========================================================================

    /// Push the local aggregate to `PUT /user/preferences`.
    pub async fn push_preferences(&self, api: &ApiClient) -> Result<()> {
        api.put_preferences(&self.to_doc())
            .await
            .context("Failed to push preferences to server")?;
        tracing::info!(favorites = self.favorites.len(), "Preferences pushed to server");
        Ok(())
    }

    /// Replace local state with the server's aggregate and persist it.
    pub async fn pull_preferences(&mut self, api: &ApiClient) -> Result<()> {
        let doc = api
            .get_preferences()
            .await
            .context("Failed to pull preferences from server")?;
        self.apply_doc(doc);
        self.flush().await?;
        tracing::info!(favorites = self.favorites.len(), "Preferences pulled from server");
        Ok(())
    }

    /// Apply a preferences aggregate (server pull or registration response)
    /// without persisting.
    pub fn apply_doc(&mut self, doc: PreferencesDoc) {
        self.favorites.replace_all(doc.favorites);
        self.preferences = PreferencesState::from_parts(doc.categories, doc.dark_mode);
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Write the aggregate through the persistence gateway.
    pub async fn flush(&self) -> Result<()> {
        self.db
            .save_snapshot(&DashboardSnapshot {
                preferences: self.to_doc(),
            })
            .await
            .context("Failed to persist dashboard state")
    }
}

// ============================================================================
// Tests
// ============================================================================
