//! The favorites collection: an ordered, identity-deduplicated list of
//! content items the user has pinned to the dashboard.
//!
//! Identity is namespaced per content kind (`movie-{id}` / `news-{url}`) so
//! a movie id and a news URL can never collide. Order is significant: it is
//! the display order and the target of drag-and-drop reordering.
use serde::{Deserialize, Serialize};

use crate::api::{Movie, NewsArticle};

// ============================================================================
// FavoriteItem
// ============================================================================

/// A favorited content item, normalized to a common display projection.
///
/// Both variants carry `title`, `description`, and `url`. Movies keep their
/// numeric id (the identity key) and get a synthetic canonical `url` plus a
/// `description` mapped from the movie overview at the conversion boundary,
/// so display code never branches on the kind.
///
/// Serializes flat with a `type` discriminator, matching the wire shape the
/// server stores: `{ "type": "movie", "id": 1, "title": ..., ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FavoriteItem {
    Movie {
        id: u64,
        title: String,
        description: String,
        url: String,
    },
    News {
        url: String,
        title: String,
        description: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_name: Option<String>,
    },
}

impl FavoriteItem {
    /// Stable, collision-resistant identity: `movie-{id}` or `news-{url}`.
    ///
    /// Pure and total: the enum shape guarantees the key field exists, so
    /// there is no malformed-input case.
    pub fn identity(&self) -> String {
        match self {
            FavoriteItem::Movie { id, .. } => format!("movie-{}", id),
            FavoriteItem::News { url, .. } => format!("news-{}", url),
        }
    }

    /// Display title.
    pub fn title(&self) -> &str {
        match self {
            FavoriteItem::Movie { title, .. } | FavoriteItem::News { title, .. } => title,
        }
    }

    /// Display description.
    pub fn description(&self) -> &str {
        match self {
            FavoriteItem::Movie { description, .. } | FavoriteItem::News { description, .. } => {
                description
            }
        }
    }

    /// Display link: canonical TMDB link for movies, the article URL for news.
    pub fn url(&self) -> &str {
        match self {
            FavoriteItem::Movie { url, .. } | FavoriteItem::News { url, .. } => url,
        }
    }

    /// Normalize a movie from the feed into the favorite projection.
    pub fn from_movie(movie: &Movie) -> Self {
        FavoriteItem::Movie {
            id: movie.id,
            title: movie.title.clone(),
            description: movie.overview.clone(),
            url: movie.canonical_url(),
        }
    }

    /// Normalize a news article from the feed into the favorite projection.
    pub fn from_article(article: &NewsArticle) -> Self {
        FavoriteItem::News {
            url: article.url.clone(),
            title: article.title.clone(),
            description: article.description.clone().unwrap_or_default(),
            source_name: article.source.as_ref().and_then(|s| s.name.clone()),
        }
    }
}

/// Identity a feed movie would have if favorited.
pub fn movie_identity(movie: &Movie) -> String {
    format!("movie-{}", movie.id)
}

/// Identity a feed article would have if favorited.
pub fn article_identity(article: &NewsArticle) -> String {
    format!("news-{}", article.url)
}

// ============================================================================
// FavoritesList
// ============================================================================

/// Ordered collection of favorites, set-like on identity and list-like on
/// order. Mutations are plain in-memory operations; the owning
/// [`Dashboard`](crate::state::Dashboard) persists after each one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoritesList {
    items: Vec<FavoriteItem>,
}

impl FavoritesList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `item` iff no existing element shares its identity.
    ///
    /// Returns `true` if the item was added. Adding an already-favorited item
    /// is an idempotent no-op, not an error.
    pub fn add(&mut self, item: FavoriteItem) -> bool {
        let identity = item.identity();
        if self.contains(&identity) {
            tracing::debug!(identity = %identity, "Favorite already present, ignoring add");
            return false;
        }
        self.items.push(item);
        true
    }

    /// Remove the at-most-one element with the given identity.
    ///
    /// Returns `true` if something was removed. A missing identity is a
    /// silent no-op, expected during retried or duplicate removes.
    pub fn remove(&mut self, identity: &str) -> bool {
        match self.position_of(identity) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Array-move: remove the element at `from` and insert it at `to`,
    /// shifting intervening elements by one.
    ///
    /// Count and membership are unchanged. Out-of-bounds indices or
    /// `from == to` are no-ops returning `false`.
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        let len = self.items.len();
        if from >= len || to >= len || from == to {
            return false;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        true
    }

    /// Unconditionally replace the collection, e.g. for rehydration from a
    /// persisted snapshot or a server pull.
    ///
    /// The input is trusted to satisfy identity uniqueness, but duplicates
    /// are dropped defensively, retaining the first occurrence.
    pub fn replace_all(&mut self, items: Vec<FavoriteItem>) {
        let mut seen: Vec<String> = Vec::with_capacity(items.len());
        let mut deduped = Vec::with_capacity(items.len());
        for item in items {
            let identity = item.identity();
            if seen.contains(&identity) {
                tracing::warn!(identity = %identity, "Duplicate favorite in snapshot, dropping");
                continue;
            }
            seen.push(identity);
            deduped.push(item);
        }
        self.items = deduped;
    }

    /// Position of the element with the given identity, if present.
    /// O(n) scan; collections are tens of items at most.
    pub fn position_of(&self, identity: &str) -> Option<usize> {
        self.items.iter().position(|item| item.identity() == identity)
    }

    /// Whether an element with the given identity exists.
    pub fn contains(&self, identity: &str) -> bool {
        self.position_of(identity).is_some()
    }

    /// Whether the given item is already favorited (same identity).
    pub fn is_favorited(&self, item: &FavoriteItem) -> bool {
        self.contains(&item.identity())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[FavoriteItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FavoriteItem> {
        self.items.iter()
    }

    pub fn into_items(self) -> Vec<FavoriteItem> {
        self.items
    }
}

// ============================================================================
// Tests
// ============================================================================
