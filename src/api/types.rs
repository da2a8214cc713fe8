use serde::{Deserialize, Serialize};

use crate::state::PreferencesDoc;

// ============================================================================
// Content Types
// ============================================================================

/// A news article as returned by `GET /news/{category}`.
///
/// Articles are keyed by `url`, which is unique per source. All other fields
/// are display data and may be absent or empty in degraded feeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source: Option<NewsSource>,
    #[serde(default, rename = "publishedAt", skip_serializing_if = "Option::is_none")]
    pub published_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Source attribution nested inside a news article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsSource {
    #[serde(default)]
    pub name: Option<String>,
}

/// A movie as returned by `GET /movies` (TMDB popular-movies shape).
///
/// Movies are keyed by their numeric `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
}

impl Movie {
    /// Canonical link for a movie, used to give favorites a common `url`
    /// display field across both content kinds.
    pub fn canonical_url(&self) -> String {
        format!("https://www.themoviedb.org/movie/{}", self.id)
    }
}

// ============================================================================
// Auth Types
// ============================================================================

/// Response body of `POST /auth/login` and `POST /auth/register`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: AuthUser,
}

/// The user object embedded in an auth response.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub preferences: Option<PreferencesDoc>,
}

// ============================================================================
// Preference Sync Types
// ============================================================================

/// Wrapper used by `GET /user/preferences` and as the `PUT` request body.
///
/// The server mirrors the locally persisted aggregate, so the inner document
/// is the same [`PreferencesDoc`] the storage layer serializes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferencesEnvelope {
    #[serde(default)]
    pub preferences: PreferencesDoc,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_deserializes_with_missing_optionals() {
        let json = r#"{"url": "https://example.com/a", "title": "A"}"#;
        let article: NewsArticle = serde_json::from_str(json).unwrap();
        assert_eq!(article.url, "https://example.com/a");
        assert_eq!(article.title, "A");
        assert!(article.description.is_none());
        assert!(article.source.is_none());
    }

    #[test]
    fn test_article_source_name() {
        let json = r#"{"url": "https://example.com/a", "title": "A", "source": {"name": "Example Wire"}}"#;
        let article: NewsArticle = serde_json::from_str(json).unwrap();
        assert_eq!(
            article.source.and_then(|s| s.name).as_deref(),
            Some("Example Wire")
        );
    }

    #[test]
    fn test_movie_deserializes_tmdb_shape() {
        let json = r#"{
            "id": 2,
            "title": "Dune",
            "overview": "Desert planet.",
            "poster_path": "/d5NXSklXo0qyIYkgV94XAgMIckC.jpg",
            "vote_average": 8.0,
            "release_date": "2021-10-22"
        }"#;
        let movie: Movie = serde_json::from_str(json).unwrap();
        assert_eq!(movie.id, 2);
        assert_eq!(movie.title, "Dune");
        assert_eq!(movie.vote_average, 8.0);
    }

    #[test]
    fn test_movie_canonical_url() {
        let movie = Movie {
            id: 42,
            title: "Test".into(),
            overview: String::new(),
            poster_path: None,
            vote_average: 0.0,
        };
        assert_eq!(movie.canonical_url(), "https://www.themoviedb.org/movie/42");
    }

    #[test]
    fn test_preferences_envelope_round_trip() {
        let json = r#"{"preferences": {"categories": ["technology"], "darkMode": true, "favorites": []}}"#;
        let envelope: PreferencesEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.preferences.categories, vec!["technology"]);
        assert!(envelope.preferences.dark_mode);

        let out = serde_json::to_value(&envelope).unwrap();
        assert_eq!(out["preferences"]["darkMode"], true);
    }
}
