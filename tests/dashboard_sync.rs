//! Integration tests for feed refresh and server preference sync,
//! exercising the dashboard against a mocked API server.

use std::time::Duration;

use glance::api::ApiClient;
use glance::state::{Dashboard, FavoriteItem, FeedStatus};
use glance::storage::Database;
use secrecy::SecretString;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn test_dashboard() -> Dashboard {
    let db = Database::open(":memory:").await.unwrap();
    Dashboard::init(db).await.unwrap()
}

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&server.uri(), Duration::from_secs(5), 0, Duration::ZERO).unwrap()
}

fn news_body() -> serde_json::Value {
    serde_json::json!([
        { "url": "https://example.com/a", "title": "A", "description": "alpha" },
        { "url": "https://example.com/b", "title": "B", "description": "beta" }
    ])
}

// ============================================================================
// Feed Refresh Tests
// ============================================================================

#[tokio::test]
async fn test_news_refresh_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/news/general"))
        .respond_with(ResponseTemplate::new(200).set_body_json(news_body()))
        .mount(&server)
        .await;

    let mut dash = test_dashboard().await;
    dash.refresh_news(&client_for(&server), "general").await;

    assert_eq!(dash.news().status(), FeedStatus::Succeeded);
    assert_eq!(dash.news().items().len(), 2);
    assert!(dash.news().error().is_none());
}

#[tokio::test]
async fn test_failed_refresh_preserves_previous_list() {
    let server = MockServer::start().await;
    let success = Mock::given(method("GET"))
        .and(path("/news/general"))
        .respond_with(ResponseTemplate::new(200).set_body_json(news_body()))
        .expect(1)
        .mount_as_scoped(&server)
        .await;

    let mut dash = test_dashboard().await;
    let api = client_for(&server);
    dash.refresh_news(&api, "general").await;
    assert_eq!(dash.news().items().len(), 2);

    // Server starts failing; the stale list must remain visible
    drop(success);
    Mock::given(method("GET"))
        .and(path("/news/general"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(serde_json::json!({ "error": "Failed to fetch news" })),
        )
        .mount(&server)
        .await;

    dash.refresh_news(&api, "general").await;
    assert_eq!(dash.news().status(), FeedStatus::Failed);
    assert_eq!(dash.news().error(), Some("Failed to fetch news"));
    assert_eq!(dash.news().items().len(), 2);
}

#[tokio::test]
async fn test_failed_refresh_without_error_body_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movies"))
        .respond_with(ResponseTemplate::new(500).set_body_string("   "))
        .mount(&server)
        .await;

    let mut dash = test_dashboard().await;
    dash.refresh_movies(&client_for(&server)).await;

    assert_eq!(dash.movies().status(), FeedStatus::Failed);
    // The server sent no usable message; the generic status line is surfaced
    assert!(dash.movies().error().unwrap().contains("500"));
}

#[tokio::test]
async fn test_unreachable_server_fails_both_feeds_independently() {
    // Nothing listening on this port
    let api = ApiClient::new(
        "http://127.0.0.1:9",
        Duration::from_secs(2),
        0,
        Duration::ZERO,
    )
    .unwrap();

    let mut dash = test_dashboard().await;
    dash.refresh_all(&api, "general").await;

    assert_eq!(dash.news().status(), FeedStatus::Failed);
    assert_eq!(dash.movies().status(), FeedStatus::Failed);
    assert!(dash.news().error().is_some());
    assert!(dash.movies().error().is_some());
}

#[tokio::test]
async fn test_refresh_all_applies_both_feeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/news/science"))
        .respond_with(ResponseTemplate::new(200).set_body_json(news_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/movies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": 2, "title": "Dune", "overview": "Sand.", "vote_average": 8.0 }
        ])))
        .mount(&server)
        .await;

    let mut dash = test_dashboard().await;
    dash.refresh_all(&client_for(&server), "science").await;

    assert_eq!(dash.news().status(), FeedStatus::Succeeded);
    assert_eq!(dash.movies().status(), FeedStatus::Succeeded);
    assert_eq!(dash.movies().items()[0].id, 2);
}

// ============================================================================
// Favoriting From Feeds
// ============================================================================

#[tokio::test]
async fn test_favorite_from_fetched_movie_feed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": 2, "title": "Dune", "overview": "Desert planet.", "vote_average": 8.0 }
        ])))
        .mount(&server)
        .await;

    let mut dash = test_dashboard().await;
    dash.refresh_movies(&client_for(&server)).await;

    let movie = dash.movies().items()[0].clone();
    let item = FavoriteItem::from_movie(&movie);
    assert!(dash.add_favorite(item).await.unwrap());

    // The favorite carries the normalized display projection
    let fav = &dash.favorites().items()[0];
    assert_eq!(fav.identity(), "movie-2");
    assert_eq!(fav.description(), "Desert planet.");
    assert_eq!(fav.url(), "https://www.themoviedb.org/movie/2");
    // Feed state is untouched by favoriting
    assert_eq!(dash.movies().items().len(), 1);
}

// ============================================================================
// Server Sync Tests
// ============================================================================

#[tokio::test]
async fn test_pull_replaces_local_state_and_persists() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/preferences"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "preferences": {
                "categories": ["business"],
                "darkMode": true,
                "favorites": [
                    { "type": "news", "url": "https://x.com/a", "title": "A", "description": "" }
                ]
            }
        })))
        .mount(&server)
        .await;

    let db = Database::open(":memory:").await.unwrap();
    let mut dash = Dashboard::init(db.clone()).await.unwrap();
    dash.add_favorite(FavoriteItem::Movie {
        id: 1,
        title: "Local".into(),
        description: String::new(),
        url: "https://www.themoviedb.org/movie/1".into(),
    })
    .await
    .unwrap();

    let mut api = client_for(&server);
    api.set_token(SecretString::from("jwt"));
    dash.pull_preferences(&api).await.unwrap();

    assert_eq!(dash.favorites().len(), 1);
    assert!(dash.favorites().contains("news-https://x.com/a"));
    assert!(dash.preferences().dark_mode());

    // The pulled state is durable
    let restored = Dashboard::init(db).await.unwrap();
    assert!(restored.favorites().contains("news-https://x.com/a"));
}

#[tokio::test]
async fn test_push_sends_current_aggregate() {
    use wiremock::matchers::body_json;

    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/user/preferences"))
        .and(body_json(serde_json::json!({
            "categories": ["science"],
            "darkMode": false,
            "favorites": [
                { "type": "movie", "id": 1, "title": "Dune", "description": "",
                  "url": "https://www.themoviedb.org/movie/1" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "Preferences updated successfully"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut dash = test_dashboard().await;
    dash.set_categories(vec!["science".into()]).await.unwrap();
    dash.add_favorite(FavoriteItem::Movie {
        id: 1,
        title: "Dune".into(),
        description: String::new(),
        url: "https://www.themoviedb.org/movie/1".into(),
    })
    .await
    .unwrap();

    let mut api = client_for(&server);
    api.set_token(SecretString::from("jwt"));
    dash.push_preferences(&api).await.unwrap();
}

#[tokio::test]
async fn test_pull_without_token_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/preferences"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({ "error": "Access token required" })),
        )
        .mount(&server)
        .await;

    let mut dash = test_dashboard().await;
    let before = dash.favorites().clone();

    let result = dash.pull_preferences(&client_for(&server)).await;
    assert!(result.is_err());
    // Rejected sync leaves local state untouched
    assert_eq!(dash.favorites(), &before);
}
