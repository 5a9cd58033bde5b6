#![allow(dead_code)]

use axum::Router;
use chrono::{Duration, TimeZone, Utc};

use microapi_api::blog::models::BlogPost;
use microapi_api::blog::store::PostStore;
use microapi_api::config::ServerConfig;
use microapi_api::router::build_app_router;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
    }
}

/// Build the full application router over `store`, with the same middleware
/// stack production uses.
pub fn build_test_app(store: PostStore) -> Router {
    build_app_router(&test_config(), store).unwrap()
}

/// A store holding two posts by `testmctest`:
///
/// - id 1, "Hello, World!", published 2023-12-01
/// - id 2, "Life Update", published three days later
pub async fn seeded_store() -> PostStore {
    let store = PostStore::new();
    let first_day = Utc.with_ymd_and_hms(2023, 12, 1, 9, 30, 0).unwrap();

    let mut hello = BlogPost {
        title: "Hello, World!".into(),
        content: "My first post! I'm so excited to have a blog.".into(),
        published_by: Some("testmctest".into()),
        published_on: first_day,
        ..BlogPost::default()
    };
    store.save(&mut hello).await.unwrap();

    let mut update = BlogPost {
        title: "Life Update".into(),
        content: "Sorry I haven't posted much. Busy times.".into(),
        published_by: Some("testmctest".into()),
        published_on: first_day + Duration::days(3),
        ..BlogPost::default()
    };
    store.save(&mut update).await.unwrap();

    store
}
