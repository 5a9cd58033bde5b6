//! Route table for the demo service.

pub mod health;

use std::sync::Arc;

use axum::Router;

use crate::adapter::mount;
use crate::blog::store::PostStore;
use crate::blog::views::{BlogPostDetailView, BlogPostListView};

/// Routes nested under `/api/v1`.
pub fn api_routes(store: PostStore) -> Router {
    Router::new()
        .route(
            "/posts/",
            mount(Arc::new(BlogPostListView::new(store.clone()))),
        )
        .route(
            "/posts/{post_id}/",
            mount(Arc::new(BlogPostDetailView::new(store))),
        )
}
