//! In-memory storage for blog posts.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::models::BlogPost;
use super::slug::slugify;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("BlogPost with id {0} does not exist.")]
    NotFound(i64),

    #[error("BlogPost with slug {0:?} does not exist.")]
    SlugNotFound(String),

    #[error("A post with slug {0:?} already exists.")]
    DuplicateSlug(String),

    #[error("A post needs a title or a slug.")]
    EmptySlug,
}

#[derive(Debug, Default)]
struct Posts {
    by_id: BTreeMap<i64, BlogPost>,
    last_id: i64,
}

/// Cheaply cloneable handle to the shared post table.
#[derive(Debug, Clone, Default)]
pub struct PostStore {
    inner: Arc<RwLock<Posts>>,
}

impl PostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update `post`.
    ///
    /// An empty slug is derived from the title. Slugs are unique across
    /// posts. New posts get the next id, written back into `post`.
    pub async fn save(&self, post: &mut BlogPost) -> Result<(), StoreError> {
        if post.slug.is_empty() {
            post.slug = slugify(&post.title);
        }
        if post.slug.is_empty() {
            return Err(StoreError::EmptySlug);
        }

        let mut posts = self.inner.write().await;

        let clash = posts
            .by_id
            .values()
            .any(|other| other.slug == post.slug && other.id != post.id);
        if clash {
            return Err(StoreError::DuplicateSlug(post.slug.clone()));
        }

        let id = match post.id {
            Some(id) => {
                posts.last_id = posts.last_id.max(id);
                id
            }
            None => {
                posts.last_id += 1;
                posts.last_id
            }
        };
        post.id = Some(id);
        posts.by_id.insert(id, post.clone());

        tracing::debug!(post_id = id, slug = %post.slug, "Saved blog post");
        Ok(())
    }

    pub async fn get(&self, id: i64) -> Result<BlogPost, StoreError> {
        self.inner
            .read()
            .await
            .by_id
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<BlogPost, StoreError> {
        self.inner
            .read()
            .await
            .by_id
            .values()
            .find(|p| p.slug == slug)
            .cloned()
            .ok_or_else(|| StoreError::SlugNotFound(slug.to_string()))
    }

    /// All posts, most recently published first.
    pub async fn newest_first(&self) -> Vec<BlogPost> {
        let mut posts: Vec<BlogPost> = self.inner.read().await.by_id.values().cloned().collect();
        posts.sort_by(|a, b| b.published_on.cmp(&a.published_on));
        posts
    }

    pub async fn delete(&self, id: i64) -> Result<BlogPost, StoreError> {
        self.inner
            .write()
            .await
            .by_id
            .remove(&id)
            .ok_or(StoreError::NotFound(id))
    }

    pub async fn count(&self) -> usize {
        self.inner.read().await.by_id.len()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};

    use super::*;

    fn post(title: &str) -> BlogPost {
        BlogPost {
            title: title.into(),
            published_by: Some("testmctest".into()),
            ..BlogPost::default()
        }
    }

    #[tokio::test]
    async fn save_assigns_ids_and_slugs() {
        let store = PostStore::new();
        let mut first = post("Hello, World!");
        let mut second = post("Life Update");

        store.save(&mut first).await.unwrap();
        store.save(&mut second).await.unwrap();

        assert_eq!(first.id, Some(1));
        assert_eq!(first.slug, "hello-world");
        assert_eq!(second.id, Some(2));
        assert_eq!(store.count().await, 2);
        assert_eq!(store.get_by_slug("life-update").await.unwrap(), second);
    }

    #[tokio::test]
    async fn save_updates_in_place() {
        let store = PostStore::new();
        let mut p = post("Hello, World!");
        store.save(&mut p).await.unwrap();

        p.content = "Fixed a typo.".into();
        store.save(&mut p).await.unwrap();

        assert_eq!(store.count().await, 1);
        assert_eq!(store.get(1).await.unwrap().content, "Fixed a typo.");
    }

    #[tokio::test]
    async fn duplicate_slugs_are_rejected() {
        let store = PostStore::new();
        store.save(&mut post("Same")).await.unwrap();

        let err = store.save(&mut post("same!")).await.unwrap_err();
        assert_eq!(err, StoreError::DuplicateSlug("same".into()));
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn untitled_posts_are_rejected() {
        let store = PostStore::new();
        let err = store.save(&mut post("")).await.unwrap_err();
        assert_matches!(err, StoreError::EmptySlug);
    }

    #[tokio::test]
    async fn newest_first_orders_by_publication() {
        let store = PostStore::new();
        let now = Utc::now();

        let mut old = post("Old");
        old.published_on = now - Duration::days(3);
        let mut new = post("New");
        new.published_on = now;

        store.save(&mut old).await.unwrap();
        store.save(&mut new).await.unwrap();

        let slugs: Vec<String> = store
            .newest_first()
            .await
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(slugs, ["new", "old"]);
    }

    #[tokio::test]
    async fn delete_removes_post() {
        let store = PostStore::new();
        let mut p = post("Gone");
        store.save(&mut p).await.unwrap();

        store.delete(1).await.unwrap();
        assert_matches!(store.get(1).await, Err(StoreError::NotFound(1)));
        assert_matches!(store.delete(1).await, Err(StoreError::NotFound(1)));
    }
}
