//! `/posts/` and `/posts/{post_id}/` views.

use std::fmt;

use async_trait::async_trait;
use microapi_core::{
    status, ApiError, ApiRequest, ApiResult, ApiView, JsonMap, Record, ViewResult,
};
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use super::models::BlogPost;
use super::store::{PostStore, StoreError};

/// Fields required to publish a new post.
#[derive(Debug, Deserialize, Validate)]
struct NewPost {
    #[validate(length(min = 1, max = 64, message = "title must be 1 to 64 characters"))]
    title: String,
}

/// Raised by `DELETE /posts/`, which refuses to wipe the blog.
#[derive(Debug)]
pub struct OhHellNoError;

impl fmt::Display for OhHellNoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("I don't think so.")
    }
}

impl std::error::Error for OhHellNoError {}

/// Ids are assigned by the store and taken from the route, never from a body.
fn strip_primary_key(mut data: JsonMap) -> JsonMap {
    data.remove("id");
    data
}

/// Serialized post plus the publishing user, which the serializer leaves
/// out as a relation.
fn post_record(mut record: Record, post: &BlogPost) -> Record {
    record.insert("published_by".into(), json!(post.published_by));
    record
}

/// `GET` lists posts, `POST` publishes one as the calling user.
///
/// Handler errors bubble to the host instead of becoming an error envelope.
#[derive(Debug, Clone)]
pub struct BlogPostListView {
    store: PostStore,
}

impl BlogPostListView {
    pub fn new(store: PostStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ApiView for BlogPostListView {
    type Model = BlogPost;

    fn bubble_exceptions(&self) -> bool {
        true
    }

    async fn get(&self, _req: &ApiRequest) -> ViewResult {
        let posts = self.store.newest_first().await;
        Ok(self.render(
            json!({
                "success": true,
                "posts": self.serialize_many(&posts),
            }),
            status::OK,
        ))
    }

    async fn post(&self, req: &ApiRequest) -> ViewResult {
        let Some(caller) = req.caller.clone() else {
            return Ok(self.render_error("You must be logged in", status::UNAUTHORIZED));
        };

        let data = self.read_json(req, true)?;
        let data = match self.validate(data) {
            Ok(data) => data,
            Err(err) => return Ok(self.render_error(err.to_string(), status::BAD_REQUEST)),
        };

        let mut post = BlogPost::default();
        self.serializer()
            .from_dict(&mut post, &strip_primary_key(data), false)?;
        post.published_by = Some(caller);

        match self.store.save(&mut post).await {
            Ok(()) => {}
            Err(err @ (StoreError::DuplicateSlug(_) | StoreError::EmptySlug)) => {
                return Ok(self.render_error(err.to_string(), status::BAD_REQUEST));
            }
            Err(err) => return Err(err.into()),
        }

        tracing::info!(post_id = ?post.id, slug = %post.slug, "Blog post published");

        Ok(self.render(
            json!({
                "success": true,
                "post": self.serialize(&post),
            }),
            status::CREATED,
        ))
    }

    async fn delete(&self, _req: &ApiRequest) -> ViewResult {
        Err(OhHellNoError.into())
    }

    fn validate(&self, data: JsonMap) -> ApiResult<JsonMap> {
        let input: NewPost = serde_json::from_value(Value::Object(data.clone()))
            .map_err(|e| ApiError::validation(e.to_string()))?;
        input
            .validate()
            .map_err(|e| ApiError::validation(e.to_string()))?;
        Ok(data)
    }

    fn serialize(&self, post: &BlogPost) -> Record {
        post_record(self.serializer().to_dict(post, &[]), post)
    }
}

/// `GET`, `PUT` and `DELETE` on a single post.
#[derive(Debug, Clone)]
pub struct BlogPostDetailView {
    store: PostStore,
}

impl BlogPostDetailView {
    pub fn new(store: PostStore) -> Self {
        Self { store }
    }

    async fn get_blog_post(&self, req: &ApiRequest) -> anyhow::Result<BlogPost> {
        let post_id: i64 = req.param("post_id")?;
        Ok(self.store.get(post_id).await?)
    }
}

#[async_trait]
impl ApiView for BlogPostDetailView {
    type Model = BlogPost;

    async fn get(&self, req: &ApiRequest) -> ViewResult {
        let post = match self.get_blog_post(req).await {
            Ok(post) => post,
            Err(err) if err.downcast_ref::<StoreError>().is_some() => {
                return Ok(self.render_error("Post does not exist", status::NOT_FOUND));
            }
            Err(err) => return Err(err),
        };

        Ok(self.render(
            json!({
                "success": true,
                "post": self.serialize(&post),
            }),
            status::OK,
        ))
    }

    async fn put(&self, req: &ApiRequest) -> ViewResult {
        let data = strip_primary_key(self.read_json(req, true)?);
        let mut post = self.get_blog_post(req).await?;

        self.serializer().from_dict(&mut post, &data, true)?;
        self.store.save(&mut post).await?;

        Ok(self.render(
            json!({
                "success": true,
                "post": self.serialize(&post),
            }),
            status::ACCEPTED,
        ))
    }

    async fn delete(&self, req: &ApiRequest) -> ViewResult {
        let post = self.get_blog_post(req).await?;
        if let Some(id) = post.id {
            self.store.delete(id).await?;
        }
        tracing::info!(post_id = ?post.id, "Blog post deleted");
        Ok(self.render(json!({}), status::NO_CONTENT))
    }

    fn serialize(&self, post: &BlogPost) -> Record {
        post_record(self.serializer().to_dict(post, &[]), post)
    }
}
