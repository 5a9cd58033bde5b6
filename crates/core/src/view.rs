//! The `ApiView` trait: per-verb handlers plus JSON conveniences.
//!
//! A view implements the verbs it serves; everything else answers with a
//! 405 error envelope. [`ApiView::dispatch`] is the single entry point a host
//! adapter calls. Any error a handler returns is turned into a 500 error
//! envelope there, unless the view asks for errors to bubble up to the host.
//!
//! ```ignore
//! struct PostListView { store: PostStore }
//!
//! #[async_trait]
//! impl ApiView for PostListView {
//!     type Model = BlogPost;
//!
//!     async fn get(&self, _req: &ApiRequest) -> ViewResult {
//!         let posts = self.store.all().await;
//!         Ok(self.render(json!({
//!             "success": true,
//!             "posts": self.serialize_many(&posts),
//!         }), status::OK))
//!     }
//! }
//! ```

use std::sync::LazyLock;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::request::{ApiRequest, RequestSource, Verb};
use crate::response::{ErrorEnvelope, ErrorMessages, JsonResponse};
use crate::serializer::{JsonMap, Model, ModelMeta, ModelSerializer, Record};
use crate::status;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Handlers may fail with any error; `dispatch` decides what the host sees.
pub type ViewResult = anyhow::Result<JsonResponse>;

#[async_trait]
pub trait ApiView: Send + Sync + Sized + 'static {
    /// The model `serialize` works on. Views that render no model use
    /// [`Unmodeled`].
    type Model: Model + Send + Sync;

    /// Used in log output.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// When `true`, handler errors are returned from `dispatch` unchanged
    /// instead of being rendered, so the host's own error handling sees them.
    fn bubble_exceptions(&self) -> bool {
        false
    }

    fn serializer(&self) -> ModelSerializer {
        ModelSerializer
    }

    async fn get(&self, req: &ApiRequest) -> ViewResult {
        Ok(self.http_method_not_allowed(req))
    }

    async fn post(&self, req: &ApiRequest) -> ViewResult {
        Ok(self.http_method_not_allowed(req))
    }

    async fn put(&self, req: &ApiRequest) -> ViewResult {
        Ok(self.http_method_not_allowed(req))
    }

    async fn patch(&self, req: &ApiRequest) -> ViewResult {
        Ok(self.http_method_not_allowed(req))
    }

    async fn delete(&self, req: &ApiRequest) -> ViewResult {
        Ok(self.http_method_not_allowed(req))
    }

    async fn dispatch(&self, req: &ApiRequest) -> ViewResult {
        let outcome = match req.verb {
            Verb::Get => self.get(req).await,
            Verb::Post => self.post(req).await,
            Verb::Put => self.put(req).await,
            Verb::Patch => self.patch(req).await,
            Verb::Delete => self.delete(req).await,
            Verb::Head | Verb::Options | Verb::Trace => Ok(self.http_method_not_allowed(req)),
        };

        match outcome {
            Ok(resp) => Ok(resp),
            Err(err) if self.bubble_exceptions() => Err(err),
            Err(err) => {
                tracing::warn!(
                    view = self.name(),
                    verb = %req.verb,
                    path = %req.path,
                    error = %err,
                    "Handler failed, rendering error envelope",
                );
                Ok(self.render_error(err.to_string(), status::APP_ERROR))
            }
        }
    }

    fn http_method_not_allowed(&self, req: &ApiRequest) -> JsonResponse {
        tracing::debug!(view = self.name(), verb = %req.verb, "Method not allowed");
        self.render_error(
            format!("Method \"{}\" not allowed.", req.verb),
            status::NOT_ALLOWED,
        )
    }

    /// Decode the request body as a JSON object.
    ///
    /// With `strict`, the declared content type must be exactly
    /// `application/json`.
    fn read_json<R>(&self, req: &R, strict: bool) -> ApiResult<JsonMap>
    where
        R: RequestSource + ?Sized,
    {
        if strict && req.content_type() != Some(JSON_CONTENT_TYPE) {
            return Err(ApiError::api("Invalid Content-type provided."));
        }

        serde_json::from_slice(req.read_body())
            .map_err(|_| ApiError::api("Invalid JSON payload provided."))
    }

    fn render(&self, data: Value, status_code: u16) -> JsonResponse {
        JsonResponse::new(status_code, data)
    }

    fn render_error(&self, messages: impl Into<ErrorMessages>, status_code: u16) -> JsonResponse {
        let envelope = ErrorEnvelope::new(messages);
        let body = serde_json::to_value(&envelope).unwrap_or(Value::Null);
        self.render(body, status_code)
    }

    /// `render_error` with the default 500 status.
    fn render_app_error(&self, messages: impl Into<ErrorMessages>) -> JsonResponse {
        self.render_error(messages, status::APP_ERROR)
    }

    /// Check user-supplied data, returning the accepted data.
    ///
    /// Not called automatically. Views that take input should override it.
    fn validate(&self, _data: JsonMap) -> ApiResult<JsonMap> {
        Err(ApiError::api("View must implement the 'validate' method."))
    }

    fn serialize(&self, obj: &Self::Model) -> Record {
        self.serializer().to_dict(obj, &[])
    }

    fn serialize_many<'a, I>(&self, objs: I) -> Vec<Record>
    where
        I: IntoIterator<Item = &'a Self::Model>,
        Self::Model: 'a,
    {
        objs.into_iter().map(|obj| self.serialize(obj)).collect()
    }
}

/// Model placeholder for views that never serialize anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unmodeled;

static UNMODELED_META: LazyLock<ModelMeta> = LazyLock::new(|| ModelMeta::new("Unmodeled", &[]));

impl Model for Unmodeled {
    fn meta() -> &'static ModelMeta {
        &UNMODELED_META
    }

    fn field_value(&self, _field: &str) -> Option<Value> {
        None
    }

    fn set_field_value(&mut self, _field: &str, _value: Value) -> ApiResult<()> {
        Ok(())
    }
}
