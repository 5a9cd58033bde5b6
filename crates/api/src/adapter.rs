//! Bridges axum requests and responses to [`ApiView`].
//!
//! [`mount`] turns a view into a route that accepts every verb. The request
//! is buffered into an [`ApiRequest`], handed to [`ApiView::dispatch`], and the
//! resulting [`JsonResponse`] is written back through [`ResponseWriter`].

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{FromRequestParts, Path, Query, Request};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, MethodRouter};
use microapi_core::view::JSON_CONTENT_TYPE;
use microapi_core::{status, ApiRequest, ApiView, JsonResponse, ResponseWriter, Verb};
use serde_json::Value;

use crate::middleware::Caller;

/// Largest request body buffered for a view (2 MiB).
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Serve `view` for every HTTP method on a route.
pub fn mount<V, S>(view: Arc<V>) -> MethodRouter<S>
where
    V: ApiView,
    S: Clone + Send + Sync + 'static,
{
    any(move |req: Request| {
        let view = Arc::clone(&view);
        async move { serve(view.as_ref(), req, DEFAULT_BODY_LIMIT).await }
    })
}

/// Run one request through `view`.
///
/// Errors the view lets bubble are logged and answered with a plain-text 500
/// carrying the error chain.
pub async fn serve<V: ApiView>(view: &V, req: Request, body_limit: usize) -> Response {
    let api_req = match buffer_request(req, body_limit).await {
        Ok(api_req) => api_req,
        Err((code, msg)) => return JsonReply(view.render_error(msg, code)).into_response(),
    };

    match view.dispatch(&api_req).await {
        Ok(resp) => JsonReply(resp).into_response(),
        Err(err) => {
            tracing::error!(
                view = view.name(),
                verb = %api_req.verb,
                path = %api_req.path,
                error = ?err,
                "Unhandled error bubbled out of view",
            );
            (StatusCode::INTERNAL_SERVER_ERROR, format!("{err:?}")).into_response()
        }
    }
}

/// Buffer an axum request into an [`ApiRequest`].
///
/// Rejections carry the status code and message to render.
pub async fn buffer_request(req: Request, body_limit: usize) -> Result<ApiRequest, (u16, String)> {
    let (mut parts, body) = req.into_parts();

    let verb: Verb = parts
        .method
        .as_str()
        .parse()
        .map_err(|_| (status::NOT_ALLOWED, format!("Method \"{}\" not allowed.", parts.method)))?;

    // Routes without captures have no path parameters to decode.
    let params = Path::<HashMap<String, String>>::from_request_parts(&mut parts, &())
        .await
        .map(|Path(params)| params.into_iter().collect())
        .unwrap_or_default();

    let query = Query::<BTreeMap<String, String>>::try_from_uri(&parts.uri)
        .map(|Query(query)| query)
        .unwrap_or_default();

    let headers = parts
        .headers
        .iter()
        .filter_map(|(name, value)| {
            let value = value.to_str().ok()?;
            Some((name.as_str().to_string(), value.to_string()))
        })
        .collect();

    let caller = parts.extensions.get::<Caller>().map(|c| c.0.clone());

    let body = axum::body::to_bytes(body, body_limit)
        .await
        .map_err(|e| {
            tracing::debug!(error = %e, "Failed to buffer request body");
            (
                status::BAD_REQUEST,
                "Request body is too large or could not be read.".to_string(),
            )
        })?;

    Ok(ApiRequest {
        verb,
        path: parts.uri.path().to_string(),
        headers,
        query,
        params,
        body: body.to_vec(),
        caller,
    })
}

/// [`JsonResponse`] as an axum response.
#[derive(Debug)]
pub struct JsonReply(pub JsonResponse);

#[derive(Debug, Default)]
struct AxumResponseWriter {
    status: StatusCode,
    body: Vec<u8>,
}

impl ResponseWriter for AxumResponseWriter {
    fn set_status(&mut self, code: u16) {
        self.status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    }

    fn write_json(&mut self, body: &Value) -> Result<(), serde_json::Error> {
        self.body = serde_json::to_vec(body)?;
        Ok(())
    }
}

impl IntoResponse for JsonReply {
    fn into_response(self) -> Response {
        let mut out = AxumResponseWriter::default();
        if let Err(err) = self.0.write_to(&mut out) {
            tracing::error!(error = %err, "Failed to encode JSON response");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }

        // 204 must not carry a body.
        let body = if out.status == StatusCode::NO_CONTENT {
            Body::empty()
        } else {
            Body::from(out.body)
        };

        (
            out.status,
            [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))],
            body,
        )
            .into_response()
    }
}
