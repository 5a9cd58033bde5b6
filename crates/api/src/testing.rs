//! Helpers for testing views, directly or through a router.
//!
//! The `assert_*` helpers panic like `assert!` and accept both a
//! [`JsonResponse`] (from [`make_request`]) and an axum [`Response`] (from
//! [`send`]).

use std::collections::BTreeMap;

use axum::body::Body;
use axum::extract::Query;
use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{Request, Uri};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use microapi_core::view::JSON_CONTENT_TYPE;
use microapi_core::{
    status, ApiError, ApiRequest, ApiResult, ApiView, JsonResponse, Verb, ViewResult,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::middleware::REMOTE_USER_HEADER;

/// Anything with an HTTP status code.
pub trait HasStatus {
    fn status_code(&self) -> u16;
}

impl HasStatus for JsonResponse {
    fn status_code(&self) -> u16 {
        self.status
    }
}

impl HasStatus for Response {
    fn status_code(&self) -> u16 {
        self.status().as_u16()
    }
}

/// Check for a specific status code. The named variants below cover the
/// common ones.
#[track_caller]
pub fn assert_status_code(resp: &impl HasStatus, expected: u16) {
    let actual = resp.status_code();
    assert_eq!(actual, expected, "expected HTTP {expected}, got HTTP {actual}");
}

#[track_caller]
pub fn assert_ok(resp: &impl HasStatus) {
    assert_status_code(resp, status::OK);
}

#[track_caller]
pub fn assert_created(resp: &impl HasStatus) {
    assert_status_code(resp, status::CREATED);
}

#[track_caller]
pub fn assert_accepted(resp: &impl HasStatus) {
    assert_status_code(resp, status::ACCEPTED);
}

#[track_caller]
pub fn assert_no_content(resp: &impl HasStatus) {
    assert_status_code(resp, status::NO_CONTENT);
}

#[track_caller]
pub fn assert_bad_request(resp: &impl HasStatus) {
    assert_status_code(resp, status::BAD_REQUEST);
}

#[track_caller]
pub fn assert_unauthorized(resp: &impl HasStatus) {
    assert_status_code(resp, status::UNAUTHORIZED);
}

#[track_caller]
pub fn assert_forbidden(resp: &impl HasStatus) {
    assert_status_code(resp, status::FORBIDDEN);
}

#[track_caller]
pub fn assert_not_found(resp: &impl HasStatus) {
    assert_status_code(resp, status::NOT_FOUND);
}

#[track_caller]
pub fn assert_not_allowed(resp: &impl HasStatus) {
    assert_status_code(resp, status::NOT_ALLOWED);
}

#[track_caller]
pub fn assert_app_error(resp: &impl HasStatus) {
    assert_status_code(resp, status::APP_ERROR);
}

/// Assert a JSON `Content-Type` and decode the body.
///
/// An empty body decodes to `{}`.
///
/// # Panics
///
/// If the content type is not JSON, or the body is present but not JSON.
pub async fn check_response(resp: Response) -> Value {
    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(
        content_type.contains(JSON_CONTENT_TYPE),
        "expected a JSON response, got Content-Type {content_type:?}"
    );

    let bytes = match resp.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => panic!("failed to read response body: {err}"),
    };
    if bytes.is_empty() {
        return json!({});
    }

    match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(err) => panic!("response body is not valid JSON: {err}"),
    }
}

/// [`check_response`] for a [`JsonResponse`] returned by a view.
///
/// A 204 response decodes to `{}`, as it would on the wire.
pub fn check_json_response(resp: &JsonResponse) -> Value {
    if resp.status == status::NO_CONTENT {
        return json!({});
    }
    resp.body.clone()
}

/// Check that a response decodes to exactly `expected`.
pub async fn assert_response_equals(resp: Response, expected: Value) {
    let actual = check_response(resp).await;
    assert_eq!(actual, expected);
}

/// Build an [`ApiRequest`] for calling a view directly.
///
/// `method` is case-insensitive. Without `headers`, JSON `Content-Type` and
/// `Accept` headers are set. For GET and HEAD, `data` becomes query
/// parameters; for other verbs it is sent as a JSON body.
///
/// PATCH is refused rather than silently sent as another verb.
pub fn create_request(
    url: &str,
    method: &str,
    headers: Option<&[(&str, &str)]>,
    data: Option<Value>,
) -> ApiResult<ApiRequest> {
    let verb = match method.to_ascii_lowercase().as_str() {
        "patch" => return Err(ApiError::api("create_request does not support PATCH.")),
        other => other.parse::<Verb>()?,
    };

    let uri: Uri = url
        .parse()
        .map_err(|_| ApiError::api(format!("Invalid URL: {url}")))?;
    let mut req = ApiRequest::new(verb, uri.path());

    if let Ok(Query(query)) = Query::<BTreeMap<String, String>>::try_from_uri(&uri) {
        req.query = query;
    }

    match headers {
        Some(headers) => {
            for (name, value) in headers {
                req = req.with_header(name, *value);
            }
        }
        None => {
            req = req
                .with_header(CONTENT_TYPE.as_str(), JSON_CONTENT_TYPE)
                .with_header(ACCEPT.as_str(), JSON_CONTENT_TYPE);
        }
    }

    if let Some(data) = data {
        match verb {
            Verb::Get | Verb::Head => {
                let Value::Object(fields) = data else {
                    return Err(ApiError::api("Query data must be a JSON object."));
                };
                for (key, value) in fields {
                    let value = match value {
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    req.query.insert(key, value);
                }
            }
            _ => {
                let body = serde_json::to_vec(&data)
                    .map_err(|e| ApiError::api(format!("Unencodable request data: {e}")))?;
                req.body = body;
            }
        }
    }

    Ok(req)
}

/// Run `req` through `view` the way the host adapter would.
///
/// Errors a view lets bubble come back as `Err`.
pub async fn make_request<V: ApiView>(view: &V, req: ApiRequest) -> ViewResult {
    view.dispatch(&req).await
}

/// Build an axum request with an optional JSON body and caller.
pub fn http_request(
    method: &str,
    uri: &str,
    data: Option<Value>,
    caller: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(ACCEPT, JSON_CONTENT_TYPE);

    if let Some(caller) = caller {
        builder = builder.header(REMOTE_USER_HEADER, caller);
    }

    let body = match data {
        Some(data) => {
            builder = builder.header(CONTENT_TYPE, JSON_CONTENT_TYPE);
            Body::from(data.to_string())
        }
        None => Body::empty(),
    };

    match builder.body(body) {
        Ok(req) => req,
        Err(err) => panic!("invalid test request {method} {uri}: {err}"),
    }
}

/// One-shot a request through `app`.
pub async fn send(app: Router, req: Request<Body>) -> Response {
    match app.oneshot(req).await {
        Ok(resp) => resp,
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use microapi_core::RequestSource;

    #[test]
    fn create_request_defaults_to_json_headers() {
        let req = create_request("/api/v1/posts/", "GET", None, None).unwrap();
        assert_eq!(req.verb, Verb::Get);
        assert_eq!(req.path, "/api/v1/posts/");
        assert_eq!(req.content_type(), Some(JSON_CONTENT_TYPE));
        assert_eq!(req.header("accept"), Some(JSON_CONTENT_TYPE));
    }

    #[test]
    fn create_request_is_case_insensitive() {
        let req = create_request("/", "dElEtE", None, None).unwrap();
        assert_eq!(req.verb, Verb::Delete);
    }

    #[test]
    fn create_request_refuses_patch() {
        let err = create_request("/api/v1/posts/1/", "patch", None, None).unwrap_err();
        assert_eq!(err.to_string(), "create_request does not support PATCH.");
    }

    #[test]
    fn create_request_rejects_unknown_methods() {
        assert_matches!(create_request("/", "brew", None, None), Err(ApiError::Api(_)));
    }

    #[test]
    fn create_request_puts_get_data_in_query() {
        let req = create_request(
            "/api/v1/posts/?page=2",
            "get",
            None,
            Some(json!({ "q": "cats", "limit": 5 })),
        )
        .unwrap();

        assert_eq!(req.query.get("page").map(String::as_str), Some("2"));
        assert_eq!(req.query.get("q").map(String::as_str), Some("cats"));
        assert_eq!(req.query.get("limit").map(String::as_str), Some("5"));
        assert!(req.body.is_empty());
    }

    #[test]
    fn create_request_encodes_body_for_writes() {
        let req = create_request(
            "/api/v1/posts/",
            "post",
            Some(&[("Content-Type", "text/plain")]),
            Some(json!({ "title": "Cat Pictures" })),
        )
        .unwrap();

        assert_eq!(req.content_type(), Some("text/plain"));
        let body: Value = serde_json::from_slice(&req.body).unwrap();
        assert_eq!(body, json!({ "title": "Cat Pictures" }));
    }

    #[test]
    fn status_helpers_accept_json_responses() {
        assert_ok(&JsonResponse::new(200, json!({})));
        assert_created(&JsonResponse::new(201, json!({})));
        assert_accepted(&JsonResponse::new(202, json!({})));
        assert_no_content(&JsonResponse::new(204, json!({})));
        assert_bad_request(&JsonResponse::new(400, json!({})));
        assert_unauthorized(&JsonResponse::new(401, json!({})));
        assert_forbidden(&JsonResponse::new(403, json!({})));
        assert_not_found(&JsonResponse::new(404, json!({})));
        assert_not_allowed(&JsonResponse::new(405, json!({})));
        assert_app_error(&JsonResponse::new(500, json!({})));
    }

    #[test]
    #[should_panic(expected = "expected HTTP 200, got HTTP 404")]
    fn status_helpers_report_mismatches() {
        assert_ok(&JsonResponse::new(404, json!({})));
    }

    #[test]
    fn check_json_response_treats_204_as_empty() {
        let resp = JsonResponse::new(204, json!({ "ignored": true }));
        assert_eq!(check_json_response(&resp), json!({}));
    }

    #[test]
    fn http_request_sets_caller_and_body_headers() {
        let req = http_request("POST", "/api/v1/posts/", Some(json!({})), Some("testmctest"));
        assert_eq!(req.headers()[REMOTE_USER_HEADER], "testmctest");
        assert_eq!(req.headers()[CONTENT_TYPE], JSON_CONTENT_TYPE);
    }
}
