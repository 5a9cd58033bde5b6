//! Caller identity plumbing.
//!
//! Authentication is the host's job. A fronting proxy is expected to have
//! authenticated the user and to pass the name along in `x-remote-user`;
//! [`trusted_remote_user`] copies it into a [`Caller`] extension, which the
//! adapter exposes as `ApiRequest::caller`.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

pub const REMOTE_USER_HEADER: &str = "x-remote-user";

/// The identity associated with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub String);

/// Copy a non-empty `x-remote-user` header into a [`Caller`] extension.
///
/// Only install this behind a proxy that strips the header from client
/// requests.
pub async fn trusted_remote_user(mut req: Request, next: Next) -> Response {
    let caller = req
        .headers()
        .get(REMOTE_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    if let Some(name) = caller {
        tracing::trace!(caller = %name, "Trusted remote user");
        req.extensions_mut().insert(Caller(name));
    }

    next.run(req).await
}
