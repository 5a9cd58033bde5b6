//! Host-agnostic view of an inbound request.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{ApiError, ApiResult};

/// What a view needs from the host's request object.
pub trait RequestSource {
    /// The declared `Content-Type` header, verbatim.
    fn content_type(&self) -> Option<&str>;

    /// The already-buffered request body.
    fn read_body(&self) -> &[u8];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Trace,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
            Verb::Head => "HEAD",
            Verb::Options => "OPTIONS",
            Verb::Trace => "TRACE",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = ApiError;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Verb::Get),
            "POST" => Ok(Verb::Post),
            "PUT" => Ok(Verb::Put),
            "PATCH" => Ok(Verb::Patch),
            "DELETE" => Ok(Verb::Delete),
            "HEAD" => Ok(Verb::Head),
            "OPTIONS" => Ok(Verb::Options),
            "TRACE" => Ok(Verb::Trace),
            other => Err(ApiError::Api(format!("Unsupported HTTP method: {other}"))),
        }
    }
}

/// A fully buffered request, built by the host adapter (or by the test
/// helpers) and handed to `ApiView::dispatch`.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub verb: Verb,
    pub path: String,
    /// Header names are lowercase.
    pub headers: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
    /// Named segments captured by the host's router (e.g. `post_id`).
    pub params: BTreeMap<String, String>,
    pub body: Vec<u8>,
    /// Identity the host associated with the request, if any.
    pub caller: Option<String>,
}

impl ApiRequest {
    pub fn new(verb: Verb, path: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
            headers: BTreeMap::new(),
            query: BTreeMap::new(),
            params: BTreeMap::new(),
            body: Vec::new(),
            caller: None,
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(name.into(), value.to_string());
        self
    }

    pub fn with_caller(mut self, caller: impl Into<String>) -> Self {
        self.caller = Some(caller.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Parse a route parameter.
    pub fn param<T: FromStr>(&self, name: &str) -> ApiResult<T> {
        let raw = self
            .params
            .get(name)
            .ok_or_else(|| ApiError::Api(format!("Missing route parameter: {name}")))?;

        raw.parse()
            .map_err(|_| ApiError::Api(format!("Invalid route parameter {name}: {raw}")))
    }
}

impl RequestSource for ApiRequest {
    fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    fn read_body(&self) -> &[u8] {
        &self.body
    }
}
