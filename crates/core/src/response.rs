//! JSON responses and the error envelope.

use serde::Serialize;
use serde_json::Value;

/// What the host's response object must accept.
pub trait ResponseWriter {
    fn set_status(&mut self, code: u16);

    /// Write `body` as the JSON payload, setting `Content-Type: application/json`.
    fn write_json(&mut self, body: &Value) -> Result<(), serde_json::Error>;
}

/// A status code plus a JSON body, produced by `ApiView::render`.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonResponse {
    pub status: u16,
    pub body: Value,
}

impl JsonResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn write_to<W>(&self, out: &mut W) -> Result<(), serde_json::Error>
    where
        W: ResponseWriter + ?Sized,
    {
        out.set_status(self.status);
        out.write_json(&self.body)
    }
}

/// One or more user-facing error messages.
///
/// A single message converts into a one-element list, so
/// `render_error("x", ..)` and `render_error(["x"], ..)` are equivalent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorMessages(pub Vec<String>);

impl From<String> for ErrorMessages {
    fn from(msg: String) -> Self {
        Self(vec![msg])
    }
}

impl From<&str> for ErrorMessages {
    fn from(msg: &str) -> Self {
        Self(vec![msg.to_string()])
    }
}

impl From<Vec<String>> for ErrorMessages {
    fn from(msgs: Vec<String>) -> Self {
        Self(msgs)
    }
}

impl From<Vec<&str>> for ErrorMessages {
    fn from(msgs: Vec<&str>) -> Self {
        Self(msgs.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ErrorMessages {
    fn from(msgs: [&str; N]) -> Self {
        Self(msgs.into_iter().map(str::to_string).collect())
    }
}

/// The `{"success": false, "errors": [...]}` body.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub errors: ErrorMessages,
}

impl ErrorEnvelope {
    pub fn new(errors: impl Into<ErrorMessages>) -> Self {
        Self {
            success: false,
            errors: errors.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Default)]
    struct Captured {
        status: Option<u16>,
        body: Option<String>,
    }

    impl ResponseWriter for Captured {
        fn set_status(&mut self, code: u16) {
            self.status = Some(code);
        }

        fn write_json(&mut self, body: &Value) -> Result<(), serde_json::Error> {
            self.body = Some(serde_json::to_string(body)?);
            Ok(())
        }
    }

    #[test]
    fn single_message_becomes_list() {
        assert_eq!(ErrorMessages::from("x"), ErrorMessages::from(["x"]));
        assert_eq!(
            ErrorMessages::from("x".to_string()),
            ErrorMessages::from(vec!["x".to_string()])
        );
    }

    #[test]
    fn envelope_shape() {
        let body = serde_json::to_value(ErrorEnvelope::new(vec!["a", "b"])).unwrap();
        assert_eq!(body, json!({ "success": false, "errors": ["a", "b"] }));
    }

    #[test]
    fn write_to_drives_the_writer() {
        let resp = JsonResponse::new(201, json!({ "success": true }));
        let mut out = Captured::default();
        resp.write_to(&mut out).unwrap();

        assert_eq!(out.status, Some(201));
        assert_eq!(out.body.as_deref(), Some(r#"{"success":true}"#));
    }
}
