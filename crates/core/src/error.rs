/// Errors raised by the library itself.
///
/// `Api` is the base kind; the two specialised variants split malformed input
/// (`InvalidField`) from value-level failures (`DataValidation`).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Api(String),

    #[error("{field} not found on {model}")]
    InvalidField { field: String, model: &'static str },

    #[error("{0}")]
    DataValidation(String),
}

impl ApiError {
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::DataValidation(msg.into())
    }
}

/// Convenience alias for fallible library calls.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_field_names_key_and_model() {
        let err = ApiError::InvalidField {
            field: "author".into(),
            model: "BlogPost",
        };
        assert_eq!(err.to_string(), "author not found on BlogPost");
    }

    #[test]
    fn validation_displays_message() {
        let err = ApiError::validation("title must be a string");
        assert_eq!(err.to_string(), "title must be a string");
        assert_eq!(err, ApiError::DataValidation("title must be a string".into()));
    }
}
