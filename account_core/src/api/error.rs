use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Easy alias for error handling
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can happen while processing requests
#[derive(Debug, Error)]
pub enum Error {
    /// We couldn't parse a URL, for example if the base URL was invalid.
    #[error("URL error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// We couldn't reach the server at all, or the connection broke while we
    /// were reading the response.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with something other than a 2xx. The body is kept
    /// exactly as we got it so callers can decide how to interpret it.
    #[error("server responded with {status}")]
    Status {
        /// The status code the server returned
        status: StatusCode,

        /// The raw response body
        body: String,
    },

    /// The server said everything was fine but sent a body we couldn't read
    /// (or we couldn't encode a request body.)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// The HTTP status, if the server got far enough to send one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(err) => err.status(),
            Self::UrlParse(_) | Self::Json(_) => None,
        }
    }

    /// The raw body of an error response.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    /// The human-readable message in an error body shaped like
    /// `{"value": "..."}`.
    pub fn message(&self) -> Option<String> {
        let body: ValueBody = serde_json::from_str(self.body()?).ok()?;

        body.value
    }

    /// Per-field errors in a body shaped like
    /// `{"field_errors": {"email": {"user_message": "..."}}}`. Empty if the
    /// body isn't shaped that way.
    pub fn field_errors(&self) -> BTreeMap<String, FieldError> {
        self.body()
            .and_then(|body| serde_json::from_str::<FieldErrorsBody>(body).ok())
            .map(|body| body.field_errors)
            .unwrap_or_default()
    }
}

/// An error body carrying a single message.
#[derive(Debug, Deserialize)]
struct ValueBody {
    /// The message.
    value: Option<String>,
}

/// An error body carrying validation errors for individual fields.
#[derive(Debug, Deserialize)]
struct FieldErrorsBody {
    /// Errors, keyed by field name.
    field_errors: BTreeMap<String, FieldError>,
}

/// What went wrong with a single field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldError {
    /// Safe to show to the user.
    #[serde(default)]
    pub user_message: Option<String>,

    /// Meant for whoever is debugging the integration.
    #[serde(default)]
    pub developer_message: Option<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    fn status_error(body: &str) -> Error {
        Error::Status {
            status: StatusCode::BAD_REQUEST,
            body: body.to_string(),
        }
    }

    #[test]
    fn message_reads_value() {
        let err = status_error(r#"{"value": "Email already in use"}"#);

        assert_eq!(err.message().as_deref(), Some("Email already in use"));
    }

    #[test]
    fn message_is_none_for_html() {
        let err = status_error("<html>nope</html>");

        assert_eq!(err.message(), None);
    }

    #[test]
    fn field_errors_are_decoded() {
        let err = status_error(
            r#"{"field_errors": {"email": {"user_message": "taken", "developer_message": "dupe"}}}"#,
        );

        let errors = err.field_errors();

        assert_eq!(
            errors.get("email"),
            Some(&FieldError {
                user_message: Some("taken".to_string()),
                developer_message: Some("dupe".to_string()),
            })
        );
    }

    #[test]
    fn field_errors_empty_without_status() {
        let err = Error::UrlParse(url::ParseError::EmptyHost);

        assert!(err.field_errors().is_empty());
        assert_eq!(err.status(), None);
    }
}
