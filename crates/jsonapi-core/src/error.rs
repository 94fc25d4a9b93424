//! JSON:API error object model.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where, within a request, an error occurred.
///
/// A resource (body) error carries a JSON pointer into the request document;
/// a query error carries the offending query parameter name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSource {
    /// JSON pointer into the request document (e.g. `/data/attributes/title`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,
    /// Query parameter name (e.g. `filter`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

impl ErrorSource {
    /// Create a source pointing into the request document.
    pub fn pointer(pointer: impl Into<String>) -> Self {
        Self {
            pointer: Some(pointer.into()),
            parameter: None,
        }
    }

    /// Create a source naming a query parameter.
    pub fn parameter(parameter: impl Into<String>) -> Self {
        Self {
            pointer: None,
            parameter: Some(parameter.into()),
        }
    }
}

/// A single JSON:API error object.
///
/// Serializes to the standard wire shape:
///
/// ```json
/// {
///   "status": "422",
///   "title": "Unprocessable Entity",
///   "detail": "The title field is required.",
///   "source": {"pointer": "/data/attributes/title"}
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    /// HTTP status code, serialized as a string per the JSON:API spec
    #[serde(with = "status_code")]
    pub status: StatusCode,
    /// Short, human-readable summary of the problem type
    pub title: String,
    /// Human-readable explanation specific to this occurrence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Application-specific error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Source locator for the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ErrorSource>,
    /// Non-standard meta information (e.g. rule failure diagnostics)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl ErrorObject {
    /// Create an error with a status and its canonical title.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            title: status
                .canonical_reason()
                .unwrap_or("Unknown Error")
                .to_string(),
            detail: None,
            code: None,
            source: None,
            meta: None,
        }
    }

    /// Create a 422 Unprocessable Entity error for a resource document.
    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY).with_detail(detail)
    }

    /// Create a 400 Bad Request error for an invalid query parameter.
    pub fn invalid_query_parameter(detail: impl Into<String>) -> Self {
        let mut error = Self::new(StatusCode::BAD_REQUEST).with_detail(detail);
        error.title = "Invalid Query Parameter".to_string();
        error
    }

    /// Set the detail message.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set the application-specific code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set the source to a JSON pointer.
    pub fn with_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.source = Some(ErrorSource::pointer(pointer));
        self
    }

    /// Set the source to a query parameter name.
    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.source = Some(ErrorSource::parameter(parameter));
        self
    }

    /// Attach meta information.
    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

impl std::fmt::Display for ErrorObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{} {}: {}", self.status.as_str(), self.title, detail),
            None => write!(f, "{} {}", self.status.as_str(), self.title),
        }
    }
}

impl std::error::Error for ErrorObject {}

/// Serde adapter serializing [`StatusCode`] as a numeric string.
mod status_code {
    use http::StatusCode;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(status.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<StatusCode, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<u16>()
            .ok()
            .and_then(|code| StatusCode::from_u16(code).ok())
            .ok_or_else(|| de::Error::custom(format!("invalid status code `{raw}`")))
    }
}
