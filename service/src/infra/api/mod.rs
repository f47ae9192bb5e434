//! [`Api`]-related definitions.

#[cfg(test)]
pub(crate) mod fake;
#[cfg(feature = "http")]
pub mod http;

use std::time::Duration;

use derive_more::{Display, Error as StdError, From};

use crate::domain::session::Token;

#[cfg(feature = "http")]
pub use self::http::Http;

/// Call to the platform REST API.
pub use common::Handler as Api;

/// HTTP method of a [`Call`].
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Method {
    /// `GET` method.
    #[display("GET")]
    Get,

    /// `POST` method.
    #[display("POST")]
    Post,

    /// `PUT` method.
    #[display("PUT")]
    Put,

    /// `DELETE` method.
    #[display("DELETE")]
    Delete,
}

/// Single request to the platform REST API.
#[derive(Clone, Debug)]
pub struct Call {
    /// [`Method`] of this [`Call`].
    pub method: Method,

    /// Path relative to the API base URL, without a leading slash.
    pub path: String,

    /// Query parameters of this [`Call`].
    pub query: Vec<(String, String)>,

    /// Bearer [`Token`] to authorize this [`Call`] with.
    pub bearer: Option<Token>,

    /// [`Body`] of this [`Call`].
    pub body: Body,

    /// Timeout overriding the client default.
    pub timeout: Option<Duration>,
}

impl Call {
    /// Creates a new [`Call`] without any body, query or credentials.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            bearer: None,
            body: Body::Empty,
            timeout: None,
        }
    }

    /// Sets the provided JSON `body` for this [`Call`].
    #[must_use]
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Body::Json(body);
        self
    }

    /// Sets the provided bearer [`Token`] for this [`Call`].
    #[must_use]
    pub fn bearer(mut self, token: Option<Token>) -> Self {
        self.bearer = token;
        self
    }
}

/// Body of a [`Call`].
#[derive(Clone, Debug, Default)]
pub enum Body {
    /// No body.
    #[default]
    Empty,

    /// JSON body.
    Json(serde_json::Value),

    /// `multipart/form-data` body made of [`Upload`]s.
    Multipart(Vec<Upload>),
}

/// File part of a [`Body::Multipart`].
#[derive(Clone, derive_more::Debug)]
pub struct Upload {
    /// Form field name of this [`Upload`].
    pub field: String,

    /// Name of the uploaded file.
    pub file_name: String,

    /// MIME type of the uploaded file, if known.
    pub mime: Option<String>,

    /// Contents of the uploaded file.
    #[debug("{} bytes", bytes.len())]
    pub bytes: Vec<u8>,
}

/// [`Api`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// API responded with a non-success status.
    #[display(
        "API responded with `{status}`{}",
        message.as_ref().map(|m| format!(": {m}")).unwrap_or_default(),
    )]
    #[from(ignore)]
    Status {
        /// HTTP status code of the response.
        status: u16,

        /// Message extracted from the response body, if any.
        message: Option<String>,
    },

    /// API responded with a body that isn't JSON.
    #[display("Failed to decode API response: {_0}")]
    Decode(serde_json::Error),

    /// Request couldn't be sent or its response couldn't be read.
    #[cfg(feature = "http")]
    #[display("API request failed: {_0}")]
    Transport(reqwest::Error),
}

impl Error {
    /// Returns the human-readable message explaining this [`Error`].
    ///
    /// Prefers the message the API itself provided.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Status {
                message: Some(m), ..
            } => m.clone(),
            Self::Status { message: None, .. } | Self::Decode(_) => {
                self.to_string()
            }
            #[cfg(feature = "http")]
            Self::Transport(_) => self.to_string(),
        }
    }
}

/// Extracts the error message from the provided API response `body`.
#[must_use]
pub fn error_message(body: &serde_json::Value) -> Option<String> {
    ["message", "error"]
        .into_iter()
        .find_map(|f| body.get(f).and_then(serde_json::Value::as_str))
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod spec {
    use serde_json::json;

    use super::{error_message, Error};

    #[test]
    fn extracts_error_message() {
        assert_eq!(
            error_message(&json!({"message": "Invalid credentials"})),
            Some("Invalid credentials".to_owned()),
        );
        assert_eq!(
            error_message(&json!({"error": "Forbidden"})),
            Some("Forbidden".to_owned()),
        );
        assert_eq!(error_message(&json!({"message": 42})), None);
        assert_eq!(error_message(&json!([])), None);
    }

    #[test]
    fn prefers_api_message() {
        let err = Error::Status {
            status: 401,
            message: Some("Invalid credentials".to_owned()),
        };
        assert_eq!(err.message(), "Invalid credentials");

        let err = Error::Status {
            status: 502,
            message: None,
        };
        assert_eq!(err.message(), "API responded with `502`");
    }
}
