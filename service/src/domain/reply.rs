//! [`Reply`] definitions.

use serde::{Deserialize, Serialize};

/// Outcome of a mutating API call that never fails outright.
///
/// A failed call is turned into a [`Reply`] with `success: false` and a
/// message the user can be shown.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Reply {
    /// Indicator whether the call succeeded.
    pub success: bool,

    /// Message from the API (or about the failure).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Payload returned by the API.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub data: serde_json::Value,
}

impl Reply {
    /// Creates a failed [`Reply`] with the provided `message`.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: serde_json::Value::Null,
        }
    }

    /// Creates a [`Reply`] out of a successful API response `body`.
    ///
    /// The API's own `success` flag and `message` are respected when
    /// present, and a `data` envelope is unwrapped.
    #[must_use]
    pub fn from_body(body: serde_json::Value) -> Self {
        let success = body
            .get("success")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(true);
        let message = body
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map(ToOwned::to_owned);
        let data = match body {
            serde_json::Value::Object(mut obj) if obj.contains_key("data") => {
                obj.remove("data").unwrap_or_default()
            }
            other => other,
        };

        Self {
            success,
            message,
            data,
        }
    }
}
