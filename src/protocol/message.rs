//! Request and Response message types.
//!
//! Defines the envelope format exchanged with the worker: a correlation
//! identifier plus an arbitrary JSON object body, flattened so the wire
//! shape is a single object carrying `"id"` beside the caller's fields.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::identifiers::RequestId;

// ============================================================================
// Request
// ============================================================================

/// An outbound request to the worker.
///
/// # Format
///
/// ```json
/// {
///   "id": "uuid",
///   "method": "echo",
///   "params": [1, 2, 3]
/// }
/// ```
///
/// Everything besides `id` is the caller's opaque body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Unique identifier for request/response correlation.
    pub id: RequestId,

    /// Opaque request body, flattened beside `id` on the wire.
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl Request {
    /// Creates a request with an auto-generated ID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if `body` is not a JSON object.
    pub fn new(body: Value) -> Result<Self> {
        Self::with_id(RequestId::generate(), body)
    }

    /// Creates a request with a caller-assigned ID.
    ///
    /// A stray `"id"` key inside `body` is dropped so the envelope field
    /// stays the single source of truth on the wire.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if `body` is not a JSON object.
    pub fn with_id(id: RequestId, body: Value) -> Result<Self> {
        match body {
            Value::Object(mut map) => {
                map.remove("id");
                Ok(Self { id, body: map })
            }
            other => Err(Error::encode(format!(
                "request body must be a JSON object, got {other}"
            ))),
        }
    }

    /// Creates a request from pre-split parts.
    #[inline]
    #[must_use]
    pub fn from_parts(id: RequestId, body: Map<String, Value>) -> Self {
        Self { id, body }
    }
}

// ============================================================================
// Response
// ============================================================================

/// An inbound response from the worker.
///
/// # Format
///
/// ```json
/// {
///   "id": "uuid",
///   "result": { ... }
/// }
/// ```
///
/// A response is matched to its request purely by `id`; the rest of the
/// object is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Matches the originating request's `id`.
    pub id: RequestId,

    /// Opaque response body, flattened beside `id` on the wire.
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl Response {
    /// Creates a response from pre-split parts.
    #[inline]
    #[must_use]
    pub fn from_parts(id: RequestId, body: Map<String, Value>) -> Self {
        Self { id, body }
    }

    /// Gets a string value from the body.
    ///
    /// Returns empty string if key not found or not a string.
    #[inline]
    #[must_use]
    pub fn get_string(&self, key: &str) -> String {
        self.body
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    }

    /// Gets a u64 value from the body.
    ///
    /// Returns 0 if key not found or not a number.
    #[inline]
    #[must_use]
    pub fn get_u64(&self, key: &str) -> u64 {
        self.body
            .get(key)
            .and_then(|v| v.as_u64())
            .unwrap_or_default()
    }

    /// Gets a boolean value from the body.
    ///
    /// Returns false if key not found or not a boolean.
    #[inline]
    #[must_use]
    pub fn get_bool(&self, key: &str) -> bool {
        self.body
            .get(key)
            .and_then(|v| v.as_bool())
            .unwrap_or_default()
    }

    /// Returns the in-band error message, if the worker reported one.
    #[inline]
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error").and_then(|v| v.as_str())
    }

    /// Returns `true` if the worker reported an in-band error.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.body.contains_key("error")
    }
}

// ============================================================================
// Tests
// ============================================================================
