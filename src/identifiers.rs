//! Type-safe identifiers for request correlation.
//!
//! A [`RequestId`] is the token that matches an outbound request to its
//! eventual inbound response. Identifiers are assigned by the request
//! originator; [`RequestId::generate`] produces a fresh UUID-v4 token for
//! callers that do not bring their own scheme.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// RequestId
// ============================================================================

/// Unique token correlating a request with its response.
///
/// Serializes as the bare JSON string, so the wire shape matches peers
/// that treat the id as an opaque text field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Creates an identifier from a caller-supplied token.
    #[inline]
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Generates a fresh UUID-v4 identifier.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

impl From<String> for RequestId {
    fn from(token: String) -> Self {
        Self(token)
    }
}

// ============================================================================
// Tests
// ============================================================================
