//! Error types for the worker RPC transport.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use worker_rpc::{Request, Result};
//!
//! async fn example(transport: &worker_rpc::ClientTransport) -> Result<()> {
//!     let request = Request::new(serde_json::json!({ "method": "ping" }))?;
//!     let response = transport.request(request).await?;
//!     println!("worker said: {:?}", response);
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Channel | [`Error::Channel`], [`Error::ChannelClosed`], [`Error::ProcessLaunchFailed`] |
//! | Codec | [`Error::Encode`], [`Error::Decode`], [`Error::Json`], [`Error::Base64`] |
//! | Request | [`Error::RequestTimeout`], [`Error::DuplicateRequest`] |
//! | External | [`Error::Io`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use thiserror::Error;

use crate::identifiers::RequestId;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when transport configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Channel Errors
    // ========================================================================
    /// The underlying channel reported a failure.
    ///
    /// Surfaced as an `error` transport event and followed by forced
    /// shutdown. Never retried.
    #[error("Channel failure: {message}")]
    Channel {
        /// Description of the channel failure.
        message: String,
    },

    /// The channel is gone.
    ///
    /// Delivered to callers whose pending request was cleared by
    /// shutdown, and to `request` calls issued after shutdown.
    #[error("Channel closed")]
    ChannelClosed,

    /// Failed to launch the worker process.
    ///
    /// Returned when the worker process fails to start.
    #[error("Failed to launch worker: {message}")]
    ProcessLaunchFailed {
        /// Description of the launch failure.
        message: String,
    },

    // ========================================================================
    // Codec Errors
    // ========================================================================
    /// Outbound frame encoding failed.
    ///
    /// Reported as a channel-level `error` event; the pending request
    /// stays registered and resolves via timeout.
    #[error("Encode error: {message}")]
    Encode {
        /// Description of the encode failure.
        message: String,
    },

    /// Inbound frame decoding failed.
    ///
    /// Reported as a channel-level `error` event; no pending request is
    /// resolved by a malformed frame.
    #[error("Decode error: {message}")]
    Decode {
        /// Description of the decode failure.
        message: String,
    },

    // ========================================================================
    // Request Errors
    // ========================================================================
    /// A pending request exceeded the configured timeout.
    ///
    /// Synthesized by the sweeper and delivered through the request's
    /// responder, never raised.
    #[error("Request {request_id} timed out after {timeout_ms}ms")]
    RequestTimeout {
        /// The request ID that timed out.
        request_id: RequestId,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// A request reused an identifier that is still pending.
    ///
    /// Returned from `request` before anything is registered or sent.
    #[error("Duplicate request id: {request_id}")]
    DuplicateRequest {
        /// The identifier already in flight.
        request_id: RequestId,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Base64 decoding error on a compressed frame.
    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a channel failure error.
    #[inline]
    pub fn channel(message: impl Into<String>) -> Self {
        Self::Channel {
            message: message.into(),
        }
    }

    /// Creates a process launch failed error.
    #[inline]
    pub fn process_launch_failed(err: IoError) -> Self {
        Self::ProcessLaunchFailed {
            message: err.to_string(),
        }
    }

    /// Creates an encode error.
    #[inline]
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Creates a decode error.
    #[inline]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Creates a request timeout error.
    #[inline]
    pub fn request_timeout(request_id: RequestId, timeout_ms: u64) -> Self {
        Self::RequestTimeout {
            request_id,
            timeout_ms,
        }
    }

    /// Creates a duplicate request error.
    #[inline]
    pub fn duplicate_request(request_id: RequestId) -> Self {
        Self::DuplicateRequest { request_id }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::RequestTimeout { .. })
    }

    /// Returns `true` if this is a channel error.
    #[inline]
    #[must_use]
    pub fn is_channel_error(&self) -> bool {
        matches!(
            self,
            Self::Channel { .. } | Self::ChannelClosed | Self::ProcessLaunchFailed { .. }
        )
    }

    /// Returns `true` if this is a codec error.
    #[inline]
    #[must_use]
    pub fn is_codec_error(&self) -> bool {
        matches!(
            self,
            Self::Encode { .. } | Self::Decode { .. } | Self::Json(_) | Self::Base64(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
