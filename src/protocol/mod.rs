//! Protocol message and frame types.
//!
//! This module defines what crosses the channel between the client and
//! the worker process.
//!
//! # Protocol Overview
//!
//! | Type | Direction | Purpose |
//! |------|-----------|---------|
//! | [`Request`] | Client → Worker | Identified request envelope |
//! | [`Response`] | Worker → Client | Response matched by `id` |
//! | [`Frame`] | Both | Wire unit, plain or compressed |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `frame` | Wire frames and the compression codec |
//! | `message` | Request and Response envelope types |

// ============================================================================
// Submodules
// ============================================================================

/// Wire frames and the compression codec.
pub mod frame;

/// Request and Response message types.
pub mod message;

// ============================================================================
// Re-exports
// ============================================================================

pub use frame::{COMPRESSED_MARKER, Frame, decode, encode};
pub use message::{Request, Response};
