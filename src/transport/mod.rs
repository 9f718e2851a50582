//! Transport layer: correlation, sweeping, worker lifecycle.
//!
//! This module turns a raw bidirectional channel to a worker process into
//! an asynchronous request-response primitive.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐                          ┌─────────────────┐
//! │  ClientTransport │        Channel           │  Worker         │
//! │                  │                          │  Process        │
//! │  PendingRegistry │─────── send(frame) ─────►│                 │
//! │  Sweeper         │◄────── message/exit ─────│  stdio / other  │
//! │  Event loop      │        /error events     │                 │
//! └──────────────────┘                          └─────────────────┘
//! ```
//!
//! # Request Lifecycle
//!
//! 1. `ClientTransport::request` - register the pending entry, then send
//! 2. Inbound frame - decode, match by id, resolve the awaiting caller
//! 3. Sweep tick - evict entries older than the timeout
//! 4. `ClientTransport::shutdown` - stop sweeping, clear, release channel
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `channel` | Channel trait and event contract |
//! | `client` | Client transport and event loop |
//! | `process` | Worker-process channel over stdio |
//! | `registry` | Pending-request registry |

// ============================================================================
// Submodules
// ============================================================================

/// Channel contract for the worker link.
pub mod channel;

/// Client transport and event loop.
pub mod client;

/// Worker process channel.
pub mod process;

/// Pending-request registry.
pub(crate) mod registry;

// ============================================================================
// Re-exports
// ============================================================================

pub use channel::{Channel, ChannelEvent, ChannelEventSender, ChannelEvents};
pub use client::{ClientTransport, EventHandler, SweptRequest, TransportEvent};
pub use process::ProcessChannel;
