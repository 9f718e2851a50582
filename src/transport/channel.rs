//! Channel contract for the worker link.
//!
//! The transport is agnostic to how frames physically reach the worker.
//! Implementations provide the outbound half as a [`Channel`] and deliver
//! the inbound half as a stream of [`ChannelEvent`]s over an unbounded
//! mpsc channel. The shipped implementation is
//! [`ProcessChannel`](crate::transport::ProcessChannel); tests plug in
//! in-memory channels.

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::protocol::Frame;

// ============================================================================
// Types
// ============================================================================

/// Receiving half of a channel's event stream.
pub type ChannelEvents = mpsc::UnboundedReceiver<ChannelEvent>;

/// Sending half of a channel's event stream.
pub type ChannelEventSender = mpsc::UnboundedSender<ChannelEvent>;

// ============================================================================
// ChannelEvent
// ============================================================================

/// An event produced by the underlying channel.
#[derive(Debug)]
pub enum ChannelEvent {
    /// An inbound frame arrived.
    Message(Frame),

    /// The worker terminated.
    Exit {
        /// Process exit code, if the worker exited normally.
        code: Option<i32>,
        /// Terminating signal number, if the worker was signalled (unix).
        signal: Option<i32>,
    },

    /// The channel failed.
    Error(String),
}

// ============================================================================
// Channel
// ============================================================================

/// Outbound half of the bidirectional worker link.
///
/// The transport holds at most one channel at a time and releases it on
/// shutdown, either forcefully ([`kill`](Channel::kill)) or gracefully
/// ([`disconnect`](Channel::disconnect)) depending on configuration.
#[async_trait]
pub trait Channel: Send + 'static {
    /// Sends a frame to the worker.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be delivered.
    async fn send(&mut self, frame: Frame) -> Result<()>;

    /// Gracefully disconnects, leaving the worker running.
    ///
    /// # Errors
    ///
    /// Returns an error if the disconnect fails.
    async fn disconnect(&mut self) -> Result<()>;

    /// Forcefully terminates the worker.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker cannot be killed.
    async fn kill(&mut self) -> Result<()>;
}

// ============================================================================
// Tests
// ============================================================================
