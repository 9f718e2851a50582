//! Worker RPC - asynchronous request-response transport for worker processes.
//!
//! This library turns a raw "send a message / receive a message" channel
//! to a single worker process into an asynchronous request-response
//! primitive: each outbound request is tagged with an identifier,
//! registered, and later matched against the inbound response carrying
//! the same identifier. Unanswered requests resolve with a timeout error
//! instead of hanging forever.
//!
//! # Architecture
//!
//! - Requests register **before** any delivery attempt, so nothing is
//!   silently lost while the channel is absent or failing
//! - A periodic sweeper evicts pending requests older than the configured
//!   timeout and resolves them with a timeout error
//! - Large payloads can be gzip-compressed behind a size gate
//! - Worker exit or channel failure triggers a controlled shutdown
//!
//! # Quick Start
//!
//! ```no_run
//! use serde_json::json;
//! use tokio::process::Command;
//! use worker_rpc::{ClientTransport, ProcessChannel, Request, Result, TransportConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Spawn a worker speaking newline-delimited JSON over stdio
//!     let (channel, events) = ProcessChannel::spawn(Command::new("./worker"), false)?;
//!     let transport = ClientTransport::new(channel, events, TransportConfig::default())?;
//!
//!     // Send a request and wait for its correlated response
//!     let request = Request::new(json!({ "method": "ping" }))?;
//!     let response = transport.request(request).await?;
//!     println!("worker said: {}", response.get_string("result"));
//!
//!     transport.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Transport configuration |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Request correlation identifiers |
//! | [`protocol`] | Message envelopes and the frame codec |
//! | [`transport`] | Correlation transport and channel implementations |

// ============================================================================
// Modules
// ============================================================================

/// Transport configuration.
///
/// Use [`TransportConfig::new`] and the `with_*` builder methods.
pub mod config;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for request correlation.
pub mod identifiers;

/// Protocol message and frame types.
///
/// Envelope structs plus the plain/compressed wire codec.
pub mod protocol;

/// Transport layer.
///
/// The client transport, the channel contract, and the worker-process
/// channel implementation.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Configuration
pub use config::TransportConfig;

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::RequestId;

// Protocol types
pub use protocol::{Frame, Request, Response};

// Transport types
pub use transport::{
    Channel, ChannelEvent, ChannelEventSender, ChannelEvents, ClientTransport, EventHandler,
    ProcessChannel, SweptRequest, TransportEvent,
};
