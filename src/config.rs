//! Transport configuration.
//!
//! Provides a type-safe interface for configuring the client transport:
//! request timeout, sweep cadence, compression, and worker teardown
//! behavior. The configuration is immutable for the transport's lifetime.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use worker_rpc::TransportConfig;
//!
//! let config = TransportConfig::new()
//!     .with_request_timeout(Duration::from_secs(10))
//!     .with_sweep_interval(Duration::from_millis(250))
//!     .with_compression(1024);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default time a pending request may wait before the sweeper evicts it.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default cadence of the timeout sweeper.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

// ============================================================================
// TransportConfig
// ============================================================================

/// Client transport configuration.
///
/// Controls timeout sweeping, payload compression, and what happens to
/// the worker process on shutdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Forcibly terminate the worker process on shutdown.
    ///
    /// When `false`, shutdown disconnects the channel gracefully and
    /// leaves the worker running.
    pub kill_worker_on_shutdown: bool,

    /// Time a pending request may wait for its response.
    pub request_timeout: Duration,

    /// Cadence at which the sweeper scans for expired requests.
    pub sweep_interval: Duration,

    /// Encode frames in the compressed textual format.
    pub compressed: bool,

    /// Size gate in bytes for compression.
    ///
    /// Payloads whose serialized length exceeds this value are
    /// gzip-compressed; `0` compresses unconditionally. Ignored unless
    /// `compressed` is set.
    pub compress_length: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            kill_worker_on_shutdown: true,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            compressed: false,
            compress_length: 0,
        }
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl TransportConfig {
    /// Creates a configuration with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl TransportConfig {
    /// Sets whether the worker process is killed on shutdown.
    #[inline]
    #[must_use]
    pub fn with_kill_worker_on_shutdown(mut self, kill: bool) -> Self {
        self.kill_worker_on_shutdown = kill;
        self
    }

    /// Sets the pending-request timeout.
    #[inline]
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the sweeper cadence.
    #[inline]
    #[must_use]
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Enables compressed framing with the given size gate.
    ///
    /// Payloads longer than `compress_length` bytes are gzip-compressed;
    /// pass `0` to compress every payload.
    #[inline]
    #[must_use]
    pub fn with_compression(mut self, compress_length: usize) -> Self {
        self.compressed = true;
        self.compress_length = compress_length;
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

impl TransportConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if either duration is zero.
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout.is_zero() {
            return Err(Error::config("request timeout must be non-zero"));
        }
        if self.sweep_interval.is_zero() {
            return Err(Error::config("sweep interval must be non-zero"));
        }
        Ok(())
    }

    /// Returns the request timeout in whole milliseconds.
    #[inline]
    #[must_use]
    pub fn request_timeout_ms(&self) -> u64 {
        self.request_timeout.as_millis() as u64
    }
}

// ============================================================================
// Tests
// ============================================================================
