//! Client transport and event loop.
//!
//! This module turns a raw send/receive channel into an asynchronous
//! request-response primitive: each outbound request is registered under
//! its identifier and later matched against the inbound response carrying
//! the same identifier; unanswered requests resolve with a timeout error.
//!
//! # Event Loop
//!
//! The transport spawns a tokio task that handles:
//!
//! - Inbound channel events (responses, worker exit, channel errors)
//! - Outbound requests from the API
//! - Periodic timeout sweeps over the pending registry
//! - The shutdown sequence
//!
//! All registry mutations are serialized through this one task; channel
//! events, commands and sweep ticks never race each other.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error, info, trace, warn};

use crate::config::TransportConfig;
use crate::error::{Error, Result};
use crate::identifiers::RequestId;
use crate::protocol::{self, Frame, Request, Response};
use crate::transport::channel::{Channel, ChannelEvent, ChannelEventSender, ChannelEvents};
use crate::transport::registry::{PendingRegistry, PendingRequest, Responder};

// ============================================================================
// Types
// ============================================================================

/// Transport event handler callback type.
///
/// Called for each observable transport event. Handlers run on the event
/// loop and must not block.
pub type EventHandler = Box<dyn Fn(&TransportEvent) + Send + Sync>;

// ============================================================================
// TransportEvent
// ============================================================================

/// A pending request evicted by a timeout sweep.
#[derive(Debug, Clone)]
pub struct SweptRequest {
    /// The evicted request's identifier.
    pub id: RequestId,
    /// The original request body.
    pub body: Request,
}

/// Observable transport events.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// The worker process terminated. Followed by [`TransportEvent::Shutdown`].
    Exit {
        /// Process exit code, if the worker exited normally.
        code: Option<i32>,
        /// Terminating signal number, if the worker was signalled (unix).
        signal: Option<i32>,
    },

    /// A channel, encode, or decode failure. Channel failures are
    /// followed by [`TransportEvent::Shutdown`]; codec failures are not.
    Error {
        /// Description of the failure.
        message: String,
    },

    /// A sweep completed. Emitted once per tick with the batch of evicted
    /// requests, empty when nothing expired.
    Sweep {
        /// Requests evicted in this tick.
        evicted: Vec<SweptRequest>,
    },

    /// The transport finished its shutdown sequence.
    Shutdown,
}

// ============================================================================
// TransportCommand
// ============================================================================

/// Internal commands for the event loop.
enum TransportCommand {
    /// Register and send a request.
    Send {
        request: Request,
        responder: Responder,
    },
    /// Shut the transport down.
    Shutdown { done: oneshot::Sender<()> },
}

// ============================================================================
// ClientTransport
// ============================================================================

/// Client-side RPC correlation transport over a worker channel.
///
/// Wraps the underlying bidirectional channel, correlating requests with
/// responses by identifier, sweeping timed-out requests, and handling the
/// worker lifecycle.
///
/// # Thread Safety
///
/// `ClientTransport` is `Send + Sync` and can be shared across tasks.
/// All operations are non-blocking.
pub struct ClientTransport {
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<TransportCommand>,
    /// Pending registry (shared with event loop).
    registry: Arc<Mutex<PendingRegistry>>,
    /// Event handler (shared with event loop).
    event_handler: Arc<Mutex<Option<EventHandler>>>,
    /// Immutable transport configuration.
    config: TransportConfig,
}

impl Clone for ClientTransport {
    fn clone(&self) -> Self {
        Self {
            command_tx: self.command_tx.clone(),
            registry: Arc::clone(&self.registry),
            event_handler: Arc::clone(&self.event_handler),
            config: self.config.clone(),
        }
    }
}

impl ClientTransport {
    /// Creates a transport over a live channel.
    ///
    /// Spawns the event loop task; the transport is immediately active
    /// and the sweeper is running.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid.
    pub fn new(
        channel: impl Channel,
        events: ChannelEvents,
        config: TransportConfig,
    ) -> Result<Self> {
        Self::build(Some(Box::new(channel)), events, None, config)
    }

    /// Creates a transport with no channel attached.
    ///
    /// Requests are accepted and tracked but never delivered; each one
    /// resolves via timeout. Useful when the channel's fate is decided
    /// elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid.
    pub fn detached(config: TransportConfig) -> Result<Self> {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self::build(None, events_rx, Some(events_tx), config)
    }

    fn build(
        channel: Option<Box<dyn Channel>>,
        events: ChannelEvents,
        events_tx: Option<ChannelEventSender>,
        config: TransportConfig,
    ) -> Result<Self> {
        config.validate()?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let registry = Arc::new(Mutex::new(PendingRegistry::new()));
        let event_handler: Arc<Mutex<Option<EventHandler>>> = Arc::new(Mutex::new(None));

        let event_loop = EventLoop {
            channel,
            events,
            _events_tx: events_tx,
            command_rx,
            registry: Arc::clone(&registry),
            event_handler: Arc::clone(&event_handler),
            config: config.clone(),
        };
        tokio::spawn(event_loop.run());

        Ok(Self {
            command_tx,
            registry,
            event_handler,
            config,
        })
    }

    /// Sends a request and waits for the correlated response.
    ///
    /// The request is registered **before** any delivery attempt, so a
    /// request issued while the channel is absent or about to fail is
    /// still tracked and resolves via timeout instead of being lost.
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateRequest`] if the id is already in flight
    /// - [`Error::RequestTimeout`] if no response arrives in time
    /// - [`Error::ChannelClosed`] if shutdown occurs first, or the
    ///   transport is already shut down
    pub async fn request(&self, request: Request) -> Result<Response> {
        let (responder, outcome) = oneshot::channel();

        self.command_tx
            .send(TransportCommand::Send { request, responder })
            .map_err(|_| Error::ChannelClosed)?;

        outcome.await.map_err(|_| Error::ChannelClosed)?
    }

    /// Shuts the transport down and waits for cleanup to finish.
    ///
    /// Stops the sweeper, clears the pending registry (awaiting callers
    /// observe [`Error::ChannelClosed`]), and terminates the channel:
    /// the worker is killed when `kill_worker_on_shutdown` is set,
    /// disconnected gracefully otherwise. Idempotent.
    pub async fn shutdown(&self) {
        let (done, finished) = oneshot::channel();
        if self
            .command_tx
            .send(TransportCommand::Shutdown { done })
            .is_ok()
        {
            let _ = finished.await;
        }
    }

    /// Sets the event handler callback.
    ///
    /// The handler is called for each observable transport event.
    pub fn set_event_handler(&self, handler: EventHandler) {
        let mut guard = self.event_handler.lock();
        *guard = Some(handler);
    }

    /// Clears the event handler.
    pub fn clear_event_handler(&self) {
        let mut guard = self.event_handler.lock();
        *guard = None;
    }

    /// Returns the number of pending requests.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.registry.lock().len()
    }

    /// Returns `true` while the event loop is running.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.command_tx.is_closed()
    }

    /// Returns the transport configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }
}

// ============================================================================
// EventLoop
// ============================================================================

/// State owned by the spawned event-loop task.
struct EventLoop {
    /// The attached channel, released on shutdown.
    channel: Option<Box<dyn Channel>>,
    /// Inbound channel events.
    events: ChannelEvents,
    /// Keeps a detached transport's event stream open.
    _events_tx: Option<ChannelEventSender>,
    /// Commands from the API handle.
    command_rx: mpsc::UnboundedReceiver<TransportCommand>,
    /// Pending registry (shared with the handle).
    registry: Arc<Mutex<PendingRegistry>>,
    /// Event handler (shared with the handle).
    event_handler: Arc<Mutex<Option<EventHandler>>>,
    /// Immutable transport configuration.
    config: TransportConfig,
}

impl EventLoop {
    /// Runs until shutdown, a channel exit/error, or handle drop.
    async fn run(mut self) {
        let mut sweep = interval_at(
            Instant::now() + self.config.sweep_interval,
            self.config.sweep_interval,
        );
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                // Inbound events from the channel
                event = self.events.recv() => {
                    match event {
                        Some(ChannelEvent::Message(frame)) => {
                            self.handle_message(frame).await;
                        }

                        Some(ChannelEvent::Exit { code, signal }) => {
                            debug!(?code, ?signal, "Worker exited");
                            self.emit(&TransportEvent::Exit { code, signal });
                            self.run_shutdown(None).await;
                            break;
                        }

                        Some(ChannelEvent::Error(message)) => {
                            error!(message, "Channel error");
                            self.emit(&TransportEvent::Error {
                                message: message.clone(),
                            });
                            self.run_shutdown(None).await;
                            break;
                        }

                        None => {
                            debug!("Channel event stream ended");
                            self.run_shutdown(None).await;
                            break;
                        }
                    }
                }

                // Commands from the API handle
                command = self.command_rx.recv() => {
                    match command {
                        Some(TransportCommand::Send { request, responder }) => {
                            self.handle_send(request, responder).await;
                        }

                        Some(TransportCommand::Shutdown { done }) => {
                            debug!("Shutdown command received");
                            self.run_shutdown(Some(done)).await;
                            break;
                        }

                        None => {
                            debug!("Transport handle dropped");
                            self.run_shutdown(None).await;
                            break;
                        }
                    }
                }

                // Timeout sweeper
                _ = sweep.tick() => {
                    self.sweep();
                }
            }
        }

        debug!("Event loop terminated");
    }

    /// Handles an inbound frame: decode, correlate, resolve.
    async fn handle_message(&mut self, frame: Frame) {
        let response = match protocol::decode(frame).await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "Failed to decode inbound frame");
                self.emit(&TransportEvent::Error {
                    message: err.to_string(),
                });
                return;
            }
        };

        let entry = self.registry.lock().resolve(&response.id);
        match entry {
            Some(entry) => {
                trace!(id = %response.id, "Response correlated");
                let _ = entry.responder.send(Ok(response));
            }
            None => {
                // Already resolved, already evicted, or unknown id.
                trace!(id = %response.id, "Response matches no pending request, discarded");
            }
        }
    }

    /// Handles a send command: register first, then attempt delivery.
    async fn handle_send(&mut self, request: Request, responder: Responder) {
        let request_id = request.id.clone();

        let pending = PendingRequest::new(request.clone(), responder);
        if let Err(rejected) = self.registry.lock().insert(pending) {
            warn!(id = %request_id, "Rejected duplicate request id");
            let PendingRequest { id, responder, .. } = rejected;
            let _ = responder.send(Err(Error::duplicate_request(id)));
            return;
        }

        let Some(channel) = self.channel.as_mut() else {
            trace!(id = %request_id, "No channel attached, request awaits timeout");
            return;
        };

        let frame = match protocol::encode(
            &request,
            self.config.compressed,
            self.config.compress_length,
        )
        .await
        {
            Ok(frame) => frame,
            Err(err) => {
                warn!(id = %request_id, error = %err, "Encode failed, request left pending");
                self.emit(&TransportEvent::Error {
                    message: err.to_string(),
                });
                return;
            }
        };

        if let Err(err) = channel.send(frame).await {
            warn!(id = %request_id, error = %err, "Send failed, request left pending");
            self.emit(&TransportEvent::Error {
                message: err.to_string(),
            });
            return;
        }

        trace!(id = %request_id, "Request sent");
    }

    /// Evicts expired entries and emits the batch notification.
    fn sweep(&mut self) {
        let now = Instant::now();
        let evicted = self
            .registry
            .lock()
            .evict_expired(now, self.config.request_timeout);

        let timeout_ms = self.config.request_timeout_ms();
        let mut swept = Vec::with_capacity(evicted.len());
        for entry in evicted {
            debug!(id = %entry.id, timeout_ms, "Request timed out");
            let PendingRequest {
                id,
                body,
                responder,
                ..
            } = entry;
            let _ = responder.send(Err(Error::request_timeout(id.clone(), timeout_ms)));
            swept.push(SweptRequest { id, body });
        }

        if !swept.is_empty() {
            warn!(count = swept.len(), "Swept timed-out requests");
        }

        // One batch per tick, empty batches included.
        self.emit(&TransportEvent::Sweep { evicted: swept });
    }

    /// Runs the shutdown sequence: clear registry, release the channel,
    /// notify observers, ack the caller.
    async fn run_shutdown(&mut self, done: Option<oneshot::Sender<()>>) {
        let cleared = self.registry.lock().clear();
        if !cleared.is_empty() {
            debug!(count = cleared.len(), "Cleared pending requests on shutdown");
        }
        // Dropping the cleared entries closes their responders; awaiting
        // callers observe `Error::ChannelClosed`.
        drop(cleared);

        if let Some(mut channel) = self.channel.take() {
            if self.config.kill_worker_on_shutdown {
                if let Err(err) = channel.kill().await {
                    debug!(error = %err, "Failed to kill worker");
                }
            } else if let Err(err) = channel.disconnect().await {
                debug!(error = %err, "Failed to disconnect channel");
            }
        }

        self.emit(&TransportEvent::Shutdown);

        if let Some(done) = done {
            let _ = done.send(());
        }

        info!("Transport shut down");
    }

    /// Invokes the event handler, if one is set.
    fn emit(&self, event: &TransportEvent) {
        let handler = self.event_handler.lock();
        if let Some(ref handler) = *handler {
            handler(event);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
