//! Pending-request registry.
//!
//! Pure state: a map from request identifier to the pending entry that
//! will absorb the eventual outcome. The registry never performs I/O and
//! never delivers results itself; the event loop resolves entries it
//! removes, exactly once per entry.
//!
//! Identifiers are unique at any instant. Re-registering an id that is
//! still pending is rejected rather than silently displacing the prior
//! entry.

// ============================================================================
// Imports
// ============================================================================

use rustc_hash::FxHashMap;
use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::identifiers::RequestId;
use crate::protocol::{Request, Response};

// ============================================================================
// Types
// ============================================================================

/// Responder that delivers the request's outcome to the awaiting caller.
pub(crate) type Responder = oneshot::Sender<crate::error::Result<Response>>;

// ============================================================================
// PendingRequest
// ============================================================================

/// A registered request awaiting its response.
///
/// Owned exclusively by the registry from insertion until a matching
/// response arrives, the timeout sweep evicts it, or shutdown clears the
/// registry.
#[derive(Debug)]
pub(crate) struct PendingRequest {
    /// The request's correlation identifier.
    pub id: RequestId,

    /// The original request body.
    pub body: Request,

    /// Channel that delivers the outcome to the caller.
    pub responder: Responder,

    /// When the request was registered.
    pub enqueued_at: Instant,
}

impl PendingRequest {
    /// Creates a pending entry stamped with the current time.
    pub(crate) fn new(body: Request, responder: Responder) -> Self {
        Self {
            id: body.id.clone(),
            body,
            responder,
            enqueued_at: Instant::now(),
        }
    }
}

// ============================================================================
// PendingRegistry
// ============================================================================

/// Map of in-flight requests keyed by identifier.
#[derive(Default)]
pub(crate) struct PendingRegistry {
    entries: FxHashMap<RequestId, PendingRequest>,
}

impl PendingRegistry {
    /// Creates an empty registry.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers a pending request.
    ///
    /// # Errors
    ///
    /// Returns the rejected entry when the id is already pending; the
    /// existing entry is untouched and the caller decides how to resolve
    /// the rejected responder.
    pub(crate) fn insert(&mut self, pending: PendingRequest) -> Result<(), PendingRequest> {
        if self.entries.contains_key(&pending.id) {
            return Err(pending);
        }
        self.entries.insert(pending.id.clone(), pending);
        Ok(())
    }

    /// Removes and returns the entry for `id`, if one is pending.
    ///
    /// Resolving an absent id is a no-op by design: the response may have
    /// raced a timeout eviction or belong to no known request.
    pub(crate) fn resolve(&mut self, id: &RequestId) -> Option<PendingRequest> {
        self.entries.remove(id)
    }

    /// Removes and returns every entry older than `timeout` at `now`.
    ///
    /// Entries younger than the timeout are untouched.
    pub(crate) fn evict_expired(
        &mut self,
        now: Instant,
        timeout: std::time::Duration,
    ) -> Vec<PendingRequest> {
        let expired: Vec<RequestId> = self
            .entries
            .values()
            .filter(|entry| entry.enqueued_at + timeout < now)
            .map(|entry| entry.id.clone())
            .collect();

        expired
            .iter()
            .filter_map(|id| self.entries.remove(id))
            .collect()
    }

    /// Removes and returns all entries without delivering through them.
    pub(crate) fn clear(&mut self) -> Vec<PendingRequest> {
        self.entries.drain().map(|(_, entry)| entry).collect()
    }

    /// Returns the number of pending entries.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is pending.
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if `id` is currently pending.
    pub(crate) fn contains(&self, id: &RequestId) -> bool {
        self.entries.contains_key(id)
    }
}

// ============================================================================
// Tests
// ============================================================================
