//! Request sequencing and divergence tracking for remotely mirrored state.
//!
//! Every remote call against a resource takes a [`Ticket`]. When the
//! response arrives it is applied only if the ticket is still the newest one
//! issued for that resource; an older response that lands late is dropped.
//! A resource is *unsynced* after a write failed remotely and was applied
//! locally instead; the next server-confirmed state clears the mark.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

/// Sequencing state for one resource.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: AtomicU64,
    in_flight: AtomicUsize,
    unsynced: AtomicBool,
}

impl RequestSequence {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            latest: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            unsynced: AtomicBool::new(false),
        }
    }

    /// Start a request. Any ticket issued earlier stops being current.
    pub fn begin(&self) -> Ticket<'_> {
        let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        Ticket { sequence: self, id }
    }

    /// Invalidate every outstanding ticket without starting a request.
    pub fn supersede(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }

    /// Whether any request is outstanding.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    #[must_use]
    pub fn is_unsynced(&self) -> bool {
        self.unsynced.load(Ordering::SeqCst)
    }

    /// Local state now differs from what the server last confirmed.
    pub fn mark_unsynced(&self) {
        self.unsynced.store(true, Ordering::SeqCst);
    }

    /// Local state was just replaced by the server's.
    pub fn mark_synced(&self) {
        self.unsynced.store(false, Ordering::SeqCst);
    }
}

/// Handle for one in-flight request. Dropping it ends the request.
#[derive(Debug)]
#[must_use = "a ticket ends its request when dropped"]
pub struct Ticket<'a> {
    sequence: &'a RequestSequence,
    id: u64,
}

impl Ticket<'_> {
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Whether no newer request has started since this one.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.sequence.latest.load(Ordering::SeqCst) == self.id
    }
}

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        self.sequence.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// What a store write ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The server accepted the write and its state was applied.
    Synced,
    /// No session token; the write was applied to local state only.
    Local,
    /// The server could not be reached or answered unusably; the write was
    /// applied locally and the resource is now unsynced.
    FellBack,
    /// The server refused the write; local state is unchanged.
    Rejected(String),
    /// A newer request for the resource started before this one finished;
    /// its response was dropped.
    Superseded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_ticket_supersedes_older() {
        let sequence = RequestSequence::new();
        let first = sequence.begin();
        assert!(first.is_current());

        let second = sequence.begin();
        assert!(!first.is_current());
        assert!(second.is_current());
        assert!(second.id() > first.id());
    }

    #[test]
    fn test_busy_until_all_tickets_dropped() {
        let sequence = RequestSequence::new();
        assert!(!sequence.is_busy());
        let a = sequence.begin();
        let b = sequence.begin();
        drop(a);
        assert!(sequence.is_busy());
        drop(b);
        assert!(!sequence.is_busy());
    }

    #[test]
    fn test_supersede_without_request() {
        let sequence = RequestSequence::new();
        let ticket = sequence.begin();
        sequence.supersede();
        assert!(!ticket.is_current());
    }

    #[test]
    fn test_unsynced_flag() {
        let sequence = RequestSequence::new();
        assert!(!sequence.is_unsynced());
        sequence.mark_unsynced();
        assert!(sequence.is_unsynced());
        sequence.mark_synced();
        assert!(!sequence.is_unsynced());
    }
}
