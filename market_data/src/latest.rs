//! "Last request wins" slot for superseding fetches.
//!
//! Every fetch takes a [`Ticket`] from [`LatestSlot::begin`] before it goes out.
//! When the response arrives it is offered back with [`LatestSlot::publish`];
//! the value is stored only if no newer fetch has been started in the
//! meantime. A slow response for an old symbol therefore never replaces the
//! data of the symbol the user switched to.
//!
//! Readers get the last published value through an `arc-swap` snapshot, so
//! reads never block writers.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use arc_swap::ArcSwapOption;
use tracing::debug;

/// Identifies one fetch started against a [`LatestSlot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// A value together with the ticket of the fetch that produced it.
#[derive(Debug)]
pub struct Published<T> {
    pub ticket: Ticket,
    pub value: T,
}

/// Holds the newest published result of a superseding fetch.
#[derive(Debug)]
pub struct LatestSlot<T> {
    generation: AtomicU64,
    current: ArcSwapOption<Published<T>>,
}

impl<T> Default for LatestSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LatestSlot<T> {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            current: ArcSwapOption::empty(),
        }
    }

    /// Starts a new fetch, superseding every ticket handed out before.
    pub fn begin(&self) -> Ticket {
        Ticket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// `true` while no newer fetch has been started.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Stores `value` if `ticket` is still the newest fetch.
    ///
    /// Returns `false` (and drops `value`) for superseded tickets.
    pub fn publish(&self, ticket: Ticket, value: T) -> bool {
        if !self.is_current(ticket) {
            debug!(ticket = ticket.0, "discarding superseded response");
            return false;
        }

        let fresh = Arc::new(Published { ticket, value });
        let mut applied = false;
        self.current.rcu(|current| match current {
            // A newer ticket won the race between the check above and the swap.
            Some(existing) if existing.ticket > ticket => {
                applied = false;
                Some(Arc::clone(existing))
            }
            _ => {
                applied = true;
                Some(Arc::clone(&fresh))
            }
        });
        if !applied {
            debug!(ticket = ticket.0, "discarding superseded response");
        }
        applied
    }

    /// The newest published value, if any.
    pub fn latest(&self) -> Option<Arc<Published<T>>> {
        self.current.load_full()
    }

    /// Drops the published value without invalidating outstanding tickets.
    pub fn clear(&self) {
        self.current.store(None);
    }
}
