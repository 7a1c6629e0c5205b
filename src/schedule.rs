//! Deadline-ordered timers for the single-threaded event loop.
//!
//! Phase transitions are scheduled events rather than closures. Each event is
//! stamped with the [`Liveness`] flag of the scene that scheduled it; when a
//! scene is destroyed its flag is revoked and every event still queued for it
//! is dropped at dispatch, even if its deadline has already passed.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Shared "still alive" flag for one scene instance.
///
/// Clones observe the same flag. A fresh flag is created per scene, so a new
/// scene reusing an identifier never revives timers of its predecessor.
#[derive(Clone, Debug)]
pub struct Liveness(Rc<Cell<bool>>);

impl Liveness {
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.get()
    }

    pub fn revoke(&self) {
        self.0.set(false);
    }

    pub fn same_as(&self, other: &Liveness) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

struct Entry<E> {
    id: TimerId,
    deadline: Instant,
    guard: Liveness,
    event: E,
}

/// Timer queue ordered by deadline, then by insertion.
pub struct Scheduler<E> {
    // Sorted by (deadline, id); small enough that insertion sort wins.
    entries: Vec<Entry<E>>,
    next_id: u64,
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    pub fn schedule_at(&mut self, deadline: Instant, guard: Liveness, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let index = self
            .entries
            .partition_point(|e| (e.deadline, e.id) <= (deadline, id));
        self.entries.insert(
            index,
            Entry {
                id,
                deadline,
                guard,
                event,
            },
        );
        id
    }

    pub fn schedule(
        &mut self,
        now: Instant,
        after: Duration,
        guard: Liveness,
        event: E,
    ) -> TimerId {
        self.schedule_at(now + after, guard, event)
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Drops every event whose scene is gone.
    pub fn purge_dead(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.guard.is_alive());
        before - self.entries.len()
    }

    /// Earliest deadline among live events.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries
            .iter()
            .find(|e| e.guard.is_alive())
            .map(|e| e.deadline)
    }

    /// Removes and returns the first live event due at `now`, with its deadline.
    /// Dead events in front of it are discarded.
    pub fn pop_due(&mut self, now: Instant) -> Option<(Instant, E)> {
        while let Some(first) = self.entries.first() {
            if first.deadline > now {
                return None;
            }
            let entry = self.entries.remove(0);
            if entry.guard.is_alive() {
                return Some((entry.deadline, entry.event));
            }
            log::debug!("dropping timer {:?} of a destroyed scene", entry.id);
        }
        None
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_events_come_out_in_deadline_order() {
        let t0 = Instant::now();
        let alive = Liveness::new();
        let mut s = Scheduler::new();
        s.schedule(t0, Duration::from_millis(300), alive.clone(), "c");
        s.schedule(t0, Duration::from_millis(100), alive.clone(), "a");
        s.schedule(t0, Duration::from_millis(100), alive.clone(), "b");

        assert_eq!(s.next_deadline(), Some(t0 + Duration::from_millis(100)));
        assert_eq!(s.pop_due(t0), None);

        let now = t0 + Duration::from_millis(200);
        assert_eq!(s.pop_due(now).map(|(_, e)| e), Some("a"));
        assert_eq!(s.pop_due(now).map(|(_, e)| e), Some("b"));
        assert_eq!(s.pop_due(now), None);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn revoked_events_never_fire() {
        let t0 = Instant::now();
        let gone = Liveness::new();
        let kept = Liveness::new();
        let mut s = Scheduler::new();
        s.schedule(t0, Duration::ZERO, gone.clone(), 1);
        s.schedule(t0, Duration::from_millis(5), kept.clone(), 2);
        gone.revoke();

        let later = t0 + Duration::from_secs(1);
        assert_eq!(s.pop_due(later).map(|(_, e)| e), Some(2));
        assert!(s.is_empty());
    }

    #[test]
    fn cancel_and_purge() {
        let t0 = Instant::now();
        let a = Liveness::new();
        let b = Liveness::new();
        let mut s = Scheduler::new();
        let id = s.schedule(t0, Duration::from_secs(1), a.clone(), ());
        s.schedule(t0, Duration::from_secs(2), b.clone(), ());
        assert!(s.cancel(id));
        assert!(!s.cancel(id));

        b.revoke();
        assert_eq!(s.next_deadline(), None);
        assert_eq!(s.purge_dead(), 1);
        assert!(s.is_empty());
    }

    #[test]
    fn liveness_clones_share_state() {
        let a = Liveness::new();
        let b = a.clone();
        assert!(a.same_as(&b));
        assert!(!a.same_as(&Liveness::new()));
        b.revoke();
        assert!(!a.is_alive());
    }
}
