//! Waiting event queue.
//!
//! Events raised while the stack is frozen (or with `hold` set) wait here so
//! that every consequence of one action is collected before anything fires.
//! The candidate trigger list of each waiting event is filled in on the
//! first drain, not when the event is queued, so triggers created in the
//! meantime are seen.

use std::collections::VecDeque;

use super::event::GameEvent;
use super::trigger::TriggerId;

/// A queued event and, once resolved, the triggers it will be checked against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaitingEvent {
    pub event: GameEvent,
    pub triggers: Option<Vec<TriggerId>>,
}

impl WaitingEvent {
    #[must_use]
    pub fn new(event: GameEvent) -> Self {
        Self { event, triggers: None }
    }
}

/// FIFO of waiting events.
#[derive(Clone, Debug, Default)]
pub struct WaitingQueue {
    events: VecDeque<WaitingEvent>,
}

impl WaitingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, event: GameEvent) {
        self.events.push_back(WaitingEvent::new(event));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Discard everything without firing. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let n = self.events.len();
        self.events.clear();
        n
    }

    /// Fill in the candidate list of every event that has none yet.
    pub fn resolve_candidates(&mut self, active: &[TriggerId]) {
        for waiting in self.events.iter_mut().filter(|w| w.triggers.is_none()) {
            waiting.triggers = Some(active.to_vec());
        }
    }

    /// Take every waiting event, oldest first.
    pub fn drain_all(&mut self) -> Vec<WaitingEvent> {
        self.events.drain(..).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WaitingEvent> {
        self.events.iter()
    }
}
