//! The resolution stack.
//!
//! Fired abilities are pushed onto a stack and resolve in LIFO order.
//! While the stack is frozen, raised events wait in the trigger handler's
//! queue instead of being dispatched.

use serde::{Deserialize, Serialize};

use crate::core::PlayerId;
use crate::triggers::{BoundAbility, TriggerId};

/// Unique identifier for a stack entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StackEntryId(pub u32);

impl StackEntryId {
    /// Create a new stack entry ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for StackEntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StackEntry({})", self.0)
    }
}

/// An entry on the stack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackEntry {
    pub id: StackEntryId,

    /// The fired ability waiting to resolve.
    pub ability: BoundAbility,

    /// Who controls this entry.
    pub controller: PlayerId,
}

/// LIFO stack of triggered abilities.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PriorityStack {
    /// The stack (index 0 = bottom, last = top).
    entries: Vec<StackEntry>,

    /// Nesting depth of `freeze` calls.
    frozen: u32,

    next_id: u32,
}

impl PriorityStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a fired ability. Returns the new entry's id.
    pub fn push(&mut self, ability: BoundAbility) -> StackEntryId {
        let id = StackEntryId::new(self.next_id);
        self.next_id += 1;
        let controller = ability.activator;
        self.entries.push(StackEntry {
            id,
            ability,
            controller,
        });
        id
    }

    /// Hold trigger dispatch until the matching `unfreeze`. Nests.
    pub fn freeze(&mut self) {
        self.frozen += 1;
    }

    /// Returns `true` once the outermost freeze is released.
    pub fn unfreeze(&mut self) -> bool {
        self.frozen = self.frozen.saturating_sub(1);
        self.frozen == 0
    }

    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen > 0
    }

    /// Is a state trigger from `trigger` already waiting to resolve?
    #[must_use]
    pub fn has_pending_state_trigger(&self, trigger: TriggerId) -> bool {
        self.entries
            .iter()
            .any(|e| e.ability.is_state_trigger && e.ability.trigger_id == trigger)
    }

    /// Peek at the top of the stack without removing it.
    #[must_use]
    pub fn peek_top(&self) -> Option<&StackEntry> {
        self.entries.last()
    }

    /// Get all entries on the stack (bottom to top).
    #[must_use]
    pub fn entries(&self) -> &[StackEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pop(&mut self) -> Option<StackEntry> {
        self.entries.pop()
    }

    /// Take an entry off the stack wherever it is (countered, fizzled).
    pub fn remove(&mut self, id: StackEntryId) -> Option<StackEntry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
