//! Acknowledgement-gated action sequencing.
//!
//! Some outbound actions expect a one-time acknowledgement from the server.
//! The gate admits at most one outstanding action per kind:
//!
//! ```text
//! Idle -> (arm) -> PendingAck -> (acknowledge) -> Idle
//! ```
//!
//! Arming while `PendingAck` is refused without a transition. The busy state
//! is global per kind, not per room; an outstanding statement send blocks
//! statement sends to every room. There is no timeout: an action whose
//! acknowledgement never arrives stays pending.

use std::collections::HashSet;

/// Kinds of acknowledgement-gated actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// A statement send, acknowledged by `statement_ok`.
    Statement,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Statement => write!(f, "statement"),
        }
    }
}

/// Tracks which action kinds have an acknowledgement outstanding.
#[derive(Debug, Clone, Default)]
pub struct ActionGate {
    pending: HashSet<ActionKind>,
}

impl ActionGate {
    /// Create a gate with every kind idle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an action of this kind is outstanding.
    pub fn is_busy(&self, kind: ActionKind) -> bool {
        self.pending.contains(&kind)
    }

    /// Arm the gate for one action of this kind.
    ///
    /// Returns `false` without a transition if one is already outstanding;
    /// the caller must not emit in that case.
    pub fn arm(&mut self, kind: ActionKind) -> bool {
        self.pending.insert(kind)
    }

    /// The acknowledgement for this kind arrived.
    ///
    /// Returns `false` if nothing was armed (a stray acknowledgement).
    pub fn acknowledge(&mut self, kind: ActionKind) -> bool {
        self.pending.remove(&kind)
    }

    /// Drop all outstanding actions. Used on session teardown; the
    /// acknowledgements can no longer arrive.
    pub fn reset(&mut self) {
        self.pending.clear();
    }
}
