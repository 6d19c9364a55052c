#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use wedlock_kernel_contracts::record::PrincipalId;

/// The two rendezvous namespaces. The source reused one global map for
/// both and relied on clearing after every match; tagging the map by
/// phase removes any possibility of cross-phase interference while
/// keeping the same observable protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConsentPhase {
    Engagement,
    Marriage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentOutcome {
    /// The caller's preference was recorded; the other side has not
    /// (yet) pointed back.
    ProposalRecorded,
    /// Both sides point at each other; both entries have been cleared
    /// so the slots can be reused by a later phase.
    MutualMatch,
}

/// Generic two-phase rendezvous: a match commits only when both
/// principals have independently submitted each other, in either order.
/// Each principal holds at most one outstanding preference per phase;
/// a new proposal overwrites the old one.
#[derive(Debug, Clone, Default)]
pub struct ConsentMatcher {
    preferences: BTreeMap<(ConsentPhase, PrincipalId), PrincipalId>,
}

impl ConsentMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `caller → other` and re-checks mutuality at write time,
    /// which makes the protocol correct under any serialization order
    /// of the two proposers' calls.
    pub fn propose(
        &mut self,
        phase: ConsentPhase,
        caller: &PrincipalId,
        other: &PrincipalId,
    ) -> ConsentOutcome {
        self.preferences
            .insert((phase, caller.clone()), other.clone());
        let reciprocal = self
            .preferences
            .get(&(phase, other.clone()))
            .is_some_and(|pick| pick == caller);
        if reciprocal {
            self.preferences.remove(&(phase, caller.clone()));
            self.preferences.remove(&(phase, other.clone()));
            ConsentOutcome::MutualMatch
        } else {
            ConsentOutcome::ProposalRecorded
        }
    }

    /// Drops any outstanding preference the principal holds in either
    /// phase. Invoked when a record is destroyed so a dissolved
    /// principal re-enters the protocol with clean slots.
    pub fn clear_principal(&mut self, principal: &PrincipalId) {
        self.preferences
            .remove(&(ConsentPhase::Engagement, principal.clone()));
        self.preferences
            .remove(&(ConsentPhase::Marriage, principal.clone()));
    }

    pub fn outstanding(&self, phase: ConsentPhase, principal: &PrincipalId) -> Option<&PrincipalId> {
        self.preferences.get(&(phase, principal.clone()))
    }
}
