//! Ground / floor selection
//!
//! Decides what a `PairLongPressed` means in the current dialogue state:
//! - no ground yet, waiting for one → select it
//! - floor-feature state, different pair → switch floors
//! - floor-feature state, same pair → ignore
//! - anything else → ignore

use crate::types::{DialogueState, PairId, ReasonCode};

/// What to do with a completed long-press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroundDecision {
    /// First ground of the session
    Select(PairId),
    /// Move from the outgoing floor to a new one
    Switch { from: PairId, to: PairId },
    /// Nothing to do
    Ignore(ReasonCode),
}

/// Current and last ground pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroundSelection {
    current: Option<PairId>,
    last: Option<PairId>,
}

impl GroundSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<PairId> {
        self.current
    }

    pub fn last(&self) -> Option<PairId> {
        self.last
    }

    /// Classify a long-press without mutating anything
    pub fn evaluate(&self, pair: PairId, state: DialogueState) -> GroundDecision {
        match (self.current, state) {
            (None, DialogueState::WaitingForGround) => GroundDecision::Select(pair),
            (Some(from), s) if s.is_floor_feature() => {
                if Some(pair) == self.last {
                    GroundDecision::Ignore(ReasonCode::R102_SAME_GROUND)
                } else {
                    GroundDecision::Switch { from, to: pair }
                }
            }
            _ => GroundDecision::Ignore(ReasonCode::R102_GROUND_IGNORED),
        }
    }

    /// Make `pair` both current and last
    pub fn select(&mut self, pair: PairId) {
        self.current = Some(pair);
        self.last = Some(pair);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
