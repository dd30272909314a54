//! Snapshot structures for terminal display

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::types::{DialogueState, PairId};

/// Point-in-time view of the installation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateOutput {
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Has start been issued
    pub started: bool,
    /// State whose entry action ran last
    pub state: DialogueState,
    /// Previous state
    pub last_state: Option<DialogueState>,
    /// Transition waiting for its trigger
    pub pending: Option<DialogueState>,
    /// Active ground pair
    pub ground: Option<PairId>,
    /// Last pair that completed a long-press
    pub last_ground: Option<PairId>,
    /// Floor-local stepper cells, '1' = lit
    pub local_leds: String,
    /// Speech outstanding
    pub speaking: bool,
    /// Long-press timers currently armed
    pub pending_timers: usize,
}

impl StateOutput {
    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let color = self.state.color_code();
        let reset = DialogueState::color_reset();
        let emoji = self.state.emoji();

        format!(
            "{}{} state={} | ground={} | leds={} | {}{}",
            color,
            emoji,
            self.state,
            display_pair(self.ground),
            self.local_leds,
            if self.speaking { "speaking" } else { "idle" },
            reset
        )
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "state={} | last={} | pending={} | ground={} | leds={} | speaking={} | timers={}",
            self.state,
            self.last_state.map(|s| s.name()).unwrap_or("-"),
            self.pending.map(|s| s.name()).unwrap_or("-"),
            display_pair(self.ground),
            self.local_leds,
            self.speaking,
            self.pending_timers
        )
    }
}

fn display_pair(pair: Option<PairId>) -> String {
    pair.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string())
}
