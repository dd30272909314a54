//! Events flowing into and out of the installation

use serde::{Deserialize, Serialize};

use crate::types::{ButtonId, DialogueState, PairId, ReasonCode};

/// Identity of one scheduled long-press timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerHandle(pub u64);

/// Inputs processed, one at a time, by the event loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// Reset everything and begin the dialogue
    Start,
    ButtonPressed(ButtonId),
    ButtonReleased(ButtonId),
    /// A long-press timer elapsed
    TimerFired { pair: PairId, handle: TimerHandle },
    /// The speech engine finished the last utterance
    SpeechEnded,
    /// Re-attempt the pending dialogue transition
    Continue,
}

/// Observable outcomes of handling one event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// Both buttons of a pair held past the threshold
    PairLongPressed { pair: PairId },
    /// First ground chosen
    GroundSelected { pair: PairId },
    /// Active floor moved to another pair
    FloorSwitched { from: PairId, to: PairId },
    /// Dialogue entered a state (entry action ran)
    StateEntered { state: DialogueState },
    /// Stepper lit or darkened one LED
    Stepped {
        floor: PairId,
        local: usize,
        physical: usize,
        lit: bool,
    },
    /// Input dropped without effect
    Rejected { reason: ReasonCode },
}

impl Notice {
    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        match self {
            Notice::PairLongPressed { pair } => format!("long-press pair={}", pair),
            Notice::GroundSelected { pair } => format!("ground pair={}", pair),
            Notice::FloorSwitched { from, to } => format!("switch from={} to={}", from, to),
            Notice::StateEntered { state } => format!("state={}", state),
            Notice::Stepped { floor, local, physical, lit } => format!(
                "step floor={} local={} physical={} {}",
                floor,
                local,
                physical,
                if *lit { "on" } else { "off" }
            ),
            Notice::Rejected { reason } => format!("rejected reason={}", reason.code()),
        }
    }
}
