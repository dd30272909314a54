//! Reason codes for expected, non-fatal rejections
//!
//! None of these are faults: the triggering stimulus is dropped and the
//! visitor has to repeat it.

use serde::{Deserialize, Serialize};

/// Why an input produced no state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ReasonCode {
    // =========================================================================
    // R101: Dialogue guard
    // =========================================================================
    /// Dialogue not started yet
    R101_NOT_STARTED,
    /// Dialogue is not accepting user input
    R101_INPUT_NOT_ALLOWED,
    /// A speech is still playing
    R101_SPEECH_IN_PROGRESS,
    /// No pending state to move to
    R101_NO_PENDING_STATE,

    // =========================================================================
    // R102: Ground selection
    // =========================================================================
    /// Long-press of the pair that is already ground
    R102_SAME_GROUND,
    /// Current dialogue state does not take ground events
    R102_GROUND_IGNORED,

    // =========================================================================
    // R103: LED stepper
    // =========================================================================
    /// Every LED of the floor is already lit
    R103_STEPPER_FULL,
    /// Every LED of the floor is already dark
    R103_STEPPER_EMPTY,

    // =========================================================================
    // R104: Collaborator callbacks
    // =========================================================================
    /// Speech-ended callback with no speech outstanding
    R104_SPEECH_NOT_EXPECTED,
}

impl ReasonCode {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::R101_NOT_STARTED => "R101_NOT_STARTED",
            Self::R101_INPUT_NOT_ALLOWED => "R101_INPUT_NOT_ALLOWED",
            Self::R101_SPEECH_IN_PROGRESS => "R101_SPEECH_IN_PROGRESS",
            Self::R101_NO_PENDING_STATE => "R101_NO_PENDING_STATE",
            Self::R102_SAME_GROUND => "R102_SAME_GROUND",
            Self::R102_GROUND_IGNORED => "R102_GROUND_IGNORED",
            Self::R103_STEPPER_FULL => "R103_STEPPER_FULL",
            Self::R103_STEPPER_EMPTY => "R103_STEPPER_EMPTY",
            Self::R104_SPEECH_NOT_EXPECTED => "R104_SPEECH_NOT_EXPECTED",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::R101_NOT_STARTED => "Not started yet, run start",
            Self::R101_INPUT_NOT_ALLOWED => "User input is not allowed at this time",
            Self::R101_SPEECH_IN_PROGRESS => "Speaking, wait until the speech is finished",
            Self::R101_NO_PENDING_STATE => "Next state is empty",
            Self::R102_SAME_GROUND => "Same ground pair long-pressed again",
            Self::R102_GROUND_IGNORED => "Ground events are ignored in this state",
            Self::R103_STEPPER_FULL => "All floor LEDs already on",
            Self::R103_STEPPER_EMPTY => "All floor LEDs already off",
            Self::R104_SPEECH_NOT_EXPECTED => "Speech ended but none was playing",
        }
    }

    /// Guard rejections block a dialogue transition; the rest are informational
    pub fn is_guard(&self) -> bool {
        matches!(
            self,
            Self::R101_NOT_STARTED
                | Self::R101_INPUT_NOT_ALLOWED
                | Self::R101_SPEECH_IN_PROGRESS
                | Self::R101_NO_PENDING_STATE
        )
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}

// =============================================================================
// TESTS
// =============================================================================
