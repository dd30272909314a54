//! Floorlight: ground-pair long-press detection driving a floor LED stepper
//! and a scripted dialogue.
//!
//! Raw button events → ButtonRegistry → PairLongPressDetector → GroundSelection
//! → DialogueFlow → speech / LED side effects, all funneled through
//! [`core::Installation`].

pub mod config;
pub mod core;
pub mod error;
pub mod types;

pub use config::{FloorConfig, InstallationConfig};
pub use error::{Error, Result};

// =============================================================================
// TIMING
// =============================================================================

/// Minimum continuous hold of both pair buttons before a ground event (milliseconds)
pub const LONG_PRESS_THRESHOLD_MS: u64 = 3000;

/// Simulated speech length per spoken word (milliseconds)
pub const SPEECH_MS_PER_WORD: u64 = 350;

// =============================================================================
// HARDWARE LAYOUT
// =============================================================================

/// Number of physical push buttons (ids 0..BUTTON_COUNT)
pub const BUTTON_COUNT: u8 = 10;

/// Number of addressable LEDs on the strip
pub const LED_COUNT: usize = 30;

/// LEDs owned by a single floor
pub const FLOOR_LED_COUNT: usize = 10;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
