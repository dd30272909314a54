//! Core types for Floorlight

mod ids;
mod led;
mod state;
mod reason;
mod event;
mod output;

pub use ids::{ButtonId, PairId};
pub use led::Rgb;
pub use state::{DialogueState, Feature};
pub use reason::ReasonCode;
pub use event::{Notice, RuntimeEvent, TimerHandle};
pub use output::StateOutput;
