//! Core modules for Floorlight

pub mod buttons;
pub mod timers;
pub mod long_press;
pub mod ground;
pub mod leds;
pub mod speech;
pub mod dialogue;
pub mod installation;
pub mod command;

pub use buttons::ButtonRegistry;
pub use timers::{TimerProvider, ManualTimers, TokioTimers};
pub use long_press::PairLongPressDetector;
pub use ground::{GroundSelection, GroundDecision};
pub use leds::{LedSink, LedStrip, FloorLeds, LocalLedState, StepDirection, Step};
pub use speech::{Speaker, SpeechLog, TerminalSpeaker, VoicePreset};
pub use dialogue::{DialogueFlow, FlowContext};
pub use installation::Installation;
pub use command::{parse_command, Command, CommandError};
