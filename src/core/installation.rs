//! Installation: one context object owning every component and collaborator.
//!
//! All mutation goes through [`Installation::handle`], one event at a time.
//! Press events also drive the LED stepper when a floor is active; completed
//! long-presses go through the ground selector into the dialogue.

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::InstallationConfig;
use crate::core::buttons::ButtonRegistry;
use crate::core::dialogue::{DialogueFlow, FlowContext};
use crate::core::ground::{GroundDecision, GroundSelection};
use crate::core::leds::{FloorLeds, LedSink, StepDirection};
use crate::core::long_press::PairLongPressDetector;
use crate::core::speech::Speaker;
use crate::core::timers::{ManualTimers, TimerProvider};
use crate::types::{ButtonId, DialogueState, Notice, PairId, ReasonCode, RuntimeEvent, StateOutput, TimerHandle};
use crate::Result;

/// The running installation
#[derive(Debug)]
pub struct Installation<S: Speaker, L: LedSink, T: TimerProvider> {
    config: InstallationConfig,
    registry: ButtonRegistry,
    detector: PairLongPressDetector,
    ground: GroundSelection,
    leds: FloorLeds,
    dialogue: DialogueFlow,
    speaker: S,
    sink: L,
    timers: T,
}

impl<S: Speaker, L: LedSink, T: TimerProvider> Installation<S, L, T> {
    /// Validate the configuration and wire the components
    pub fn new(config: InstallationConfig, speaker: S, sink: L, timers: T) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            registry: ButtonRegistry::new(config.button_count),
            detector: PairLongPressDetector::from_config(&config),
            ground: GroundSelection::new(),
            leds: FloorLeds::from_config(&config),
            dialogue: DialogueFlow::new(config.voice.clone()),
            config,
            speaker,
            sink,
            timers,
        })
    }

    /// Process one event from the loop
    pub fn handle(&mut self, event: RuntimeEvent) -> Result<Vec<Notice>> {
        match event {
            RuntimeEvent::Start => self.start_dialogue(),
            RuntimeEvent::ButtonPressed(id) => self.button_pressed(id),
            RuntimeEvent::ButtonReleased(id) => self.button_released(id),
            RuntimeEvent::TimerFired { pair, handle } => self.timer_fired(pair, handle),
            RuntimeEvent::SpeechEnded => self.speech_ended(),
            RuntimeEvent::Continue => self.continue_dialogue(),
        }
    }

    /// Reset timers, ground, LEDs and dialogue, then run INIT.
    /// Safe to call repeatedly.
    pub fn start_dialogue(&mut self) -> Result<Vec<Notice>> {
        let mut notices = Vec::new();
        // held buttons stay held; only their timers and latches go
        self.detector.reset(&mut self.timers);
        self.ground.reset();
        self.leds.reset_local();

        let mut ctx = FlowContext {
            speaker: &mut self.speaker,
            sink: &mut self.sink,
            leds: &self.leds,
            ground: None,
        };
        self.dialogue.start(&mut ctx, &mut notices)?;
        Ok(notices)
    }

    pub fn button_pressed(&mut self, id: ButtonId) -> Result<Vec<Notice>> {
        let mut notices = Vec::new();
        if self.registry.press(id)? {
            debug!(button = %id, "press bounce ignored");
            return Ok(notices);
        }

        self.step_if_active(id, &mut notices)?;
        self.detector.on_press(id, &self.registry, &mut self.timers)?;
        Ok(notices)
    }

    pub fn button_released(&mut self, id: ButtonId) -> Result<Vec<Notice>> {
        if !self.registry.release(id)? {
            debug!(button = %id, "release bounce ignored");
            return Ok(Vec::new());
        }

        self.detector.on_release(id, &mut self.timers)?;

        let ground = self.ground.current();
        if ground.is_some() && self.detector.pair_of(id) == ground && self.dialogue.state().is_floor_feature() {
            info!(button = %id, "ground released, long-press another pair to switch floors");
        }
        Ok(Vec::new())
    }

    pub fn timer_fired(&mut self, pair: PairId, handle: TimerHandle) -> Result<Vec<Notice>> {
        let mut notices = Vec::new();
        if !self.detector.on_timer_fired(pair, handle, &self.registry)? {
            return Ok(notices);
        }
        notices.push(Notice::PairLongPressed { pair });
        self.on_pair_long_pressed(pair, &mut notices)?;
        Ok(notices)
    }

    pub fn speech_ended(&mut self) -> Result<Vec<Notice>> {
        let mut notices = Vec::new();
        let mut ctx = FlowContext {
            speaker: &mut self.speaker,
            sink: &mut self.sink,
            leds: &self.leds,
            ground: self.ground.current(),
        };
        self.dialogue.on_speech_ended(&mut ctx, &mut notices)?;
        Ok(notices)
    }

    /// Re-attempt the pending transition without a new stimulus
    pub fn continue_dialogue(&mut self) -> Result<Vec<Notice>> {
        let mut notices = Vec::new();
        self.advance(&mut notices)?;
        Ok(notices)
    }

    fn on_pair_long_pressed(&mut self, pair: PairId, notices: &mut Vec<Notice>) -> Result<()> {
        let decision = self.ground.evaluate(pair, self.dialogue.state());

        if let GroundDecision::Ignore(reason) = decision {
            info!(pair = %pair, state = %self.dialogue.state(), reason = reason.code(), "{}", reason.description());
            notices.push(Notice::Rejected { reason });
            return Ok(());
        }
        // check before touching ground or LEDs so a rejection changes nothing
        if let Err(reason) = self.dialogue.accepts_input() {
            warn!(pair = %pair, reason = reason.code(), "{}", reason.description());
            notices.push(Notice::Rejected { reason });
            return Ok(());
        }

        match decision {
            GroundDecision::Select(pair) => {
                self.ground.select(pair);
                info!(pair = %pair, "ground selected");
                notices.push(Notice::GroundSelected { pair });
                self.dialogue.request(DialogueState::Welcome);
            }
            GroundDecision::Switch { from, to } => {
                self.leds.turn_off_floor(from, &mut self.sink)?;
                self.ground.select(to);
                self.leds.reset_local();
                if let Some(outgoing) = self.dialogue.state().feature() {
                    self.dialogue.clear_feature_flag(outgoing);
                    self.dialogue.request(outgoing.next().state());
                }
                info!(from = %from, to = %to, "floor switched");
                notices.push(Notice::FloorSwitched { from, to });
            }
            GroundDecision::Ignore(_) => return Ok(()),
        }

        self.advance(notices)?;
        Ok(())
    }

    fn step_if_active(&mut self, id: ButtonId, notices: &mut Vec<Notice>) -> Result<()> {
        if !self.dialogue.state().is_floor_feature() {
            return Ok(());
        }
        let Some(floor) = self.ground.current() else {
            return Ok(());
        };
        let Some(direction) = self.leds.role_for(floor, id) else {
            return Ok(());
        };

        match self.leds.step(floor, direction, &mut self.sink)? {
            Some(step) => notices.push(Notice::Stepped {
                floor,
                local: step.local,
                physical: step.physical,
                lit: step.lit,
            }),
            None => {
                let reason = match direction {
                    StepDirection::Increment => ReasonCode::R103_STEPPER_FULL,
                    StepDirection::Decrement => ReasonCode::R103_STEPPER_EMPTY,
                };
                notices.push(Notice::Rejected { reason });
            }
        }
        Ok(())
    }

    fn advance(&mut self, notices: &mut Vec<Notice>) -> Result<bool> {
        let mut ctx = FlowContext {
            speaker: &mut self.speaker,
            sink: &mut self.sink,
            leds: &self.leds,
            ground: self.ground.current(),
        };
        self.dialogue.advance(&mut ctx, notices)
    }

    /// Point-in-time view for the console
    pub fn snapshot(&self) -> StateOutput {
        StateOutput {
            timestamp: Utc::now(),
            started: self.dialogue.is_started(),
            state: self.dialogue.state(),
            last_state: self.dialogue.last_state(),
            pending: self.dialogue.pending(),
            ground: self.ground.current(),
            last_ground: self.ground.last(),
            local_leds: self.leds.local().to_string(),
            speaking: self.dialogue.is_speaking(),
            pending_timers: self.detector.pending_count(),
        }
    }

    pub fn config(&self) -> &InstallationConfig {
        &self.config
    }

    pub fn registry(&self) -> &ButtonRegistry {
        &self.registry
    }

    pub fn detector(&self) -> &PairLongPressDetector {
        &self.detector
    }

    pub fn ground(&self) -> &GroundSelection {
        &self.ground
    }

    pub fn leds(&self) -> &FloorLeds {
        &self.leds
    }

    pub fn dialogue(&self) -> &DialogueFlow {
        &self.dialogue
    }

    pub fn speaker(&self) -> &S {
        &self.speaker
    }

    pub fn sink(&self) -> &L {
        &self.sink
    }

    pub fn timers(&self) -> &T {
        &self.timers
    }
}

impl<S: Speaker, L: LedSink> Installation<S, L, ManualTimers> {
    /// Move the virtual clock and deliver every expiry in due order
    pub fn advance_time(&mut self, by: Duration) -> Result<Vec<Notice>> {
        let mut notices = Vec::new();
        for (pair, handle) in self.timers.advance(by) {
            notices.extend(self.timer_fired(pair, handle)?);
        }
        Ok(notices)
    }
}
