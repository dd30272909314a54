//! Dialogue flow: the fixed conversation graph
//!
//! State transitions:
//! - INIT → WAITING_FOR_GROUND: unconditional, after clearing the strip
//! - WAITING_FOR_GROUND → WELCOME: first ground long-press
//! - WELCOME → CHOOSE_RAIN: when the welcome speech ends
//! - CHOOSE_* → next CHOOSE_*: floor switch (rain → wind → hour → pollution → rain)
//!
//! Every transition attempt passes the preliminary tests first; a failing
//! test drops the attempt and leaves everything unchanged.

use tracing::{info, warn};

use crate::core::leds::{FloorLeds, LedSink};
use crate::core::speech::{Speaker, VoicePreset};
use crate::types::{DialogueState, Feature, Notice, PairId, ReasonCode};
use crate::Result;

const WELCOME_LINE: &str = "Welcome! Let's choose the rain.";

fn feature_line(feature: Feature, floor: PairId) -> String {
    match feature {
        Feature::Rain => format!("You are in rain mode on floor {}.", floor),
        _ => format!("Now in {} mode on floor {}.", feature.name(), floor),
    }
}

/// Collaborators an entry action may touch
pub struct FlowContext<'a, S: Speaker, L: LedSink> {
    pub speaker: &'a mut S,
    pub sink: &'a mut L,
    pub leds: &'a FloorLeds,
    /// Active floor when the entry action runs
    pub ground: Option<PairId>,
}

/// Dialogue state machine
#[derive(Debug)]
pub struct DialogueFlow {
    started: bool,
    state: DialogueState,
    last_state: Option<DialogueState>,
    next_state: Option<DialogueState>,
    waiting_for_user_input: bool,
    /// Utterances started but not yet reported finished; survives restarts
    outstanding: u32,
    /// Run the pending transition as soon as the current speech ends
    should_continue: bool,
    /// Per feature: floor LEDs cleared since the floor was selected
    initialized: [bool; 4],
    voice: VoicePreset,
}

impl DialogueFlow {
    pub fn new(voice: VoicePreset) -> Self {
        Self {
            started: false,
            state: DialogueState::Init,
            last_state: None,
            next_state: None,
            waiting_for_user_input: true,
            outstanding: 0,
            should_continue: false,
            initialized: [false; 4],
            voice,
        }
    }

    /// Reset everything and run INIT
    pub fn start<S: Speaker, L: LedSink>(
        &mut self,
        ctx: &mut FlowContext<'_, S, L>,
        notices: &mut Vec<Notice>,
    ) -> Result<()> {
        let outstanding = self.outstanding;
        *self = Self::new(self.voice.clone());
        self.outstanding = outstanding;
        self.started = true;
        if outstanding > 0 {
            info!(outstanding, "restart while speech is playing, input waits for it");
        }
        info!("dialogue started, long-press a ground pair to begin");

        notices.push(Notice::StateEntered { state: DialogueState::Init });
        self.enter(DialogueState::Init, ctx, notices)
    }

    /// Preliminary tests guarding every transition attempt
    pub fn perform_preliminary_tests(&self) -> std::result::Result<(), ReasonCode> {
        self.accepts_input()?;
        if self.next_state.is_none() {
            return Err(ReasonCode::R101_NO_PENDING_STATE);
        }
        Ok(())
    }

    /// The tests that do not depend on a pending state
    pub fn accepts_input(&self) -> std::result::Result<(), ReasonCode> {
        if !self.started {
            return Err(ReasonCode::R101_NOT_STARTED);
        }
        if !self.waiting_for_user_input {
            return Err(ReasonCode::R101_INPUT_NOT_ALLOWED);
        }
        if self.outstanding > 0 {
            return Err(ReasonCode::R101_SPEECH_IN_PROGRESS);
        }
        Ok(())
    }

    /// Set the pending transition target
    pub fn request(&mut self, state: DialogueState) {
        self.next_state = Some(state);
    }

    /// Attempt the pending transition. Returns true when a state was entered.
    pub fn advance<S: Speaker, L: LedSink>(
        &mut self,
        ctx: &mut FlowContext<'_, S, L>,
        notices: &mut Vec<Notice>,
    ) -> Result<bool> {
        if let Err(reason) = self.perform_preliminary_tests() {
            warn!(reason = reason.code(), state = %self.state, "{}", reason.description());
            notices.push(Notice::Rejected { reason });
            return Ok(false);
        }
        let Some(next) = self.next_state.take() else {
            return Ok(false);
        };

        info!(from = %self.state, to = %next, "dialogue transition");
        self.last_state = Some(self.state);
        self.state = next;
        notices.push(Notice::StateEntered { state: next });

        self.enter(next, ctx, notices)?;
        Ok(true)
    }

    /// Speech engine finished; continue if the last entry asked for it
    pub fn on_speech_ended<S: Speaker, L: LedSink>(
        &mut self,
        ctx: &mut FlowContext<'_, S, L>,
        notices: &mut Vec<Notice>,
    ) -> Result<bool> {
        if self.outstanding == 0 {
            let reason = ReasonCode::R104_SPEECH_NOT_EXPECTED;
            warn!(reason = reason.code(), "{}", reason.description());
            notices.push(Notice::Rejected { reason });
            return Ok(false);
        }
        self.outstanding -= 1;
        info!(state = %self.state, outstanding = self.outstanding, "speech ended");

        if self.outstanding > 0 || !self.should_continue {
            return Ok(false);
        }
        self.should_continue = false;
        self.waiting_for_user_input = true;
        self.advance(ctx, notices)
    }

    /// Allow the feature's one-time LED clear to run again
    pub fn clear_feature_flag(&mut self, feature: Feature) {
        self.initialized[feature.index()] = false;
    }

    fn enter<S: Speaker, L: LedSink>(
        &mut self,
        state: DialogueState,
        ctx: &mut FlowContext<'_, S, L>,
        notices: &mut Vec<Notice>,
    ) -> Result<()> {
        match state {
            DialogueState::Init => {
                ctx.leds.all_off(ctx.sink);
                self.waiting_for_user_input = true;
                self.next_state = Some(DialogueState::WaitingForGround);
                self.advance(ctx, notices)?;
            }
            DialogueState::WaitingForGround => {
                info!("waiting for a ground long-press");
            }
            DialogueState::Welcome => {
                self.speak(WELCOME_LINE, ctx);
                self.should_continue = true;
                self.waiting_for_user_input = false;
                self.next_state = Some(DialogueState::ChooseRain);
            }
            DialogueState::ChooseRain
            | DialogueState::ChooseWind
            | DialogueState::ChooseHour
            | DialogueState::ChoosePollution => {
                let Some(feature) = state.feature() else {
                    return Ok(());
                };
                match ctx.ground {
                    Some(floor) => {
                        self.speak(&feature_line(feature, floor), ctx);
                        if !self.initialized[feature.index()] {
                            ctx.leds.turn_off_floor(floor, ctx.sink)?;
                            self.initialized[feature.index()] = true;
                        }
                    }
                    None => warn!(state = %state, "floor-feature state entered without ground"),
                }
                self.waiting_for_user_input = true;
            }
        }
        Ok(())
    }

    fn speak<S: Speaker, L: LedSink>(&mut self, text: &str, ctx: &mut FlowContext<'_, S, L>) {
        ctx.speaker.speak(text, &self.voice);
        self.outstanding += 1;
    }

    pub fn state(&self) -> DialogueState {
        self.state
    }

    pub fn last_state(&self) -> Option<DialogueState> {
        self.last_state
    }

    pub fn pending(&self) -> Option<DialogueState> {
        self.next_state
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_speaking(&self) -> bool {
        self.outstanding > 0
    }

    pub fn is_waiting_for_input(&self) -> bool {
        self.waiting_for_user_input
    }

    pub fn is_feature_initialized(&self, feature: Feature) -> bool {
        self.initialized[feature.index()]
    }

    pub fn voice(&self) -> &VoicePreset {
        &self.voice
    }
}

// =============================================================================
// TESTS
// =============================================================================
