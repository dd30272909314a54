//! Integration tests for the floor flow
//!
//! Tests the full path: long-press → ground selection → dialogue → LEDs

use std::time::Duration;

use floorlight::core::{Installation, LedStrip, ManualTimers, SpeechLog};
use floorlight::types::{ButtonId, DialogueState, Feature, Notice, PairId, ReasonCode, RuntimeEvent};
use floorlight::{InstallationConfig, LED_COUNT, LONG_PRESS_THRESHOLD_MS};
use pretty_assertions::assert_eq;

type Rig = Installation<SpeechLog, LedStrip, ManualTimers>;

fn rig_with(config: InstallationConfig) -> Rig {
    let mut rig = Installation::new(config, SpeechLog::new(), LedStrip::new(LED_COUNT), ManualTimers::new()).unwrap();
    rig.handle(RuntimeEvent::Start).unwrap();
    rig
}

fn rig() -> Rig {
    rig_with(InstallationConfig::default())
}

/// Press both buttons, wait out the threshold, release
fn hold(rig: &mut Rig, a: u8, b: u8) -> Vec<Notice> {
    let mut notices = rig.handle(RuntimeEvent::ButtonPressed(ButtonId(a))).unwrap();
    notices.extend(rig.handle(RuntimeEvent::ButtonPressed(ButtonId(b))).unwrap());
    notices.extend(rig.advance_time(Duration::from_millis(LONG_PRESS_THRESHOLD_MS)).unwrap());
    rig.handle(RuntimeEvent::ButtonReleased(ButtonId(a))).unwrap();
    rig.handle(RuntimeEvent::ButtonReleased(ButtonId(b))).unwrap();
    notices
}

fn tap(rig: &mut Rig, id: u8, times: usize) -> Vec<Notice> {
    let mut notices = Vec::new();
    for _ in 0..times {
        notices.extend(rig.handle(RuntimeEvent::ButtonPressed(ButtonId(id))).unwrap());
        notices.extend(rig.handle(RuntimeEvent::ButtonReleased(ButtonId(id))).unwrap());
    }
    notices
}

fn speech_ended(rig: &mut Rig) -> Vec<Notice> {
    rig.handle(RuntimeEvent::SpeechEnded).unwrap()
}

/// Start, select floor 2 and let the welcome finish: CHOOSE_RAIN, speech done
fn rain_on_floor_two() -> Rig {
    let mut rig = rig();
    hold(&mut rig, 2, 3);
    speech_ended(&mut rig);
    speech_ended(&mut rig);
    rig
}

fn rejections(notices: &[Notice]) -> Vec<ReasonCode> {
    notices
        .iter()
        .filter_map(|n| match n {
            Notice::Rejected { reason } => Some(*reason),
            _ => None,
        })
        .collect()
}

/// First hold selects the ground and starts the welcome
#[test]
fn test_first_ground_leads_to_welcome_then_rain() {
    let mut rig = rig();
    assert_eq!(rig.dialogue().state(), DialogueState::WaitingForGround);

    let notices = hold(&mut rig, 2, 3);
    assert_eq!(
        notices,
        vec![
            Notice::PairLongPressed { pair: PairId(2) },
            Notice::GroundSelected { pair: PairId(2) },
            Notice::StateEntered { state: DialogueState::Welcome },
        ]
    );
    assert_eq!(rig.speaker().last(), Some("Welcome! Let's choose the rain."));
    assert!(rig.dialogue().is_speaking());

    let notices = speech_ended(&mut rig);
    assert_eq!(notices, vec![Notice::StateEntered { state: DialogueState::ChooseRain }]);
    assert_eq!(rig.ground().current(), Some(PairId(2)));
    assert_eq!(rig.speaker().last(), Some("You are in rain mode on floor 2."));
}

/// Switching floors darkens the outgoing floor and moves to the next feature
#[test]
fn test_switch_floor_advances_feature() {
    let mut rig = rain_on_floor_two();
    tap(&mut rig, 4, 3);
    assert_eq!(rig.sink().lit(), vec![10, 11, 12]);

    let notices = hold(&mut rig, 0, 1);
    assert!(notices.contains(&Notice::FloorSwitched { from: PairId(2), to: PairId(1) }));
    assert!(notices.contains(&Notice::StateEntered { state: DialogueState::ChooseWind }));

    assert_eq!(rig.dialogue().state(), DialogueState::ChooseWind);
    assert_eq!(rig.dialogue().last_state(), Some(DialogueState::ChooseRain));
    assert_eq!(rig.ground().current(), Some(PairId(1)));
    assert!(rig.sink().lit().is_empty());
    assert!(rig.leds().local().is_all_off());
    assert_eq!(rig.speaker().last(), Some("Now in wind mode on floor 1."));

    assert!(!rig.dialogue().is_feature_initialized(Feature::Rain));
    assert!(rig.dialogue().is_feature_initialized(Feature::Wind));
}

/// Four switches walk the whole feature cycle back to rain
#[test]
fn test_feature_cycle() {
    let mut rig = rain_on_floor_two();
    let route = [
        ((0, 1), PairId(1), DialogueState::ChooseWind),
        ((2, 3), PairId(2), DialogueState::ChooseHour),
        ((4, 5), PairId(3), DialogueState::ChoosePollution),
        ((0, 1), PairId(1), DialogueState::ChooseRain),
    ];

    for ((a, b), floor, state) in route {
        hold(&mut rig, a, b);
        assert_eq!(rig.dialogue().state(), state);
        assert_eq!(rig.ground().current(), Some(floor));
        speech_ended(&mut rig);
    }
    assert_eq!(rig.speaker().last(), Some("You are in rain mode on floor 1."));
}

/// Holding the active ground again does nothing
#[test]
fn test_same_ground_is_noop() {
    let mut rig = rain_on_floor_two();
    tap(&mut rig, 0, 2);

    let notices = hold(&mut rig, 2, 3);
    assert_eq!(rejections(&notices), vec![ReasonCode::R102_SAME_GROUND]);
    assert_eq!(rig.dialogue().state(), DialogueState::ChooseRain);
    assert_eq!(rig.ground().current(), Some(PairId(2)));
    assert_eq!(rig.sink().lit(), vec![10, 11]);
}

/// A switch while the feature line is still playing is rejected untouched
#[test]
fn test_switch_rejected_while_speaking() {
    let mut rig = rig();
    hold(&mut rig, 2, 3);
    speech_ended(&mut rig);
    assert!(rig.dialogue().is_speaking());
    tap(&mut rig, 4, 1);

    let notices = hold(&mut rig, 0, 1);
    assert_eq!(rejections(&notices), vec![ReasonCode::R101_SPEECH_IN_PROGRESS]);
    assert_eq!(rig.dialogue().state(), DialogueState::ChooseRain);
    assert_eq!(rig.ground().current(), Some(PairId(2)));
    assert_eq!(rig.sink().lit(), vec![10]);
}

/// Holds during the welcome are ignored
#[test]
fn test_hold_during_welcome_ignored() {
    let mut rig = rig();
    hold(&mut rig, 2, 3);

    let notices = hold(&mut rig, 4, 5);
    assert_eq!(rejections(&notices), vec![ReasonCode::R102_GROUND_IGNORED]);
    assert_eq!(rig.ground().current(), Some(PairId(2)));
    assert_eq!(rig.dialogue().state(), DialogueState::Welcome);
}

/// Holds before start select nothing
#[test]
fn test_hold_before_start_ignored() {
    let mut rig = Installation::new(
        InstallationConfig::default(),
        SpeechLog::new(),
        LedStrip::new(LED_COUNT),
        ManualTimers::new(),
    )
    .unwrap();

    hold(&mut rig, 2, 3);
    assert_eq!(rig.dialogue().state(), DialogueState::Init);
    assert_eq!(rig.ground().current(), None);
    assert!(rig.speaker().lines().is_empty());
}

/// Plus and minus buttons keep the lit cells a prefix of the floor
#[test]
fn test_stepper_through_roles() {
    let mut rig = rain_on_floor_two();

    tap(&mut rig, 0, 3);
    assert_eq!(rig.sink().lit(), vec![10, 11, 12]);
    assert_eq!(rig.leds().local().to_string(), "1110000000");

    tap(&mut rig, 5, 1);
    assert_eq!(rig.sink().lit(), vec![10, 11]);

    let notices = tap(&mut rig, 1, 3);
    assert!(rig.sink().lit().is_empty());
    assert_eq!(rejections(&notices), vec![ReasonCode::R103_STEPPER_EMPTY]);

    let notices = tap(&mut rig, 4, 12);
    assert_eq!(rig.sink().lit(), (10..20).collect::<Vec<_>>());
    assert_eq!(
        rejections(&notices),
        vec![ReasonCode::R103_STEPPER_FULL, ReasonCode::R103_STEPPER_FULL]
    );
}

/// Ground buttons are not stepper controls on their own floor
#[test]
fn test_ground_buttons_do_not_step() {
    let mut rig = rain_on_floor_two();
    let notices = tap(&mut rig, 2, 2);
    assert!(notices.is_empty());
    assert!(rig.sink().lit().is_empty());
}

/// No stepping before a floor-feature state
#[test]
fn test_no_stepping_while_waiting() {
    let mut rig = rig();
    let notices = tap(&mut rig, 0, 3);
    assert!(notices.is_empty());
    assert!(rig.sink().lit().is_empty());
}

/// Start wipes the strip and returns to waiting for a ground
#[test]
fn test_restart_clears_everything() {
    let mut rig = rain_on_floor_two();
    tap(&mut rig, 0, 4);

    rig.handle(RuntimeEvent::Start).unwrap();
    assert!(rig.sink().lit().is_empty());
    assert_eq!(rig.dialogue().state(), DialogueState::WaitingForGround);
    assert_eq!(rig.ground().current(), None);
    assert!(rig.leds().local().is_all_off());

    hold(&mut rig, 4, 5);
    assert_eq!(rig.dialogue().state(), DialogueState::Welcome);
    assert_eq!(rig.ground().current(), Some(PairId(3)));
}

/// A restart mid-welcome keeps the old utterance in play until it ends
#[test]
fn test_restart_during_speech_waits_for_it() {
    let mut rig = rig();
    hold(&mut rig, 2, 3);
    rig.handle(RuntimeEvent::Start).unwrap();
    assert!(rig.dialogue().is_speaking());

    let notices = hold(&mut rig, 4, 5);
    assert_eq!(rejections(&notices), vec![ReasonCode::R101_SPEECH_IN_PROGRESS]);
    assert_eq!(rig.ground().current(), None);
    assert_eq!(rig.speaker().lines().len(), 1);

    // the first welcome finishing does not move the new session
    assert!(speech_ended(&mut rig).is_empty());
    assert_eq!(rig.dialogue().state(), DialogueState::WaitingForGround);

    hold(&mut rig, 4, 5);
    assert_eq!(rig.dialogue().state(), DialogueState::Welcome);
    speech_ended(&mut rig);
    assert_eq!(rig.dialogue().state(), DialogueState::ChooseRain);
    assert_eq!(rig.speaker().last(), Some("You are in rain mode on floor 3."));
}

/// Continue with nothing pending is rejected
#[test]
fn test_continue_without_pending() {
    let mut rig = rain_on_floor_two();
    let notices = rig.handle(RuntimeEvent::Continue).unwrap();
    assert_eq!(rejections(&notices), vec![ReasonCode::R101_NO_PENDING_STATE]);
}

/// A speech end nobody asked for is reported and ignored
#[test]
fn test_unexpected_speech_end() {
    let mut rig = rain_on_floor_two();
    let notices = speech_ended(&mut rig);
    assert_eq!(rejections(&notices), vec![ReasonCode::R104_SPEECH_NOT_EXPECTED]);
    assert_eq!(rig.dialogue().state(), DialogueState::ChooseRain);
}

/// Stepper follows the configured LED table
#[test]
fn test_custom_led_table() {
    let mut config = InstallationConfig::default();
    config.floors[0].leds = [9, 8, 7, 6, 5, 4, 3, 2, 1, 0];
    let mut rig = rig_with(config);

    hold(&mut rig, 0, 1);
    speech_ended(&mut rig);
    tap(&mut rig, 2, 2);
    assert_eq!(rig.sink().lit(), vec![8, 9]);
}

/// Snapshot reflects the flow
#[test]
fn test_snapshot_parseable() {
    let mut rig = rain_on_floor_two();
    tap(&mut rig, 0, 1);

    let output = rig.snapshot().to_parseable_string();
    assert_eq!(
        output,
        "state=choose-rain | last=welcome | pending=- | ground=2 | leds=1000000000 | speaking=false | timers=0"
    );
}
