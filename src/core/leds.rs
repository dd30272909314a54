//! Floor LED mapping and the per-floor stepper
//!
//! Each floor owns ten physical LEDs listed in configuration order. The
//! stepper only ever lights the first dark cell or darkens the last lit one,
//! so the lit cells always form a prefix of the floor.

use std::collections::BTreeMap;

use colored::Colorize;
use tracing::{debug, warn};

use crate::config::InstallationConfig;
use crate::types::{ButtonId, PairId, Rgb};
use crate::{Error, Result, FLOOR_LED_COUNT};

/// Output capability for the LED strip (fire-and-forget)
pub trait LedSink {
    fn set_led(&mut self, index: usize, color: Rgb);
}

/// In-memory strip; tests inspect it and the console renders it
#[derive(Debug, Clone)]
pub struct LedStrip {
    pixels: Vec<Rgb>,
    generation: u64,
}

impl LedStrip {
    pub fn new(count: usize) -> Self {
        Self {
            pixels: vec![Rgb::OFF; count],
            generation: 0,
        }
    }

    pub fn pixel(&self, index: usize) -> Option<Rgb> {
        self.pixels.get(index).copied()
    }

    /// Physical indices currently not off
    pub fn lit(&self) -> Vec<usize> {
        self.pixels
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_off())
            .map(|(i, _)| i)
            .collect()
    }

    /// Bumped on every write, lets the console redraw only on change
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        self.pixels
            .chunks(FLOOR_LED_COUNT)
            .map(|chunk| {
                chunk
                    .iter()
                    .map(|p| {
                        if p.is_off() {
                            "·".dimmed().to_string()
                        } else {
                            "●".truecolor(p.r, p.g, p.b).to_string()
                        }
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        self.pixels
            .chunks(FLOOR_LED_COUNT)
            .map(|chunk| chunk.iter().map(|p| if p.is_off() { '.' } else { '#' }).collect::<String>())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl LedSink for LedStrip {
    fn set_led(&mut self, index: usize, color: Rgb) {
        match self.pixels.get_mut(index) {
            Some(pixel) => {
                *pixel = color;
                self.generation += 1;
            }
            None => warn!(index, "LED index beyond strip"),
        }
    }
}

/// Stepper position on the active floor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocalLedState([bool; FLOOR_LED_COUNT]);

impl LocalLedState {
    pub fn is_lit(&self, local: usize) -> bool {
        self.0.get(local).copied().unwrap_or(false)
    }

    pub fn lit_count(&self) -> usize {
        self.0.iter().filter(|on| **on).count()
    }

    pub fn first_off(&self) -> Option<usize> {
        self.0.iter().position(|on| !on)
    }

    pub fn last_on(&self) -> Option<usize> {
        self.0.iter().rposition(|on| *on)
    }

    pub fn is_all_off(&self) -> bool {
        self.lit_count() == 0
    }

    fn set(&mut self, local: usize, on: bool) {
        self.0[local] = on;
    }
}

impl std::fmt::Display for LocalLedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for on in self.0 {
            write!(f, "{}", if on { '1' } else { '0' })?;
        }
        Ok(())
    }
}

/// Stepper control role of a button on a given floor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Increment,
    Decrement,
}

/// One applied stepper move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub local: usize,
    pub physical: usize,
    pub lit: bool,
}

#[derive(Debug, Clone)]
struct FloorEntry {
    leds: [usize; FLOOR_LED_COUNT],
    plus: Vec<ButtonId>,
    minus: Vec<ButtonId>,
}

/// Floor → LED table, stepper roles and the active floor's local state
#[derive(Debug, Clone)]
pub struct FloorLeds {
    floors: BTreeMap<PairId, FloorEntry>,
    led_count: usize,
    local: LocalLedState,
}

impl FloorLeds {
    pub fn from_config(config: &InstallationConfig) -> Self {
        let floors = config
            .floors
            .iter()
            .map(|f| {
                (
                    f.pair,
                    FloorEntry {
                        leds: f.leds,
                        plus: f.stepper_plus.clone(),
                        minus: f.stepper_minus.clone(),
                    },
                )
            })
            .collect();
        Self {
            floors,
            led_count: config.led_count,
            local: LocalLedState::default(),
        }
    }

    /// Physical LED for a floor-local index
    pub fn map_local_to_physical(&self, floor: PairId, local: usize) -> Result<usize> {
        if local >= FLOOR_LED_COUNT {
            return Err(Error::InvalidLocalIndex(local));
        }
        Ok(self.entry(floor)?.leds[local])
    }

    /// Darken all ten LEDs of a floor
    pub fn turn_off_floor(&self, floor: PairId, sink: &mut impl LedSink) -> Result<()> {
        for &physical in &self.entry(floor)?.leds {
            sink.set_led(physical, Rgb::OFF);
        }
        debug!(floor = %floor, "floor LEDs off");
        Ok(())
    }

    /// Darken the whole strip
    pub fn all_off(&self, sink: &mut impl LedSink) {
        for index in 0..self.led_count {
            sink.set_led(index, Rgb::OFF);
        }
    }

    /// Stepper role of `button` while `floor` is ground
    pub fn role_for(&self, floor: PairId, button: ButtonId) -> Option<StepDirection> {
        let entry = self.floors.get(&floor)?;
        if entry.plus.contains(&button) {
            Some(StepDirection::Increment)
        } else if entry.minus.contains(&button) {
            Some(StepDirection::Decrement)
        } else {
            None
        }
    }

    pub fn step(&mut self, floor: PairId, direction: StepDirection, sink: &mut impl LedSink) -> Result<Option<Step>> {
        match direction {
            StepDirection::Increment => self.step_increment(floor, sink),
            StepDirection::Decrement => self.step_decrement(floor, sink),
        }
    }

    /// Light the first dark cell. `None` when the floor is full.
    pub fn step_increment(&mut self, floor: PairId, sink: &mut impl LedSink) -> Result<Option<Step>> {
        let Some(local) = self.local.first_off() else {
            debug!(floor = %floor, "stepper full");
            return Ok(None);
        };
        let physical = self.map_local_to_physical(floor, local)?;

        self.local.set(local, true);
        sink.set_led(physical, Rgb::WHITE);
        debug!(floor = %floor, local, physical, "stepper +");
        Ok(Some(Step { local, physical, lit: true }))
    }

    /// Darken the last lit cell. `None` when the floor is empty.
    pub fn step_decrement(&mut self, floor: PairId, sink: &mut impl LedSink) -> Result<Option<Step>> {
        let Some(local) = self.local.last_on() else {
            debug!(floor = %floor, "stepper empty");
            return Ok(None);
        };
        let physical = self.map_local_to_physical(floor, local)?;

        self.local.set(local, false);
        sink.set_led(physical, Rgb::OFF);
        debug!(floor = %floor, local, physical, "stepper -");
        Ok(Some(Step { local, physical, lit: false }))
    }

    pub fn local(&self) -> LocalLedState {
        self.local
    }

    /// All cells off, without touching the strip
    pub fn reset_local(&mut self) {
        self.local = LocalLedState::default();
    }

    fn entry(&self, floor: PairId) -> Result<&FloorEntry> {
        self.floors.get(&floor).ok_or(Error::UnknownPair(floor))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LED_COUNT;

    fn rig() -> (FloorLeds, LedStrip) {
        (
            FloorLeds::from_config(&InstallationConfig::default()),
            LedStrip::new(LED_COUNT),
        )
    }

    #[test]
    fn test_map_default_decades() {
        let (leds, _) = rig();
        assert_eq!(leds.map_local_to_physical(PairId(1), 0).unwrap(), 0);
        assert_eq!(leds.map_local_to_physical(PairId(2), 3).unwrap(), 13);
        assert_eq!(leds.map_local_to_physical(PairId(3), 9).unwrap(), 29);
    }

    #[test]
    fn test_map_rejects_bad_local_index() {
        let (leds, _) = rig();
        assert!(matches!(
            leds.map_local_to_physical(PairId(1), 10),
            Err(Error::InvalidLocalIndex(10))
        ));
        assert!(matches!(
            leds.map_local_to_physical(PairId(7), 0),
            Err(Error::UnknownPair(PairId(7)))
        ));
    }

    #[test]
    fn test_map_follows_table_not_arithmetic() {
        let mut config = InstallationConfig::default();
        config.floors[0].leds = [9, 8, 7, 6, 5, 4, 3, 2, 1, 0];
        let leds = FloorLeds::from_config(&config);
        assert_eq!(leds.map_local_to_physical(PairId(1), 0).unwrap(), 9);
    }

    #[test]
    fn test_increment_fills_prefix() {
        let (mut leds, mut strip) = rig();
        for n in 1..=4 {
            leds.step_increment(PairId(2), &mut strip).unwrap();
            assert_eq!(leds.local().lit_count(), n);
        }
        assert_eq!(leds.local().to_string(), "1111000000");
        assert_eq!(strip.lit(), vec![10, 11, 12, 13]);
    }

    #[test]
    fn test_decrement_removes_last() {
        let (mut leds, mut strip) = rig();
        for _ in 0..3 {
            leds.step_increment(PairId(1), &mut strip).unwrap();
        }
        assert_eq!(strip.pixel(2), Some(Rgb::WHITE));
        let step = leds.step_decrement(PairId(1), &mut strip).unwrap().unwrap();
        assert_eq!(step, Step { local: 2, physical: 2, lit: false });
        assert_eq!(strip.pixel(2), Some(Rgb::OFF));
        assert_eq!(strip.pixel(LED_COUNT), None);
        assert_eq!(strip.lit(), vec![0, 1]);
    }

    #[test]
    fn test_saturation_is_noop() {
        let (mut leds, mut strip) = rig();
        assert!(leds.step_decrement(PairId(3), &mut strip).unwrap().is_none());
        for _ in 0..10 {
            assert!(leds.step_increment(PairId(3), &mut strip).unwrap().is_some());
        }
        let generation = strip.generation();
        assert!(leds.step_increment(PairId(3), &mut strip).unwrap().is_none());
        assert_eq!(strip.generation(), generation);
    }

    #[test]
    fn test_turn_off_floor_is_idempotent() {
        let (mut leds, mut strip) = rig();
        for _ in 0..5 {
            leds.step_increment(PairId(2), &mut strip).unwrap();
        }
        leds.turn_off_floor(PairId(2), &mut strip).unwrap();
        leds.turn_off_floor(PairId(2), &mut strip).unwrap();
        assert!(strip.lit().is_empty());
    }

    #[test]
    fn test_roles_per_floor() {
        let (leds, _) = rig();
        assert_eq!(leds.role_for(PairId(1), ButtonId(2)), Some(StepDirection::Increment));
        assert_eq!(leds.role_for(PairId(1), ButtonId(5)), Some(StepDirection::Decrement));
        assert_eq!(leds.role_for(PairId(1), ButtonId(0)), None);
        assert_eq!(leds.role_for(PairId(3), ButtonId(0)), Some(StepDirection::Increment));
    }

    #[test]
    fn test_parseable_strip() {
        let (mut leds, mut strip) = rig();
        leds.step_increment(PairId(1), &mut strip).unwrap();
        assert_eq!(strip.to_parseable_string(), "#......... .......... ..........");
    }
}
