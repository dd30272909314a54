//! Installation layout: pairs, floor LED ranges, stepper roles and timing.
//!
//! Defaults mirror the constants in the crate root. A JSON file with the same
//! shape can replace them at startup.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::speech::VoicePreset;
use crate::types::{ButtonId, PairId};
use crate::{Error, Result, BUTTON_COUNT, FLOOR_LED_COUNT, LED_COUNT, LONG_PRESS_THRESHOLD_MS};

/// One ground pair and the floor it selects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorConfig {
    /// Pair number (1-based)
    pub pair: PairId,
    /// The two buttons that must be held together
    pub buttons: [ButtonId; 2],
    /// Physical LED index for each local index 0..10
    pub leds: [usize; FLOOR_LED_COUNT],
    /// Buttons that light the next LED while this floor is active
    #[serde(default)]
    pub stepper_plus: Vec<ButtonId>,
    /// Buttons that darken the last LED while this floor is active
    #[serde(default)]
    pub stepper_minus: Vec<ButtonId>,
}

/// Full installation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallationConfig {
    pub long_press_threshold_ms: u64,
    pub button_count: u8,
    pub led_count: usize,
    pub voice: VoicePreset,
    pub floors: Vec<FloorConfig>,
}

impl Default for InstallationConfig {
    fn default() -> Self {
        let buttons = [
            [ButtonId(0), ButtonId(1)],
            [ButtonId(2), ButtonId(3)],
            [ButtonId(4), ButtonId(5)],
        ];

        // Each floor owns one decade; the two other pairs step its LEDs,
        // first button "+" and second button "-".
        let floors = (0..buttons.len())
            .map(|i| {
                let others: Vec<[ButtonId; 2]> = buttons
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(_, b)| *b)
                    .collect();
                let mut leds = [0usize; FLOOR_LED_COUNT];
                for (local, led) in leds.iter_mut().enumerate() {
                    *led = i * FLOOR_LED_COUNT + local;
                }
                FloorConfig {
                    pair: PairId(i as u8 + 1),
                    buttons: buttons[i],
                    leds,
                    stepper_plus: others.iter().map(|b| b[0]).collect(),
                    stepper_minus: others.iter().map(|b| b[1]).collect(),
                }
            })
            .collect();

        Self {
            long_press_threshold_ms: LONG_PRESS_THRESHOLD_MS,
            button_count: BUTTON_COUNT,
            led_count: LED_COUNT,
            voice: VoicePreset::default(),
            floors,
        }
    }
}

impl InstallationConfig {
    /// Read and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: InstallationConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn long_press_threshold(&self) -> Duration {
        Duration::from_millis(self.long_press_threshold_ms)
    }

    /// Floor entry for a pair
    pub fn floor(&self, pair: PairId) -> Option<&FloorConfig> {
        self.floors.iter().find(|f| f.pair == pair)
    }

    /// Check the table for programmer errors before anything runs
    pub fn validate(&self) -> Result<()> {
        if self.long_press_threshold_ms == 0 {
            return Err(invalid("long_press_threshold_ms must be positive"));
        }
        if self.floors.is_empty() {
            return Err(invalid("at least one floor is required"));
        }

        let mut pairs = BTreeSet::new();
        let mut owners: BTreeMap<ButtonId, PairId> = BTreeMap::new();
        let mut led_owners: BTreeMap<usize, PairId> = BTreeMap::new();

        for floor in &self.floors {
            if floor.pair.0 == 0 {
                return Err(invalid("pair ids start at 1"));
            }
            if !pairs.insert(floor.pair) {
                return Err(invalid(format!("pair {} defined twice", floor.pair)));
            }
            if floor.buttons[0] == floor.buttons[1] {
                return Err(invalid(format!("pair {} uses button {} twice", floor.pair, floor.buttons[0])));
            }
            for button in floor.buttons {
                self.check_button(button)?;
                if let Some(other) = owners.insert(button, floor.pair) {
                    return Err(invalid(format!(
                        "button {} belongs to pairs {} and {}",
                        button, other, floor.pair
                    )));
                }
            }
            for button in floor.stepper_plus.iter().chain(&floor.stepper_minus) {
                self.check_button(*button)?;
            }
            if let Some(both) = floor.stepper_plus.iter().find(|b| floor.stepper_minus.contains(b)) {
                return Err(invalid(format!(
                    "button {} is both + and - on floor {}",
                    both, floor.pair
                )));
            }
            for &led in &floor.leds {
                if led >= self.led_count {
                    return Err(invalid(format!(
                        "floor {} maps to LED {} beyond strip of {}",
                        floor.pair, led, self.led_count
                    )));
                }
                if let Some(other) = led_owners.insert(led, floor.pair) {
                    if other != floor.pair {
                        warn!(led, floor_a = %other, floor_b = %floor.pair, "floor LED ranges overlap");
                    }
                }
            }
        }

        Ok(())
    }

    fn check_button(&self, button: ButtonId) -> Result<()> {
        if button.0 >= self.button_count {
            return Err(Error::InvalidButtonId(button.0));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> Error {
    Error::InvalidConfig(msg.into())
}
