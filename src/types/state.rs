//! Dialogue state definitions

use serde::{Deserialize, Serialize};

/// Floor features the dialogue cycles through, one per floor switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Rain,
    Wind,
    Hour,
    Pollution,
}

impl Feature {
    /// All features in cycle order
    pub const ALL: [Feature; 4] = [Feature::Rain, Feature::Wind, Feature::Hour, Feature::Pollution];

    /// Next feature in the rain → wind → hour → pollution → rain cycle
    pub fn next(self) -> Feature {
        match self {
            Feature::Rain => Feature::Wind,
            Feature::Wind => Feature::Hour,
            Feature::Hour => Feature::Pollution,
            Feature::Pollution => Feature::Rain,
        }
    }

    /// Dialogue state that presents this feature
    pub fn state(self) -> DialogueState {
        match self {
            Feature::Rain => DialogueState::ChooseRain,
            Feature::Wind => DialogueState::ChooseWind,
            Feature::Hour => DialogueState::ChooseHour,
            Feature::Pollution => DialogueState::ChoosePollution,
        }
    }

    /// Slot in per-feature tables
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Feature::Rain => "rain",
            Feature::Wind => "wind",
            Feature::Hour => "hour",
            Feature::Pollution => "pollution",
        }
    }
}

/// The fixed conversation graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DialogueState {
    /// Clears the strip, then moves on unconditionally
    Init,
    /// Passive until the first ground long-press
    WaitingForGround,
    /// Greets the visitor, continues after the speech ends
    Welcome,
    ChooseRain,
    ChooseWind,
    ChooseHour,
    ChoosePollution,
}

impl DialogueState {
    /// Feature presented in this state, if it is a floor-feature state
    pub fn feature(self) -> Option<Feature> {
        match self {
            DialogueState::ChooseRain => Some(Feature::Rain),
            DialogueState::ChooseWind => Some(Feature::Wind),
            DialogueState::ChooseHour => Some(Feature::Hour),
            DialogueState::ChoosePollution => Some(Feature::Pollution),
            _ => None,
        }
    }

    pub fn is_floor_feature(self) -> bool {
        self.feature().is_some()
    }

    pub fn name(self) -> &'static str {
        match self {
            DialogueState::Init => "init",
            DialogueState::WaitingForGround => "waiting-for-ground",
            DialogueState::Welcome => "welcome",
            DialogueState::ChooseRain => "choose-rain",
            DialogueState::ChooseWind => "choose-wind",
            DialogueState::ChooseHour => "choose-hour",
            DialogueState::ChoosePollution => "choose-pollution",
        }
    }

    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            DialogueState::Init | DialogueState::WaitingForGround => "\x1b[90m", // Gray
            DialogueState::Welcome => "\x1b[33m",                                // Yellow
            DialogueState::ChooseRain => "\x1b[34m",                             // Blue
            DialogueState::ChooseWind => "\x1b[36m",                             // Cyan
            DialogueState::ChooseHour => "\x1b[35m",                             // Magenta
            DialogueState::ChoosePollution => "\x1b[31m",                        // Red
        }
    }

    /// Reset ANSI color
    pub fn color_reset() -> &'static str {
        "\x1b[0m"
    }

    /// Get emoji for state
    pub fn emoji(&self) -> &'static str {
        match self {
            DialogueState::Init => "⚙",
            DialogueState::WaitingForGround => "⏳",
            DialogueState::Welcome => "👋",
            DialogueState::ChooseRain => "🌧",
            DialogueState::ChooseWind => "🌬",
            DialogueState::ChooseHour => "🕒",
            DialogueState::ChoosePollution => "🏭",
        }
    }
}

impl std::fmt::Display for DialogueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
