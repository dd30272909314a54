//! Operator console commands
//!
//! One command per line: `start`, `press 2 3`, `release 3`, `tap 0`, `done`,
//! `next`, `state`, `leds`, `help`, `quit`. `p`/`r` abbreviate press/release.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::types::{ButtonId, RuntimeEvent};

lazy_static! {
    static ref RE_COMMAND: Regex = Regex::new(
        r"(?i)^\s*(start|press|p|release|r|tap|done|next|state|leds|help|quit|exit)\b(.*)$"
    ).unwrap();

    static ref RE_BUTTON: Regex = Regex::new(r"[^\s,]+").unwrap();
}

/// Parsed console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Press(Vec<ButtonId>),
    Release(Vec<ButtonId>),
    /// Press then release each button
    Tap(Vec<ButtonId>),
    /// Speech engine reports the end of the utterance
    Done,
    /// Re-attempt the pending transition
    Next,
    State,
    Leds,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}', type help")]
    Unknown(String),

    #[error("{0} needs at least one button id")]
    MissingButtons(&'static str),

    #[error("'{0}' is not a button id")]
    BadButton(String),
}

impl Command {
    /// Events this command feeds into the loop, in order
    pub fn events(&self) -> Vec<RuntimeEvent> {
        match self {
            Command::Start => vec![RuntimeEvent::Start],
            Command::Press(ids) => ids.iter().map(|id| RuntimeEvent::ButtonPressed(*id)).collect(),
            Command::Release(ids) => ids.iter().map(|id| RuntimeEvent::ButtonReleased(*id)).collect(),
            Command::Tap(ids) => ids
                .iter()
                .flat_map(|id| [RuntimeEvent::ButtonPressed(*id), RuntimeEvent::ButtonReleased(*id)])
                .collect(),
            Command::Done => vec![RuntimeEvent::SpeechEnded],
            Command::Next => vec![RuntimeEvent::Continue],
            Command::State | Command::Leds | Command::Help | Command::Quit => Vec::new(),
        }
    }
}

/// Parse one console line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let Some(caps) = RE_COMMAND.captures(line) else {
        return Err(CommandError::Unknown(line.split_whitespace().next().unwrap_or(line).to_string()));
    };
    let verb = caps[1].to_ascii_lowercase();
    let rest = caps.get(2).map(|m| m.as_str()).unwrap_or("");

    let command = match verb.as_str() {
        "start" => Command::Start,
        "press" | "p" => Command::Press(parse_buttons(rest, "press")?),
        "release" | "r" => Command::Release(parse_buttons(rest, "release")?),
        "tap" => Command::Tap(parse_buttons(rest, "tap")?),
        "done" => Command::Done,
        "next" => Command::Next,
        "state" => Command::State,
        "leds" => Command::Leds,
        "help" => Command::Help,
        _ => Command::Quit,
    };
    Ok(Some(command))
}

fn parse_buttons(rest: &str, verb: &'static str) -> Result<Vec<ButtonId>, CommandError> {
    let ids = RE_BUTTON
        .find_iter(rest)
        .map(|m| {
            m.as_str()
                .parse::<u8>()
                .map(ButtonId)
                .map_err(|_| CommandError::BadButton(m.as_str().to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if ids.is_empty() {
        return Err(CommandError::MissingButtons(verb));
    }
    Ok(ids)
}

/// Console help text
pub const HELP: &str = "\
commands:
  start              reset and begin the dialogue
  press <ids..>      press buttons (p)
  release <ids..>    release buttons (r)
  tap <ids..>        press then release each button
  done               report the end of the current speech
  next               retry the pending dialogue transition
  state              show the current state
  leds               show the LED strip
  wait <ms>          pause a piped script
  quit               exit";

// =============================================================================
// TESTS
// =============================================================================
