//! Speech collaborator
//!
//! The engine is a black box: `speak` starts an utterance and the engine
//! later reports completion through [`RuntimeEvent::SpeechEnded`], once per
//! call.

use std::time::Duration;

use colored::Colorize;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use crate::types::RuntimeEvent;

/// Voice settings handed to the speech engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoicePreset {
    pub name: String,
    pub rate: f32,
    pub pitch: f32,
}

impl Default for VoicePreset {
    fn default() -> Self {
        Self {
            name: "normal".to_string(),
            rate: 1.0,
            pitch: 1.0,
        }
    }
}

/// Capability to start an utterance
pub trait Speaker {
    fn speak(&mut self, text: &str, voice: &VoicePreset);
}

/// Records utterances; completion is reported by the caller
#[derive(Debug, Default)]
pub struct SpeechLog {
    lines: Vec<String>,
}

impl SpeechLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything spoken so far
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn last(&self) -> Option<&str> {
        self.lines.last().map(String::as_str)
    }
}

impl Speaker for SpeechLog {
    fn speak(&mut self, text: &str, _voice: &VoicePreset) {
        self.lines.push(text.to_string());
    }
}

/// Prints utterances and simulates their duration on the tokio runtime
#[derive(Debug)]
pub struct TerminalSpeaker {
    tx: UnboundedSender<RuntimeEvent>,
    ms_per_word: u64,
    /// When false, speech ends only on an explicit operator command
    auto_end: bool,
    no_color: bool,
}

impl TerminalSpeaker {
    pub fn new(tx: UnboundedSender<RuntimeEvent>, ms_per_word: u64, auto_end: bool, no_color: bool) -> Self {
        Self {
            tx,
            ms_per_word,
            auto_end,
            no_color,
        }
    }

    /// Simulated playback length
    pub fn duration_for(&self, text: &str) -> Duration {
        let words = text.split_whitespace().count().max(1) as u64;
        Duration::from_millis(words * self.ms_per_word)
    }
}

impl Speaker for TerminalSpeaker {
    fn speak(&mut self, text: &str, voice: &VoicePreset) {
        if self.no_color {
            println!("  speak [{}]: {}", voice.name, text);
        } else {
            println!("  🗣  {} {}", format!("[{}]", voice.name).dimmed(), text.bold());
        }

        if self.auto_end {
            let tx = self.tx.clone();
            let after = self.duration_for(text);
            tokio::spawn(async move {
                tokio::time::sleep(after).await;
                let _ = tx.send(RuntimeEvent::SpeechEnded);
            });
        }
    }
}
