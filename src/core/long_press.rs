//! Pair long-press detector
//!
//! A pair fires once both of its buttons have been held continuously for the
//! threshold. The decision is made at expiry, never on release:
//! - press completing a pair → cancel any old timer, clear the latch, arm
//! - release of either button → cancel the pair's timer
//! - expiry → re-check both buttons and the latch, then emit once
//!
//! The expiry re-check covers a release and an expiry racing in the same
//! event-loop turn; the handle match drops expiries of cancelled timers.

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::InstallationConfig;
use crate::core::buttons::ButtonRegistry;
use crate::core::timers::TimerProvider;
use crate::types::{ButtonId, PairId, TimerHandle};
use crate::{Error, Result};

/// Per-pair timer slot and re-trigger latch
#[derive(Debug, Default, Clone, Copy)]
struct PairTimer {
    handle: Option<TimerHandle>,
    triggered: bool,
}

/// Detects continuous simultaneous holds of configured button pairs
#[derive(Debug)]
pub struct PairLongPressDetector {
    pairs: BTreeMap<PairId, [ButtonId; 2]>,
    timers: BTreeMap<PairId, PairTimer>,
    threshold: Duration,
}

impl PairLongPressDetector {
    /// Create a detector for the given pairs
    pub fn new(pairs: impl IntoIterator<Item = (PairId, [ButtonId; 2])>, threshold: Duration) -> Self {
        let pairs: BTreeMap<PairId, [ButtonId; 2]> = pairs.into_iter().collect();
        let timers = pairs.keys().map(|p| (*p, PairTimer::default())).collect();
        Self {
            pairs,
            timers,
            threshold,
        }
    }

    pub fn from_config(config: &InstallationConfig) -> Self {
        Self::new(
            config.floors.iter().map(|f| (f.pair, f.buttons)),
            config.long_press_threshold(),
        )
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Pair a button belongs to, if any
    pub fn pair_of(&self, button: ButtonId) -> Option<PairId> {
        self.pairs
            .iter()
            .find(|(_, buttons)| buttons.contains(&button))
            .map(|(pair, _)| *pair)
    }

    /// Member buttons of a pair
    pub fn buttons(&self, pair: PairId) -> Result<[ButtonId; 2]> {
        self.pairs.get(&pair).copied().ok_or(Error::UnknownPair(pair))
    }

    /// Handle a fresh press (already recorded in `registry`).
    ///
    /// Returns the armed handle when the press completed its pair.
    pub fn on_press(
        &mut self,
        button: ButtonId,
        registry: &ButtonRegistry,
        timers: &mut impl TimerProvider,
    ) -> Result<Option<TimerHandle>> {
        let Some(pair) = self.pair_of(button) else {
            return Ok(None);
        };
        if !registry.all_pressed(&self.buttons(pair)?)? {
            return Ok(None);
        }
        self.arm(pair, timers).map(Some)
    }

    /// Handle a fresh release. Returns true when a pending timer was cancelled.
    pub fn on_release(&mut self, button: ButtonId, timers: &mut impl TimerProvider) -> Result<bool> {
        match self.pair_of(button) {
            Some(pair) => self.cancel(pair, timers),
            None => Ok(false),
        }
    }

    /// (Re)start the threshold timer for a pair
    pub fn arm(&mut self, pair: PairId, timers: &mut impl TimerProvider) -> Result<TimerHandle> {
        let threshold = self.threshold;
        let slot = self.timers.get_mut(&pair).ok_or(Error::UnknownPair(pair))?;

        if let Some(old) = slot.handle.take() {
            timers.cancel(old);
        }
        slot.triggered = false;
        let handle = timers.schedule(pair, threshold);
        slot.handle = Some(handle);

        debug!(pair = %pair, handle = handle.0, threshold_ms = threshold.as_millis() as u64, "long-press timer armed");
        Ok(handle)
    }

    /// Cancel the pair's pending timer. Returns true if one was pending.
    pub fn cancel(&mut self, pair: PairId, timers: &mut impl TimerProvider) -> Result<bool> {
        let slot = self.timers.get_mut(&pair).ok_or(Error::UnknownPair(pair))?;
        match slot.handle.take() {
            Some(handle) => {
                timers.cancel(handle);
                debug!(pair = %pair, handle = handle.0, "long-press timer cancelled");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Timer expiry. Returns true exactly when `PairLongPressed(pair)` must be emitted.
    pub fn on_timer_fired(
        &mut self,
        pair: PairId,
        handle: TimerHandle,
        registry: &ButtonRegistry,
    ) -> Result<bool> {
        let buttons = self.buttons(pair)?;
        let slot = self.timers.get_mut(&pair).ok_or(Error::UnknownPair(pair))?;

        if slot.handle != Some(handle) {
            debug!(pair = %pair, handle = handle.0, "stale timer ignored");
            return Ok(false);
        }
        slot.handle = None;

        if slot.triggered {
            return Ok(false);
        }
        if !registry.all_pressed(&buttons)? {
            debug!(pair = %pair, "pair released before expiry");
            return Ok(false);
        }

        slot.triggered = true;
        info!(pair = %pair, threshold_ms = self.threshold.as_millis() as u64, "pair long-pressed");
        Ok(true)
    }

    /// Cancel every pending timer and clear every latch
    pub fn reset(&mut self, timers: &mut impl TimerProvider) {
        for slot in self.timers.values_mut() {
            if let Some(handle) = slot.handle.take() {
                timers.cancel(handle);
            }
            slot.triggered = false;
        }
    }

    pub fn is_pending(&self, pair: PairId) -> bool {
        self.timers.get(&pair).is_some_and(|s| s.handle.is_some())
    }

    pub fn is_triggered(&self, pair: PairId) -> bool {
        self.timers.get(&pair).is_some_and(|s| s.triggered)
    }

    /// Number of armed timers across all pairs
    pub fn pending_count(&self) -> usize {
        self.timers.values().filter(|s| s.handle.is_some()).count()
    }
}

// =============================================================================
// TESTS
// =============================================================================
