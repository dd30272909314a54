//! Button registry: raw pressed/released state per button id

use crate::types::ButtonId;
use crate::{Error, Result};

/// Pressed state of every configured button
#[derive(Debug, Clone)]
pub struct ButtonRegistry {
    pressed: Vec<bool>,
}

impl ButtonRegistry {
    /// Create a registry with `count` released buttons
    pub fn new(count: u8) -> Self {
        Self {
            pressed: vec![false; count as usize],
        }
    }

    /// Mark pressed, return the previous value
    pub fn press(&mut self, id: ButtonId) -> Result<bool> {
        let slot = self.slot(id)?;
        Ok(std::mem::replace(slot, true))
    }

    /// Mark released, return the previous value
    pub fn release(&mut self, id: ButtonId) -> Result<bool> {
        let slot = self.slot(id)?;
        Ok(std::mem::replace(slot, false))
    }

    pub fn is_pressed(&self, id: ButtonId) -> Result<bool> {
        self.pressed
            .get(id.index())
            .copied()
            .ok_or(Error::InvalidButtonId(id.0))
    }

    /// True when every listed button is held
    pub fn all_pressed(&self, ids: &[ButtonId]) -> Result<bool> {
        for &id in ids {
            if !self.is_pressed(id)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.pressed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty()
    }

    fn slot(&mut self, id: ButtonId) -> Result<&mut bool> {
        self.pressed
            .get_mut(id.index())
            .ok_or(Error::InvalidButtonId(id.0))
    }
}

// =============================================================================
// TESTS
// =============================================================================
