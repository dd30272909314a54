//! Fault taxonomy for configuration and programmer errors.
//!
//! Expected rejections (guard failures, stepper saturation) are not errors;
//! they travel as [`crate::types::ReasonCode`] inside notices.

use thiserror::Error;

use crate::types::PairId;

/// Errors that abort a single operation without touching other state
#[derive(Debug, Error)]
pub enum Error {
    /// Button id outside the configured range
    #[error("invalid button id {0}")]
    InvalidButtonId(u8),

    /// Pair id missing from the configuration table
    #[error("unknown pair {0}")]
    UnknownPair(PairId),

    /// Floor-local LED index outside 0..10
    #[error("invalid local LED index {0}, must be 0-9")]
    InvalidLocalIndex(usize),

    /// Configuration rejected by validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot read configuration: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("cannot parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
