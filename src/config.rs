//! System configuration parameters
//!
//! Tunable parameters for the lock indicator.  Values can be overridden via
//! NVS; the key and device state live in the EEPROM image, not here.

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockConfig {
    /// Light level (10-bit scale) below which a locked enclosure counts as tampered
    pub tamper_threshold: u16,
    /// Main loop cycle period (milliseconds)
    pub cycle_interval_ms: u32,
    /// Write processor replies back to the console
    pub echo_replies: bool,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            tamper_threshold: 800,
            cycle_interval_ms: 20, // 50 Hz
            echo_replies: true,
        }
    }
}

/// Range-check every field.  Shared by all [`ConfigPort`](crate::app::ports::ConfigPort)
/// implementations.
pub fn validate(cfg: &LockConfig) -> Result<(), crate::app::ports::ConfigError> {
    use crate::app::ports::ConfigError;

    if !(1..=1023).contains(&cfg.tamper_threshold) {
        return Err(ConfigError::ValidationFailed(
            "tamper_threshold must be 1–1023",
        ));
    }
    if !(1..=1000).contains(&cfg.cycle_interval_ms) {
        return Err(ConfigError::ValidationFailed(
            "cycle_interval_ms must be 1–1000",
        ));
    }
    Ok(())
}
