//! Tamper monitor: a light-level threshold evaluator.
//!
//! Any reading strictly below `threshold` counts as tampering.
//!
//! The monitor only evaluates and logs edges.  The one-shot latch that
//! keeps a sustained low reading from firing twice lives in the device
//! context, where lock / unlock / erase / reset can clear it.

use log::{info, warn};

use crate::app::ports::LightSensorPort;

/// Default threshold on the 10-bit light scale.
pub const DEFAULT_THRESHOLD: u16 = 800;

pub struct TamperMonitor {
    threshold: u16,
    below: bool,
    last_level: Option<u16>,
}

impl TamperMonitor {
    pub fn new(threshold: u16) -> Self {
        Self {
            threshold,
            below: false,
            last_level: None,
        }
    }

    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    pub fn last_level(&self) -> Option<u16> {
        self.last_level
    }

    /// Read the sensor once and evaluate it.
    pub fn poll(&mut self, sensor: &mut impl LightSensorPort) -> Option<u16> {
        let level = sensor.read_level();
        self.check(level).then_some(level)
    }

    /// True if `level` indicates tampering.
    pub fn check(&mut self, level: u16) -> bool {
        self.last_level = Some(level);
        let below = level < self.threshold;
        if below != self.below {
            if below {
                warn!("TAMPER: light level {} below threshold {}", level, self.threshold);
            } else {
                info!("TAMPER: light level {} back above threshold", level);
            }
        }
        self.below = below;
        below
    }
}

impl Default for TamperMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}
