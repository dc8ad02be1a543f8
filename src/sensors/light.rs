//! LDR light sensor driver.
//!
//! The LDR sits in a voltage divider on an ADC1 channel.  Readings are
//! reported on a 10-bit scale (0 = dark, 1023 = bright) so the tamper
//! threshold is independent of the ADC width.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the 12-bit oneshot ADC (initialised by hw_init).
//! On host/test: reads from a static `AtomicU16` for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

/// Full-scale value of the reported light level.
pub const LEVEL_MAX: u16 = 1023;
/// Bits dropped from a 12-bit ADC sample.
const ADC_SHIFT: u32 = 2;

/// Raw 12-bit sample seen by the simulation backend.  Starts bright so a
/// freshly locked simulated device does not trip immediately.
#[cfg(not(target_os = "espidf"))]
static SIM_LIGHT_RAW: AtomicU16 = AtomicU16::new(4095);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_light_raw(raw: u16) {
    SIM_LIGHT_RAW.store(raw, Ordering::Relaxed);
}

pub struct LightSensor {
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    channel: u32,
}

impl LightSensor {
    pub fn new(channel: u32) -> Self {
        Self { channel }
    }

    /// Sample and scale to `0..=LEVEL_MAX`.
    pub fn read(&self) -> u16 {
        scale_adc(self.read_adc())
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc1_read(self.channel)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        SIM_LIGHT_RAW.load(Ordering::Relaxed)
    }
}

/// 12-bit ADC sample → 10-bit light level.
pub fn scale_adc(raw: u16) -> u16 {
    (raw >> ADC_SHIFT).min(LEVEL_MAX)
}
