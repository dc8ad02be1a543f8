//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the indicator LEDs and the LDR, exposing them through
//! [`IndicatorPort`] and [`LightSensorPort`].  On non-espidf targets the
//! underlying drivers use cfg-gated simulation stubs.

use log::warn;

use crate::app::ports::{IndicatorPort, LightSensorPort};
use crate::drivers::hw_init::GpioPin;
use crate::drivers::indicator::{Indicator, IndicatorLeds};
use crate::pins;
use crate::sensors::light::LightSensor;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    leds: IndicatorLeds<GpioPin>,
    light: LightSensor,
}

impl HardwareAdapter {
    pub fn new(leds: IndicatorLeds<GpioPin>, light: LightSensor) -> Self {
        Self { leds, light }
    }

    /// Adapter wired to the board pins from [`pins`].
    pub fn from_board() -> Self {
        Self::new(
            IndicatorLeds::new(
                GpioPin::new(pins::LED_GREEN_GPIO),
                GpioPin::new(pins::LED_RED_GPIO),
                GpioPin::new(pins::LED_ORANGE_GPIO),
            ),
            LightSensor::new(pins::LDR_ADC1_CHANNEL),
        )
    }
}

// ── IndicatorPort implementation ──────────────────────────────

impl IndicatorPort for HardwareAdapter {
    fn show(&mut self, output: Indicator) {
        if let Err(e) = self.leds.set(output) {
            warn!("Indicator: failed to show {output}: {e:?}");
        }
    }

    fn active(&self) -> Option<Indicator> {
        self.leds.active()
    }
}

// ── LightSensorPort implementation ────────────────────────────

impl LightSensorPort for HardwareAdapter {
    fn read_level(&mut self) -> u16 {
        self.light.read()
    }
}
