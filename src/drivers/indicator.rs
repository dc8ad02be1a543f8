//! Three-LED state indicator.
//!
//! Exactly one of green / red / orange is lit at any time.  The driver
//! switches both inactive outputs off before switching the active one on,
//! so no intermediate step ever has two LEDs lit.

use embedded_hal::digital::OutputPin;

use crate::fsm::DeviceState;

/// The three indicator outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    Green,
    Red,
    Orange,
}

impl Indicator {
    pub const ALL: [Indicator; 3] = [Indicator::Green, Indicator::Red, Indicator::Orange];

    /// Locked → green, Tampered → red, Unlocked → orange.
    pub const fn for_state(state: DeviceState) -> Self {
        match state {
            DeviceState::Locked => Indicator::Green,
            DeviceState::Tampered => Indicator::Red,
            DeviceState::Unlocked => Indicator::Orange,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Indicator::Green => "Green",
            Indicator::Red => "Red",
            Indicator::Orange => "Orange",
        }
    }
}

impl core::fmt::Display for Indicator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

pub struct IndicatorLeds<P: OutputPin> {
    green: P,
    red: P,
    orange: P,
    active: Option<Indicator>,
}

impl<P: OutputPin> IndicatorLeds<P> {
    pub fn new(green: P, red: P, orange: P) -> Self {
        Self {
            green,
            red,
            orange,
            active: None,
        }
    }

    /// Light `output` and nothing else.
    pub fn set(&mut self, output: Indicator) -> Result<(), P::Error> {
        for other in Indicator::ALL.into_iter().filter(|o| *o != output) {
            self.pin(other).set_low()?;
        }
        self.active = None;
        self.pin(output).set_high()?;
        self.active = Some(output);
        Ok(())
    }

    pub fn all_off(&mut self) -> Result<(), P::Error> {
        self.active = None;
        self.green.set_low()?;
        self.red.set_low()?;
        self.orange.set_low()
    }

    pub fn active(&self) -> Option<Indicator> {
        self.active
    }

    fn pin(&mut self, output: Indicator) -> &mut P {
        match output {
            Indicator::Green => &mut self.green,
            Indicator::Red => &mut self.red,
            Indicator::Orange => &mut self.orange,
        }
    }
}
