//! Sensor drivers.

pub mod light;
