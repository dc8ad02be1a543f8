//! Tamperlock firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod fsm;
pub mod key;
pub mod keystore;
pub mod tamper;

pub mod pins;

// Hardware-facing modules; the ESP-IDF paths are cfg-gated inside and
// fall back to simulation stubs on the host.
pub mod adapters;
pub mod drivers;
pub mod sensors;
