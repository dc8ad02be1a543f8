//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the lock's command rules, the interactive test
//! menu, and the outbound events.  All interaction with hardware happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod commands;
pub mod debug;
pub mod events;
pub mod ports;
pub mod service;
