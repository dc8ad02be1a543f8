//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ LockService (domain)
//! ```
//!
//! Driven adapters (EEPROM image, indicator LEDs, light sensor, console,
//! event sinks) implement these traits.  The
//! [`LockService`](super::service::LockService) consumes them via generics,
//! so the domain core never touches hardware directly.

use crate::config::LockConfig;
use crate::drivers::indicator::Indicator;
use crate::error::StoreError;

// ───────────────────────────────────────────────────────────────
// Persistent store (driven adapter: domain ↔ EEPROM image)
// ───────────────────────────────────────────────────────────────

/// Byte-addressable non-volatile store.
///
/// No transactional guarantees: each `write` commits one byte.  The
/// layout on top of it lives in [`keystore`](crate::keystore).
pub trait PersistentStore {
    fn read(&self, addr: u16) -> Result<u8, StoreError>;

    fn write(&mut self, addr: u16, value: u8) -> Result<(), StoreError>;
}

// ───────────────────────────────────────────────────────────────
// Indicator port (driven adapter: domain → LEDs)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the three status outputs.
pub trait IndicatorPort {
    /// Make `output` the single active output.
    fn show(&mut self, output: Indicator);

    /// The output currently lit, as last commanded.
    fn active(&self) -> Option<Indicator>;
}

// ───────────────────────────────────────────────────────────────
// Light sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the tamper light sensor.
pub trait LightSensorPort {
    /// Light level on a 10-bit scale (0 = dark, 1023 = saturated).
    fn read_level(&mut self) -> u16;
}

// ───────────────────────────────────────────────────────────────
// Line source (driven adapter: transport → domain)
// ───────────────────────────────────────────────────────────────

/// Non-blocking source of command lines.
pub trait LineSource {
    /// Next complete line, without its terminator, if one is ready.
    fn poll_line(&mut self) -> Option<heapless::String<64>>;

    /// Send a reply line back over the same channel.
    fn reply(&mut self, text: &str);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`LockEvent`](super::events::LockEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::LockEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists [`LockConfig`].
///
/// Implementations MUST validate before persisting and reject out-of-range
/// values with [`ConfigError::ValidationFailed`] rather than clamp them.
pub trait ConfigPort {
    /// Returns [`LockConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<LockConfig, ConfigError>;

    fn save(&self, config: &LockConfig) -> Result<(), ConfigError>;
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
