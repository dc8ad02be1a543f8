//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured lock events to the
//! ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::LockEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`LockEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &LockEvent) {
        match event {
            LockEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            LockEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            LockEvent::TamperDetected { level } => {
                warn!("TAMPER | light level {}", level);
            }
            LockEvent::KeyUpdated => {
                info!("KEY | updated");
            }
            LockEvent::StoreErased => {
                info!("STORE | key and state erased");
            }
            LockEvent::FactoryReset => {
                info!("STORE | factory defaults restored");
            }
            LockEvent::CommandRejected(e) => {
                info!("CMD | rejected: {}", e);
            }
        }
    }
}
