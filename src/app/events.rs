//! Outbound lock events.
//!
//! The [`LockService`](super::service::LockService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (log to serial, count them in tests).

use crate::error::CommandError;
use crate::fsm::DeviceState;

/// Structured events emitted by the lock core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockEvent {
    /// Boot finished; carries the state loaded from the store.
    Started(DeviceState),

    /// The persisted device state changed.
    StateChanged { from: DeviceState, to: DeviceState },

    /// Light level dropped below the threshold while locked.
    TamperDetected { level: u16 },

    /// A new key was committed through hear mode.
    KeyUpdated,

    /// Key and state regions were overwritten with the sentinel.
    StoreErased,

    /// Default key and Unlocked were restored.
    FactoryReset,

    /// A command line was refused.
    CommandRejected(CommandError),
}
