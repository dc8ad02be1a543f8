//! Device context threaded through every state handler.
//!
//! `DeviceContext` is the single record the lock state machine reads from
//! and writes to: the current [`DeviceState`], the secret key, and the mode
//! flags layered on top of the state.  It is `Copy` so a transition can
//! snapshot it and roll back if the persistent write fails.

use super::DeviceState;
use crate::key::{DEFAULT_KEY, SecretKey};

// ---------------------------------------------------------------------------
// Mode flags
// ---------------------------------------------------------------------------

/// Independent booleans layered on top of [`DeviceState`].
///
/// At most one of `hear_mode` / `waiting_for_key` is true at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeFlags {
    /// Awaiting a new 8-byte key to commit.
    pub hear_mode: bool,
    /// Awaiting an 8-byte unlock attempt.
    pub waiting_for_key: bool,
    /// Tamper detector has fired and must not fire again until cleared.
    pub tamper_latched: bool,
}

impl ModeFlags {
    /// True if an input-capture mode is pending.
    pub fn capture_pending(&self) -> bool {
        self.hear_mode || self.waiting_for_key
    }
}

// ---------------------------------------------------------------------------
// DeviceContext
// ---------------------------------------------------------------------------

/// Everything the lock owns that outlives a single command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceContext {
    pub state: DeviceState,
    pub key: SecretKey,
    pub flags: ModeFlags,
}

impl DeviceContext {
    /// Context for a freshly loaded state and key.
    ///
    /// A device that powers up tampered stays latched.
    pub fn new(state: DeviceState, key: SecretKey) -> Self {
        Self {
            state,
            key,
            flags: ModeFlags {
                tamper_latched: state == DeviceState::Tampered,
                ..ModeFlags::default()
            },
        }
    }
}

impl Default for DeviceContext {
    fn default() -> Self {
        Self::new(DeviceState::Unlocked, DEFAULT_KEY)
    }
}
