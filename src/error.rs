//! Unified error types for the tamperlock firmware.
//!
//! Every failure in the command path is reported, none are fatal.  All
//! variants are `Copy` so they can be returned through the processor,
//! emitted as events, and rendered to the console without allocation.

use core::fmt;

use crate::key::KEY_LEN;

// ---------------------------------------------------------------------------
// Command errors
// ---------------------------------------------------------------------------

/// Why a command line was rejected.
///
/// A rejected command never writes to the persistent store, except that
/// [`Storage`](Self::Storage) may follow a partially applied update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Unrecognised literal outside every active mode.
    InvalidCommand,
    /// Submitted key or unlock candidate is not exactly [`KEY_LEN`] bytes.
    WrongKeyLength { got: usize },
    /// Candidate has the right length but does not match the stored key.
    WrongKeyValue,
    /// Hear-mode commit equals a reserved command word.
    ReservedKeyRejected,
    /// Hear-mode commit contains bytes outside printable ASCII.
    UnprintableKey,
    /// Any non-escape command while the device is tampered.
    TamperLockout,
    /// The persistent store reported a failure; nothing was shown.
    Storage(StoreError),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCommand => write!(f, "Invalid or unsupported command."),
            Self::WrongKeyLength { got } => write!(
                f,
                "Incorrect key length ({got}). Key must be {KEY_LEN} characters."
            ),
            Self::WrongKeyValue => write!(
                f,
                "Incorrect key. Unlock failed. Send the correct key to retry."
            ),
            Self::ReservedKeyRejected => write!(
                f,
                "Error: Key cannot be a reserved command (LOCKDEVI, HEARMODE, UNLOCKDE)."
            ),
            Self::UnprintableKey => {
                write!(f, "Error: Key must contain printable ASCII characters only.")
            }
            Self::TamperLockout => write!(
                f,
                "Device tampered! Only CLEAREEP and RESETMOD commands are allowed."
            ),
            Self::Storage(e) => write!(f, "Storage failure: {e}"),
        }
    }
}

impl From<StoreError> for CommandError {
    fn from(e: StoreError) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Persistent store errors
// ---------------------------------------------------------------------------

/// Errors from [`PersistentStore`](crate::app::ports::PersistentStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// Address lies outside the device's byte range.
    OutOfRange(u16),
    /// The backend failed to read or commit.
    Io,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange(addr) => write!(f, "address {addr} out of range"),
            Self::Io => write!(f, "I/O error"),
        }
    }
}

/// Firmware-wide `Result` alias for the command path.
pub type Result<T> = core::result::Result<T, CommandError>;
