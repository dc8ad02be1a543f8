//! Inbound command words and outbound console replies.
//!
//! Lines arrive from the console (or the interactive test menu) and are
//! classified by exact, case-sensitive match after trimming surrounding
//! whitespace.  Anything that is not a keyword is [`Command::Text`] and
//! is interpreted by whichever capture mode is pending.

use core::fmt;

use crate::drivers::indicator::Indicator;
use crate::fsm::DeviceState;

pub const LOCK_WORD: &str = "LOCKDEVI";
pub const UNLOCK_WORD: &str = "UNLOCKDE";
pub const HEAR_MODE_WORD: &str = "HEARMODE";
pub const LED_STATUS_WORD: &str = "LEDSTATUS";
pub const CLEAR_STORE_WORD: &str = "CLEAREEP";
pub const RESET_WORD: &str = "RESETMOD";
pub const DEBUG_WORD: &str = "DEBUG_wallence";

/// A classified command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Lock,
    Unlock,
    HearMode,
    LedStatus,
    ClearStore,
    FactoryReset,
    /// Opens the interactive test menu.
    Debug,
    /// Not a keyword: a key candidate or garbage.
    Text(&'a str),
}

impl<'a> Command<'a> {
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        match line {
            LOCK_WORD => Command::Lock,
            UNLOCK_WORD => Command::Unlock,
            HEAR_MODE_WORD => Command::HearMode,
            LED_STATUS_WORD => Command::LedStatus,
            CLEAR_STORE_WORD => Command::ClearStore,
            RESET_WORD => Command::FactoryReset,
            DEBUG_WORD => Command::Debug,
            other => Command::Text(other),
        }
    }
}

/// Successful outcome of one processed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Locked,
    UnlockArmed,
    Unlocked,
    /// Redundant lock or unlock; nothing was written.
    AlreadyInState(DeviceState),
    HearModeActive,
    KeyUpdated,
    LedStatus(Indicator),
    StoreErased,
    FactoryReset,
    MenuOpened,
    MenuInvalidChoice,
    SimulateIrArmed,
    DirectCommandArmed,
    /// Line consumed without effect; nothing is echoed.
    Ignored,
}

impl Reply {
    pub fn is_silent(&self) -> bool {
        matches!(self, Reply::Ignored)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Locked => write!(f, "Device locked."),
            Reply::UnlockArmed => {
                write!(f, "Unlock mode activated. Send the 8-character unlock key.")
            }
            Reply::Unlocked => write!(f, "Device unlocked."),
            Reply::AlreadyInState(state) => {
                let word = match state {
                    DeviceState::Unlocked => "unlocked",
                    DeviceState::Locked => "locked",
                    DeviceState::Tampered => "tampered",
                };
                write!(f, "Device is already {word}.")
            }
            Reply::HearModeActive => write!(f, "Hear mode activated. Send an 8-character key."),
            Reply::KeyUpdated => write!(f, "Key updated successfully."),
            Reply::LedStatus(active) => {
                writeln!(f, "LED Status:")?;
                for (i, led) in Indicator::ALL.iter().enumerate() {
                    let on = if led == active { "ON" } else { "OFF" };
                    write!(f, "{} LED: {}", led.label(), on)?;
                    if i + 1 < Indicator::ALL.len() {
                        writeln!(f)?;
                    }
                }
                Ok(())
            }
            Reply::StoreErased => write!(f, "Key and state storage cleared."),
            Reply::FactoryReset => write!(f, "Device reset to default state."),
            Reply::MenuOpened => write!(
                f,
                "Debug Mode Activated.\nSelect Input Method:\n\
                 1: Simulate IR Input (Enter IR_CURRENT_DATA)\n\
                 2: Direct Command Input (Enter command such as LOCKDEVI, UNLOCKDE, etc.)"
            ),
            Reply::MenuInvalidChoice => write!(f, "Invalid choice. Please enter '1' or '2'."),
            Reply::SimulateIrArmed => write!(
                f,
                "IR Input Simulation Activated.\nEnter IR_CURRENT_DATA command to simulate IR input."
            ),
            Reply::DirectCommandArmed => write!(
                f,
                "Direct Command Input Activated.\nEnter a command (e.g., LOCKDEVI, UNLOCKDE, etc.):"
            ),
            Reply::Ignored => Ok(()),
        }
    }
}
