//! Function-pointer lock state machine.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  StateTable                                  │
//! │  ┌──────────┬───────────┬──────────┐         │
//! │  │ State    │ on_enter  │ on_exit  │         │
//! │  ├──────────┼───────────┼──────────┤         │
//! │  │ Unlocked │ fn(ctx)   │ -        │         │
//! │  │ Locked   │ fn(ctx)   │ fn(ctx)  │         │
//! │  │ Tampered │ fn(ctx)   │ fn(ctx)  │         │
//! │  └──────────┴───────────┴──────────┘         │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Transitions are driven by commands and by the tamper monitor rather
//! than by a tick.  Every transition that changes [`DeviceState`] runs, in
//! order:
//!
//! 1. `on_exit(current)` → set state → `on_enter(next)` (in memory)
//! 2. write the state byte to the [`PersistentStore`]
//! 3. drive the [`IndicatorPort`]
//!
//! If step 2 fails the in-memory context is rolled back and step 3 never
//! runs, so the persisted and displayed states cannot disagree.

pub mod context;
pub mod states;

use context::DeviceContext;
use log::{info, warn};

use crate::app::ports::{IndicatorPort, PersistentStore};
use crate::drivers::indicator::Indicator;
use crate::error::{CommandError, Result, StoreError};
use crate::key::{DEFAULT_KEY, KEY_LEN, KeyError, SecretKey};
use crate::keystore;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// The three user-visible device states, with their persisted byte codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DeviceState {
    Unlocked = 0,
    Locked = 1,
    Tampered = 2,
}

impl DeviceState {
    /// Total number of states — used to size the table array.
    pub const COUNT: usize = 3;

    /// Decode a persisted byte.  Anything outside the three codes
    /// (including the erased sentinel) means "no valid saved state".
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            1 => Self::Locked,
            2 => Self::Tampered,
            _ => Self::Unlocked,
        }
    }

    /// Byte written to the state address.
    pub const fn as_byte(self) -> u8 {
        self as u8
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn = fn(&mut DeviceContext);

/// Static descriptor for a single lock state.
pub struct StateDescriptor {
    pub id: DeviceState,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
}

// ---------------------------------------------------------------------------
// LockController
// ---------------------------------------------------------------------------

/// Owns the [`DeviceContext`] and applies every state change to it.
///
/// Methods that may be redundant return `Ok(false)` when nothing changed,
/// leaving the caller to report it; none of them write on that path.
pub struct LockController {
    table: [StateDescriptor; DeviceState::COUNT],
    ctx: DeviceContext,
}

impl LockController {
    /// Construct around an existing context (no I/O).
    pub fn new(ctx: DeviceContext) -> Self {
        Self {
            table: states::build_state_table(),
            ctx,
        }
    }

    /// Load state and key from the store.
    ///
    /// Read failures fall back to the defaults rather than failing boot.
    pub fn load(store: &impl PersistentStore) -> Self {
        Self::new(Self::read_persisted(store))
    }

    fn read_persisted(store: &impl PersistentStore) -> DeviceContext {
        let state = keystore::load_state(store).unwrap_or_else(|e| {
            warn!("LockController: state byte unreadable ({e}), assuming Unlocked");
            DeviceState::Unlocked
        });
        let key = match keystore::load_key(store) {
            Ok(Some(key)) => key,
            Ok(None) => {
                info!("LockController: no stored key, using default");
                DEFAULT_KEY
            }
            Err(e) => {
                warn!("LockController: key unreadable ({e}), using default");
                DEFAULT_KEY
            }
        };
        DeviceContext::new(state, key)
    }

    /// Show the loaded state on the indicator.  Call once after [`load`](Self::load).
    pub fn start(&self, indicator: &mut impl IndicatorPort) {
        info!("Lock starting in state: {}", self.name(self.ctx.state));
        indicator.show(Indicator::for_state(self.ctx.state));
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> DeviceState {
        self.ctx.state
    }

    pub fn context(&self) -> &DeviceContext {
        &self.ctx
    }

    pub fn hear_mode(&self) -> bool {
        self.ctx.flags.hear_mode
    }

    pub fn waiting_for_key(&self) -> bool {
        self.ctx.flags.waiting_for_key
    }

    pub fn tamper_latched(&self) -> bool {
        self.ctx.flags.tamper_latched
    }

    // ── Lock / unlock ─────────────────────────────────────────

    /// `Unlocked → Locked`.  `Ok(false)` if already locked.
    pub fn lock(
        &mut self,
        store: &mut impl PersistentStore,
        indicator: &mut impl IndicatorPort,
    ) -> Result<bool> {
        match self.ctx.state {
            DeviceState::Locked => Ok(false),
            DeviceState::Tampered => Err(CommandError::TamperLockout),
            DeviceState::Unlocked => {
                if self.ctx.flags.hear_mode {
                    return Err(CommandError::InvalidCommand);
                }
                self.transition(DeviceState::Locked, store, indicator)?;
                Ok(true)
            }
        }
    }

    /// Arm `waiting_for_key`.  `Ok(false)` if already unlocked.
    pub fn request_unlock(&mut self) -> Result<bool> {
        match self.ctx.state {
            DeviceState::Unlocked => Ok(false),
            DeviceState::Tampered => Err(CommandError::TamperLockout),
            DeviceState::Locked => {
                if self.ctx.flags.hear_mode {
                    return Err(CommandError::InvalidCommand);
                }
                self.ctx.flags.waiting_for_key = true;
                info!("Unlock mode armed, waiting for key");
                Ok(true)
            }
        }
    }

    /// Check an unlock candidate while `waiting_for_key`.
    ///
    /// Mismatches leave the flag set so the caller can resubmit.
    pub fn submit_unlock_key(
        &mut self,
        candidate: &[u8],
        store: &mut impl PersistentStore,
        indicator: &mut impl IndicatorPort,
    ) -> Result<()> {
        if !self.ctx.flags.waiting_for_key {
            return Err(CommandError::InvalidCommand);
        }
        if candidate.len() != KEY_LEN {
            return Err(CommandError::WrongKeyLength {
                got: candidate.len(),
            });
        }
        if !self.ctx.key.matches(candidate) {
            warn!("Unlock attempt with wrong key");
            return Err(CommandError::WrongKeyValue);
        }
        self.transition(DeviceState::Unlocked, store, indicator)
    }

    // ── Hear mode ─────────────────────────────────────────────

    /// Enter hear mode.  Only while not locked and no unlock is pending.
    pub fn activate_hear_mode(&mut self) -> Result<()> {
        if self.ctx.state != DeviceState::Unlocked || self.ctx.flags.waiting_for_key {
            return Err(CommandError::InvalidCommand);
        }
        self.ctx.flags.hear_mode = true;
        info!("Hear mode activated");
        Ok(())
    }

    /// Commit a hear-mode candidate as the new key.
    ///
    /// Any rejection leaves hear mode active and the stored key untouched.
    pub fn commit_key(&mut self, candidate: &[u8], store: &mut impl PersistentStore) -> Result<()> {
        if !self.ctx.flags.hear_mode {
            return Err(CommandError::InvalidCommand);
        }
        let key = SecretKey::parse(candidate).map_err(|e| match e {
            KeyError::Length(got) => CommandError::WrongKeyLength { got },
            KeyError::Unprintable => CommandError::UnprintableKey,
        })?;
        if key.is_reserved() {
            return Err(CommandError::ReservedKeyRejected);
        }
        if let Err(e) = keystore::save_key(store, &key) {
            // Part of the update may have landed; keep RAM on what a reboot would load.
            self.ctx.key = Self::read_persisted(&*store).key;
            warn!("Key update failed: {e}");
            return Err(e.into());
        }
        self.ctx.key = key;
        self.ctx.flags.hear_mode = false;
        info!("Key updated, hear mode closed");
        Ok(())
    }

    // ── Tamper ────────────────────────────────────────────────

    /// `Locked → Tampered`, once per latch.  `Ok(false)` when not applicable.
    pub fn on_tamper(
        &mut self,
        store: &mut impl PersistentStore,
        indicator: &mut impl IndicatorPort,
    ) -> Result<bool> {
        if self.ctx.state != DeviceState::Locked || self.ctx.flags.tamper_latched {
            return Ok(false);
        }
        self.transition(DeviceState::Tampered, store, indicator)?;
        Ok(true)
    }

    // ── Tamper escapes ────────────────────────────────────────

    /// Write the sentinel over the key and state regions.
    ///
    /// The in-memory context then matches what a reboot would load:
    /// Unlocked with the default key.
    pub fn erase_store(
        &mut self,
        store: &mut impl PersistentStore,
        indicator: &mut impl IndicatorPort,
    ) -> Result<()> {
        self.apply_reset(store, indicator, |s| keystore::erase(s))
    }

    /// Erase, re-write the default key, and persist Unlocked.
    pub fn factory_reset(
        &mut self,
        store: &mut impl PersistentStore,
        indicator: &mut impl IndicatorPort,
    ) -> Result<()> {
        self.apply_reset(store, indicator, |s| {
            keystore::erase(s)?;
            keystore::save_key(s, &DEFAULT_KEY)?;
            keystore::save_state(s, DeviceState::Unlocked)
        })
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn name(&self, state: DeviceState) -> &'static str {
        self.table[state as usize].name
    }

    fn enter(&mut self, next: DeviceState) {
        if let Some(exit) = self.table[self.ctx.state as usize].on_exit {
            exit(&mut self.ctx);
        }
        self.ctx.state = next;
        if let Some(enter) = self.table[next as usize].on_enter {
            enter(&mut self.ctx);
        }
    }

    fn transition(
        &mut self,
        next: DeviceState,
        store: &mut impl PersistentStore,
        indicator: &mut impl IndicatorPort,
    ) -> Result<()> {
        let snapshot = self.ctx;
        info!("Lock transition: {} -> {}", self.name(snapshot.state), self.name(next));

        self.enter(next);
        if let Err(e) = keystore::save_state(store, next) {
            warn!("Lock transition aborted, state write failed: {e}");
            self.ctx = snapshot;
            return Err(e.into());
        }
        indicator.show(Indicator::for_state(next));
        Ok(())
    }

    /// Adopt whatever an interrupted multi-byte write left in the store.
    ///
    /// If nothing changed the snapshot (with its mode flags) comes back;
    /// otherwise the context is rebuilt as a reboot would load it and the
    /// indicator follows.
    fn resync(
        &mut self,
        snapshot: DeviceContext,
        store: &impl PersistentStore,
        indicator: &mut impl IndicatorPort,
    ) {
        let persisted = Self::read_persisted(store);
        if persisted.state == snapshot.state && persisted.key == snapshot.key {
            self.ctx = snapshot;
            return;
        }
        warn!(
            "Store partially updated, continuing as {}",
            self.name(persisted.state)
        );
        self.ctx = persisted;
        indicator.show(Indicator::for_state(persisted.state));
    }

    fn apply_reset<S, F>(
        &mut self,
        store: &mut S,
        indicator: &mut impl IndicatorPort,
        persist: F,
    ) -> Result<()>
    where
        S: PersistentStore,
        F: FnOnce(&mut S) -> core::result::Result<(), StoreError>,
    {
        let snapshot = self.ctx;
        if snapshot.state != DeviceState::Unlocked {
            self.enter(DeviceState::Unlocked);
        } else {
            // Re-run the enter action so stale flags are cleared either way.
            if let Some(enter) = self.table[DeviceState::Unlocked as usize].on_enter {
                enter(&mut self.ctx);
            }
        }
        self.ctx.flags.hear_mode = false;
        self.ctx.key = DEFAULT_KEY;

        if let Err(e) = persist(store) {
            warn!("Store reset failed: {e}");
            self.resync(snapshot, &*store, indicator);
            return Err(e.into());
        }
        indicator.show(Indicator::for_state(DeviceState::Unlocked));
        Ok(())
    }
}
