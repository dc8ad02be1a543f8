//! Persistent layout and key codec.
//!
//! ```text
//!  addr  0        : state byte  (0 = Unlocked, 1 = Locked, 2 = Tampered)
//!  addr  1 ..  9  : unused
//!  addr 10 .. 17  : secret key, 8 raw bytes, no terminator
//! ```
//!
//! A byte equal to [`SENTINEL`] means "erased / never written".  A key
//! region containing any sentinel or non-printable byte decodes to
//! `None`, and the caller falls back to the default key.  Recovery after
//! power loss depends on this layout; never move these addresses.

use crate::app::ports::PersistentStore;
use crate::error::StoreError;
use crate::fsm::DeviceState;
use crate::key::{KEY_LEN, SecretKey};

/// Address of the single state byte.
pub const STATE_ADDR: u16 = 0;
/// First of the eight key bytes.
pub const KEY_START_ADDR: u16 = 10;
/// Erased-byte marker (all bits set, the EEPROM erase value).
pub const SENTINEL: u8 = 0xFF;

/// Read and decode the state byte.
pub fn load_state(store: &impl PersistentStore) -> Result<DeviceState, StoreError> {
    store.read(STATE_ADDR).map(DeviceState::from_byte)
}

pub fn save_state(store: &mut impl PersistentStore, state: DeviceState) -> Result<(), StoreError> {
    store.write(STATE_ADDR, state.as_byte())
}

/// Read the key region.  `Ok(None)` when erased, partially erased, or
/// otherwise not a valid key.
pub fn load_key(store: &impl PersistentStore) -> Result<Option<SecretKey>, StoreError> {
    let mut raw = [0u8; KEY_LEN];
    for (addr, slot) in key_addrs().zip(raw.iter_mut()) {
        *slot = store.read(addr)?;
    }
    Ok(decode_key(raw))
}

/// Write `key` into the key region.
///
/// The first key byte is set to [`SENTINEL`] before the others are
/// written and gets its real value last.  An update cut short anywhere in
/// between therefore decodes as absent, never as a mix of old and new key.
pub fn save_key(store: &mut impl PersistentStore, key: &SecretKey) -> Result<(), StoreError> {
    let bytes = key.as_bytes();
    if store.read(KEY_START_ADDR)? != SENTINEL {
        store.write(KEY_START_ADDR, SENTINEL)?;
    }
    for (addr, byte) in key_addrs().zip(bytes).skip(1) {
        store.write(addr, *byte)?;
    }
    store.write(KEY_START_ADDR, bytes[0])
}

/// Write the sentinel over all key bytes and the state byte.
pub fn erase(store: &mut impl PersistentStore) -> Result<(), StoreError> {
    for addr in key_addrs() {
        store.write(addr, SENTINEL)?;
    }
    store.write(STATE_ADDR, SENTINEL)
}

/// Decode a raw key window.
///
/// Sentinel bytes are never stitched into a shorter key: one erased byte
/// invalidates the whole window.
pub fn decode_key(raw: [u8; KEY_LEN]) -> Option<SecretKey> {
    if raw.contains(&SENTINEL) {
        return None;
    }
    SecretKey::from_array(raw).ok()
}

fn key_addrs() -> impl Iterator<Item = u16> {
    KEY_START_ADDR..KEY_START_ADDR + KEY_LEN as u16
}
