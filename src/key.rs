//! Secret key and command-word primitives.
//!
//! A key is exactly [`KEY_LEN`] printable ASCII bytes held in a fixed
//! array, so the length invariant is carried by the type rather than
//! checked at every use site.

use core::fmt;

/// Length of the secret key and of every 8-byte command literal.
pub const KEY_LEN: usize = 8;

/// Fallback key for first boot, erased storage, and factory reset.
pub const DEFAULT_KEY: SecretKey = SecretKey(*b"12345678");

/// Command words a new key may never equal.
pub const RESERVED_WORDS: [[u8; KEY_LEN]; 3] = [*b"LOCKDEVI", *b"UNLOCKDE", *b"HEARMODE"];

/// Why a byte sequence cannot become a [`SecretKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyError {
    /// Not exactly [`KEY_LEN`] bytes.
    Length(usize),
    /// Contains a byte outside 0x20..=0x7E.
    Unprintable,
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length(n) => write!(f, "key is {n} bytes, expected {KEY_LEN}"),
            Self::Unprintable => write!(f, "key contains non-printable bytes"),
        }
    }
}

/// An 8-byte secret key, stored and compared in plaintext.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SecretKey([u8; KEY_LEN]);

impl SecretKey {
    /// Build a key from raw bytes, checking length and printability.
    pub fn parse(bytes: &[u8]) -> Result<Self, KeyError> {
        let arr: [u8; KEY_LEN] = bytes
            .try_into()
            .map_err(|_| KeyError::Length(bytes.len()))?;
        Self::from_array(arr)
    }

    /// Build a key from an already-sized array.
    pub fn from_array(arr: [u8; KEY_LEN]) -> Result<Self, KeyError> {
        if arr.iter().all(|b| is_printable(*b)) {
            Ok(Self(arr))
        } else {
            Err(KeyError::Unprintable)
        }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// True if this key spells one of the [`RESERVED_WORDS`].
    pub fn is_reserved(&self) -> bool {
        RESERVED_WORDS.iter().any(|w| *w == self.0)
    }

    /// Compare against a candidate line of any length.
    pub fn matches(&self, candidate: &[u8]) -> bool {
        candidate == self.0.as_slice()
    }
}

impl Default for SecretKey {
    fn default() -> Self {
        DEFAULT_KEY
    }
}

// Keys never appear in logs.
impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(********)")
    }
}

pub(crate) fn is_printable(b: u8) -> bool {
    (0x20..=0x7E).contains(&b)
}
