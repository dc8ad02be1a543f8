//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`PersistentStore`] and [`ConfigPort`] for the lock.
//!
//! The ESP32-S3 has no byte-addressable EEPROM, so the lock's store is an
//! [`EepromImage`] of [`EEPROM_SIZE`] bytes mirrored to a single NVS blob.
//! Every byte write updates the image and commits the blob, so a write
//! that returns `Ok` survives power loss.
//!
//! - Config validation: all fields are range-checked before persistence.
//! - Namespace isolation: the image and the config use separate keys.
//! - Atomic writes: ESP-IDF NVS commits are atomic per nvs_commit().

use crate::app::ports::{ConfigError, ConfigPort, PersistentStore};
use crate::config::{self, LockConfig};
use crate::error::StoreError;
use crate::keystore::SENTINEL;
use log::info;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::warn;

/// Bytes in the emulated EEPROM.
pub const EEPROM_SIZE: usize = 64;

#[cfg(target_os = "espidf")]
const NAMESPACE: &[u8] = b"tamperlock\0";
#[cfg(target_os = "espidf")]
const IMAGE_KEY: &[u8] = b"eeprom\0";
#[cfg(target_os = "espidf")]
const CONFIG_KEY: &[u8] = b"lockcfg\0";
#[cfg(target_os = "espidf")]
const MAX_CONFIG_BLOB: usize = 64;

// ───────────────────────────────────────────────────────────────
// EepromImage
// ───────────────────────────────────────────────────────────────

/// RAM copy of the emulated EEPROM.  A blank image reads as all
/// [`SENTINEL`], like a freshly erased part.
#[derive(Clone)]
pub struct EepromImage {
    bytes: [u8; EEPROM_SIZE],
    writes: usize,
}

impl EepromImage {
    pub fn new() -> Self {
        Self {
            bytes: [SENTINEL; EEPROM_SIZE],
            writes: 0,
        }
    }

    /// Restore an image from raw bytes (short input is padded with the sentinel).
    pub fn from_bytes(raw: &[u8]) -> Self {
        let mut image = Self::new();
        let len = raw.len().min(EEPROM_SIZE);
        image.bytes[..len].copy_from_slice(&raw[..len]);
        image
    }

    pub fn as_bytes(&self) -> &[u8; EEPROM_SIZE] {
        &self.bytes
    }

    /// Number of successful byte writes since construction.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    fn index(addr: u16) -> Result<usize, StoreError> {
        let idx = addr as usize;
        if idx < EEPROM_SIZE {
            Ok(idx)
        } else {
            Err(StoreError::OutOfRange(addr))
        }
    }
}

impl Default for EepromImage {
    fn default() -> Self {
        Self::new()
    }
}

impl PersistentStore for EepromImage {
    fn read(&self, addr: u16) -> Result<u8, StoreError> {
        Ok(self.bytes[Self::index(addr)?])
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<(), StoreError> {
        let idx = Self::index(addr)?;
        self.bytes[idx] = value;
        self.writes += 1;
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// NvsAdapter
// ───────────────────────────────────────────────────────────────

pub struct NvsAdapter {
    image: EepromImage,
    #[cfg(not(target_os = "espidf"))]
    config_blob: std::cell::RefCell<Option<Vec<u8>>>,
}

impl NvsAdapter {
    /// Create a new NvsAdapter, initialise NVS flash, and load the image.
    ///
    /// On first boot or after a version mismatch the NVS partition is
    /// erased and re-initialised, which leaves a blank (all-sentinel) image.
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any other NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as esp_err_t
                || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as esp_err_t
            {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK as esp_err_t {
                    return Err(ConfigError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK as esp_err_t {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK as esp_err_t {
                return Err(ConfigError::IoError);
            }

            let mut raw = [SENTINEL; EEPROM_SIZE];
            let image = match Self::read_blob(IMAGE_KEY, &mut raw) {
                Ok(len) => {
                    info!("NvsAdapter: EEPROM image loaded ({} bytes)", len);
                    EepromImage::from_bytes(&raw[..len])
                }
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND as esp_err_t => {
                    info!("NvsAdapter: no EEPROM image, starting blank");
                    EepromImage::new()
                }
                Err(e) => {
                    warn!("NvsAdapter: EEPROM image read error {}, starting blank", e);
                    EepromImage::new()
                }
            };
            Ok(Self { image })
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("NvsAdapter: simulation backend");
            Ok(Self::with_image(EepromImage::new()))
        }
    }

    /// Simulation adapter around an existing image (power-cycle tests).
    #[cfg(not(target_os = "espidf"))]
    pub fn with_image(image: EepromImage) -> Self {
        Self {
            image,
            config_blob: std::cell::RefCell::new(None),
        }
    }

    /// Snapshot of the RAM image.
    pub fn image(&self) -> &EepromImage {
        &self.image
    }

    #[cfg(target_os = "espidf")]
    fn flush(&self) -> Result<(), StoreError> {
        Self::write_blob(IMAGE_KEY, self.image.as_bytes()).map_err(|e| {
            warn!("NvsAdapter: image commit failed ({})", e);
            StoreError::Io
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Open the namespace, execute a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, esp_err_t>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, esp_err_t>,
    {
        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        // SAFETY: NAMESPACE is a NUL-terminated static; handle is a valid out-pointer.
        let ret = unsafe { nvs_open(NAMESPACE.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK as esp_err_t {
            return Err(ret);
        }

        let result = f(handle);
        // SAFETY: handle was opened above and is closed exactly once.
        unsafe {
            nvs_close(handle);
        }
        result
    }

    #[cfg(target_os = "espidf")]
    fn read_blob(key: &[u8], buf: &mut [u8]) -> Result<usize, esp_err_t> {
        Self::with_nvs_handle(false, |handle| {
            let mut size = buf.len();
            // SAFETY: key is NUL-terminated; buf/size describe a valid writable buffer.
            let ret = unsafe {
                nvs_get_blob(
                    handle,
                    key.as_ptr() as *const _,
                    buf.as_mut_ptr() as *mut _,
                    &mut size,
                )
            };
            if ret != ESP_OK as esp_err_t {
                return Err(ret);
            }
            Ok(size)
        })
    }

    #[cfg(target_os = "espidf")]
    fn write_blob(key: &[u8], data: &[u8]) -> Result<(), esp_err_t> {
        Self::with_nvs_handle(true, |handle| {
            // SAFETY: key is NUL-terminated; data is a valid readable slice.
            let ret = unsafe {
                nvs_set_blob(
                    handle,
                    key.as_ptr() as *const _,
                    data.as_ptr() as *const _,
                    data.len(),
                )
            };
            if ret != ESP_OK as esp_err_t {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK as esp_err_t {
                return Err(ret);
            }
            Ok(())
        })
    }
}

impl PersistentStore for NvsAdapter {
    fn read(&self, addr: u16) -> Result<u8, StoreError> {
        self.image.read(addr)
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<(), StoreError> {
        let previous = self.image.read(addr)?;
        self.image.write(addr, value)?;
        if let Err(e) = self.flush() {
            // Keep RAM consistent with flash.
            self.image.bytes[addr as usize] = previous;
            return Err(e);
        }
        Ok(())
    }
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<LockConfig, ConfigError> {
        #[cfg(not(target_os = "espidf"))]
        {
            if let Some(bytes) = self.config_blob.borrow().as_ref() {
                let cfg: LockConfig =
                    postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
                info!("NvsAdapter: loaded config from store");
                Ok(cfg)
            } else {
                info!("NvsAdapter: no stored config, using defaults");
                Ok(LockConfig::default())
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let mut buf = [0u8; MAX_CONFIG_BLOB];
            match Self::read_blob(CONFIG_KEY, &mut buf) {
                Ok(len) => {
                    let cfg: LockConfig =
                        postcard::from_bytes(&buf[..len]).map_err(|_| ConfigError::Corrupted)?;
                    info!("NvsAdapter: loaded config from NVS ({} bytes)", len);
                    Ok(cfg)
                }
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND as esp_err_t => {
                    info!("NvsAdapter: no stored config, using defaults");
                    Ok(LockConfig::default())
                }
                Err(e) => {
                    warn!("NvsAdapter: NVS read error {}, using defaults", e);
                    Ok(LockConfig::default())
                }
            }
        }
    }

    fn save(&self, cfg: &LockConfig) -> Result<(), ConfigError> {
        config::validate(cfg)?;
        let bytes = postcard::to_allocvec(cfg).map_err(|_| ConfigError::IoError)?;

        #[cfg(not(target_os = "espidf"))]
        {
            *self.config_blob.borrow_mut() = Some(bytes);
            info!("NvsAdapter: config saved (simulation)");
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            match Self::write_blob(CONFIG_KEY, &bytes) {
                Ok(()) => {
                    info!("NvsAdapter: config saved to NVS ({} bytes)", bytes.len());
                    Ok(())
                }
                Err(e) => {
                    warn!("NvsAdapter: NVS write error {}", e);
                    Err(ConfigError::IoError)
                }
            }
        }
    }
}
