//! Tamperlock Firmware — Main Entry Point
//!
//! Hexagonal architecture with a single cooperative loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter        ConsoleAdapter   NvsAdapter            │
//! │  (Indicator+LightSensor)(LineSource)     (Store+Config)        │
//! │  LogEventSink                                                  │
//! │  (EventSink)                                                   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              LockService (pure logic)                  │    │
//! │  │  LockController · TamperMonitor · test menu            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::Result;
use log::{info, warn};

use tamperlock::adapters::console::ConsoleAdapter;
use tamperlock::adapters::hardware::HardwareAdapter;
use tamperlock::adapters::log_sink::LogEventSink;
use tamperlock::adapters::nvs::NvsAdapter;
use tamperlock::app::ports::{ConfigPort, LineSource};
use tamperlock::app::service::LockService;
use tamperlock::config::{self, LockConfig};
use tamperlock::drivers::hw_init;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Tamperlock v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Initialise hardware peripherals ────────────────────
    hw_init::init_peripherals()?;

    // ── 3. Persistent store and config ────────────────────────
    let mut nvs = NvsAdapter::new()?;
    let config = match nvs.load().and_then(|c| config::validate(&c).map(|()| c)) {
        Ok(c) => c,
        Err(e) => {
            warn!("Config unusable ({}), running with defaults", e);
            LockConfig::default()
        }
    };
    info!(
        "Config: threshold={} cycle={}ms echo={}",
        config.tamper_threshold, config.cycle_interval_ms, config.echo_replies
    );

    // ── 4. Construct adapters ─────────────────────────────────
    let mut hw = HardwareAdapter::from_board();
    let mut console = ConsoleAdapter::new();
    let mut log_sink = LogEventSink::new();

    // ── 5. Boot the lock ──────────────────────────────────────
    let mut lock = LockService::boot(&config, &nvs, &mut hw, &mut log_sink);
    console.reply("Device Initialized. Enter 'DEBUG_wallence' to start debug mode.");

    info!("System ready. Entering lock loop.");

    // ── 6. Lock loop ──────────────────────────────────────────
    let period = Duration::from_millis(u64::from(config.cycle_interval_ms));
    loop {
        lock.cycle(&mut hw, &mut nvs, &mut console, &mut log_sink);
        std::thread::sleep(period);
    }
}
