//! Mock adapters for integration tests.
//!
//! Records every store write, indicator change, console reply, and event
//! so tests can assert on the full history without real hardware.

use std::collections::VecDeque;

use tamperlock::app::events::LockEvent;
use tamperlock::app::ports::{EventSink, IndicatorPort, LightSensorPort, LineSource, PersistentStore};
use tamperlock::drivers::indicator::Indicator;
use tamperlock::error::StoreError;

pub const STORE_SIZE: usize = 64;

// ── MockStore ─────────────────────────────────────────────────

/// Byte store that logs writes and can be told to fail.
#[derive(Clone)]
pub struct MockStore {
    bytes: [u8; STORE_SIZE],
    pub writes: Vec<(u16, u8)>,
    /// Fail every write once this many have succeeded.
    pub fail_after: Option<usize>,
}

#[allow(dead_code)]
impl MockStore {
    pub fn new() -> Self {
        Self {
            bytes: [0xFF; STORE_SIZE],
            writes: Vec::new(),
            fail_after: None,
        }
    }

    /// The store as seen after a power cycle: same bytes, fresh log.
    pub fn power_cycle(&self) -> Self {
        Self {
            bytes: self.bytes,
            writes: Vec::new(),
            fail_after: None,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_after: Some(0),
            ..Self::new()
        }
    }

    pub fn byte(&self, addr: u16) -> u8 {
        self.bytes[addr as usize]
    }

    pub fn poke(&mut self, addr: u16, value: u8) {
        self.bytes[addr as usize] = value;
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PersistentStore for MockStore {
    fn read(&self, addr: u16) -> Result<u8, StoreError> {
        self.bytes
            .get(addr as usize)
            .copied()
            .ok_or(StoreError::OutOfRange(addr))
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<(), StoreError> {
        if self.fail_after.is_some_and(|n| self.writes.len() >= n) {
            return Err(StoreError::Io);
        }
        let slot = self
            .bytes
            .get_mut(addr as usize)
            .ok_or(StoreError::OutOfRange(addr))?;
        *slot = value;
        self.writes.push((addr, value));
        Ok(())
    }
}

// ── MockHardware ──────────────────────────────────────────────

/// Indicator + light sensor.  `shows` records every indicator command.
pub struct MockHardware {
    pub shows: Vec<Indicator>,
    pub light_level: u16,
    pub light_reads: usize,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            shows: Vec::new(),
            light_level: 1023,
            light_reads: 0,
        }
    }

    pub fn lit(&self) -> Option<Indicator> {
        self.shows.last().copied()
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatorPort for MockHardware {
    fn show(&mut self, output: Indicator) {
        self.shows.push(output);
    }

    fn active(&self) -> Option<Indicator> {
        self.lit()
    }
}

impl LightSensorPort for MockHardware {
    fn read_level(&mut self) -> u16 {
        self.light_reads += 1;
        self.light_level
    }
}

// ── ScriptedConsole ───────────────────────────────────────────

pub struct ScriptedConsole {
    pending: VecDeque<String>,
    pub replies: Vec<String>,
}

#[allow(dead_code)]
impl ScriptedConsole {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            pending: lines.iter().map(|l| l.to_string()).collect(),
            replies: Vec::new(),
        }
    }

    pub fn push(&mut self, line: &str) {
        self.pending.push_back(line.to_string());
    }

    pub fn is_drained(&self) -> bool {
        self.pending.is_empty()
    }
}

impl LineSource for ScriptedConsole {
    fn poll_line(&mut self) -> Option<heapless::String<64>> {
        let line = self.pending.pop_front()?;
        let mut out = heapless::String::new();
        out.push_str(&line).ok()?;
        Some(out)
    }

    fn reply(&mut self, text: &str) {
        self.replies.push(text.to_string());
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<LockEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&LockEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &LockEvent) {
        self.events.push(*event);
    }
}

// ── Rig ───────────────────────────────────────────────────────

use tamperlock::app::commands::Reply;
use tamperlock::app::service::LockService;
use tamperlock::config::LockConfig;
use tamperlock::error::Result as CommandResult;

/// A booted service wired to fresh mocks.
pub struct Rig {
    pub svc: LockService,
    pub store: MockStore,
    pub hw: MockHardware,
    pub sink: RecordingSink,
}

#[allow(dead_code)]
impl Rig {
    pub fn new() -> Self {
        Self::boot(MockStore::new())
    }

    pub fn boot(store: MockStore) -> Self {
        let mut hw = MockHardware::new();
        let mut sink = RecordingSink::new();
        let svc = LockService::boot(&LockConfig::default(), &store, &mut hw, &mut sink);
        Self {
            svc,
            store,
            hw,
            sink,
        }
    }

    /// Simulate a power cycle: same persisted bytes, fresh RAM and mocks.
    pub fn reboot(&self) -> Self {
        Self::boot(self.store.power_cycle())
    }

    pub fn send(&mut self, line: &str) -> CommandResult<Reply> {
        self.svc
            .handle_line(line, &mut self.store, &mut self.hw, &mut self.sink)
    }

    pub fn cycle(&mut self, console: &mut ScriptedConsole) {
        self.svc
            .cycle(&mut self.hw, &mut self.store, console, &mut self.sink);
    }

    pub fn lock(&mut self) {
        assert_eq!(self.send("LOCKDEVI"), Ok(Reply::Locked));
    }

    /// Lock, then cover the sensor for one poll so the device tampers.
    pub fn tamper(&mut self) {
        self.lock();
        self.hw.light_level = 0;
        let tripped = self
            .svc
            .poll_tamper(&mut self.hw, &mut self.store, &mut self.sink);
        self.hw.light_level = 1023;
        assert_eq!(tripped, Ok(true));
    }
}

impl Default for Rig {
    fn default() -> Self {
        Self::new()
    }
}
