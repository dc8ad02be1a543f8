//! Lock service — the hexagonal core.
//!
//! [`LockService`] owns the lock controller, the tamper monitor, and the
//! interactive-menu mode.  All I/O flows through port traits injected at
//! call sites, making the entire service testable with mock adapters.
//!
//! ```text
//!  LineSource ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!  LightSensor ─▶ │        LockService        │
//!                 │ Controller · Tamper · Menu│ ──▶ IndicatorPort
//! PersistentStore◀┴──────────────────────────┘
//! ```
//!
//! Command priority, highest first:
//!
//! 1. Tampered: only `CLEAREEP` / `RESETMOD`, everything else is refused.
//! 2. Hear mode: the line is a key candidate, keywords are not recognised.
//! 3. Keywords.
//! 4. Waiting for key: the line is an unlock candidate.
//! 5. Anything else is invalid.

use log::{info, warn};

use crate::config::LockConfig;
use crate::drivers::indicator::Indicator;
use crate::error::{CommandError, Result};
use crate::fsm::{DeviceState, LockController};
use crate::tamper::TamperMonitor;

use super::commands::{Command, Reply};
use super::debug::{self, MenuStage, MenuStep, Mode};
use super::events::LockEvent;
use super::ports::{EventSink, IndicatorPort, LightSensorPort, LineSource, PersistentStore};

// ───────────────────────────────────────────────────────────────
// LockService
// ───────────────────────────────────────────────────────────────

pub struct LockService {
    controller: LockController,
    monitor: TamperMonitor,
    mode: Mode,
    echo_replies: bool,
}

impl LockService {
    /// Load persisted state and key, show the indicator, emit `Started`.
    ///
    /// Boot never writes to the store.
    pub fn boot(
        config: &LockConfig,
        store: &impl PersistentStore,
        indicator: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) -> Self {
        let controller = LockController::load(store);
        controller.start(indicator);
        let state = controller.state();
        sink.emit(&LockEvent::Started(state));
        info!(
            "LockService started in {:?} (tamper threshold {})",
            state, config.tamper_threshold
        );
        Self {
            controller,
            monitor: TamperMonitor::new(config.tamper_threshold),
            mode: Mode::Normal,
            echo_replies: config.echo_replies,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> DeviceState {
        self.controller.state()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn controller(&self) -> &LockController {
        &self.controller
    }

    pub fn monitor(&self) -> &TamperMonitor {
        &self.monitor
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one cooperative cycle: tamper poll, then at most one line.
    ///
    /// The `hw` parameter satisfies **both** [`LightSensorPort`] and
    /// [`IndicatorPort`], which avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn cycle(
        &mut self,
        hw: &mut (impl LightSensorPort + IndicatorPort),
        store: &mut impl PersistentStore,
        console: &mut impl LineSource,
        sink: &mut impl EventSink,
    ) {
        match self.poll_tamper(hw, store, sink) {
            Ok(true) if self.echo_replies => console.reply("Tampering detected!"),
            Ok(_) => {}
            Err(e) => warn!("Tamper transition not applied: {e}"),
        }

        let Some(line) = console.poll_line() else {
            return;
        };
        let outcome = self.handle_line(&line, store, hw, sink);
        if !self.echo_replies {
            return;
        }
        match outcome {
            Ok(reply) if reply.is_silent() => {}
            Ok(reply) => console.reply(&reply.to_string()),
            Err(e) => console.reply(&e.to_string()),
        }
    }

    /// Sample the light sensor if the tamper monitor is armed.
    ///
    /// Armed means Locked, not yet latched, and no menu open.  Returns
    /// `Ok(true)` on the one cycle that moves the device to Tampered.
    pub fn poll_tamper(
        &mut self,
        hw: &mut (impl LightSensorPort + IndicatorPort),
        store: &mut impl PersistentStore,
        sink: &mut impl EventSink,
    ) -> Result<bool> {
        if self.mode.in_menu()
            || self.controller.state() != DeviceState::Locked
            || self.controller.tamper_latched()
        {
            return Ok(false);
        }
        let Some(level) = self.monitor.poll(hw) else {
            return Ok(false);
        };
        if !self.controller.on_tamper(store, hw)? {
            return Ok(false);
        }
        sink.emit(&LockEvent::TamperDetected { level });
        sink.emit(&LockEvent::StateChanged {
            from: DeviceState::Locked,
            to: DeviceState::Tampered,
        });
        Ok(true)
    }

    // ── Line handling ─────────────────────────────────────────

    /// Route one raw console line through the menu or the processor.
    pub fn handle_line(
        &mut self,
        line: &str,
        store: &mut impl PersistentStore,
        indicator: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) -> Result<Reply> {
        let line = line.trim();
        match self.mode {
            Mode::Normal => {
                if Command::parse(line) == Command::Debug {
                    self.mode = Mode::InteractiveTest(MenuStage::ChooseInput);
                    info!("Interactive test menu opened");
                    return Ok(Reply::MenuOpened);
                }
                self.process_command(line, store, indicator, sink)
            }
            Mode::InteractiveTest(stage) => match debug::advance(stage, line) {
                MenuStep::Stay(reply) => Ok(reply),
                MenuStep::Goto(next, reply) => {
                    self.mode = Mode::InteractiveTest(next);
                    Ok(reply)
                }
                MenuStep::Submit(command) => {
                    self.mode = Mode::Normal;
                    info!("Interactive test menu submitting '{command}'");
                    self.process_command(command, store, indicator, sink)
                }
            },
        }
    }

    /// Apply one command line to the lock, bypassing the menu.
    ///
    /// Rejections are logged and emitted as
    /// [`LockEvent::CommandRejected`]; none of them write to the store.
    pub fn process_command(
        &mut self,
        line: &str,
        store: &mut impl PersistentStore,
        indicator: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) -> Result<Reply> {
        let before = self.controller.state();
        let result = self.dispatch(line.trim(), store, indicator, sink);

        let after = self.controller.state();
        if after != before {
            sink.emit(&LockEvent::StateChanged {
                from: before,
                to: after,
            });
        }
        if let Err(e) = result {
            warn!("Command rejected: {e}");
            sink.emit(&LockEvent::CommandRejected(e));
        }
        result
    }

    fn dispatch(
        &mut self,
        line: &str,
        store: &mut impl PersistentStore,
        indicator: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) -> Result<Reply> {
        let command = Command::parse(line);

        if self.controller.state() == DeviceState::Tampered {
            return match command {
                Command::ClearStore => self.erase(store, indicator, sink),
                Command::FactoryReset => self.reset(store, indicator, sink),
                _ => Err(CommandError::TamperLockout),
            };
        }

        if self.controller.hear_mode() {
            self.controller.commit_key(line.as_bytes(), store)?;
            sink.emit(&LockEvent::KeyUpdated);
            return Ok(Reply::KeyUpdated);
        }

        match command {
            Command::Lock => Ok(if self.controller.lock(store, indicator)? {
                Reply::Locked
            } else {
                Reply::AlreadyInState(DeviceState::Locked)
            }),
            Command::Unlock => Ok(if self.controller.request_unlock()? {
                Reply::UnlockArmed
            } else {
                Reply::AlreadyInState(DeviceState::Unlocked)
            }),
            Command::LedStatus => {
                let active = indicator
                    .active()
                    .unwrap_or_else(|| Indicator::for_state(self.controller.state()));
                Ok(Reply::LedStatus(active))
            }
            Command::HearMode => {
                self.controller.activate_hear_mode()?;
                Ok(Reply::HearModeActive)
            }
            Command::ClearStore => self.erase(store, indicator, sink),
            Command::FactoryReset => self.reset(store, indicator, sink),
            Command::Debug | Command::Text(_) if self.controller.waiting_for_key() => {
                self.controller
                    .submit_unlock_key(line.as_bytes(), store, indicator)?;
                Ok(Reply::Unlocked)
            }
            Command::Debug | Command::Text(_) => Err(CommandError::InvalidCommand),
        }
    }

    fn erase(
        &mut self,
        store: &mut impl PersistentStore,
        indicator: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) -> Result<Reply> {
        self.controller.erase_store(store, indicator)?;
        sink.emit(&LockEvent::StoreErased);
        Ok(Reply::StoreErased)
    }

    fn reset(
        &mut self,
        store: &mut impl PersistentStore,
        indicator: &mut impl IndicatorPort,
        sink: &mut impl EventSink,
    ) -> Result<Reply> {
        self.controller.factory_reset(store, indicator)?;
        sink.emit(&LockEvent::FactoryReset);
        Ok(Reply::FactoryReset)
    }
}
