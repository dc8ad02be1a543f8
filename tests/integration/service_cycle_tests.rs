//! The cooperative cycle: tamper polling, line intake, console replies.

use crate::mock_hw::{Rig, ScriptedConsole};

use tamperlock::app::events::LockEvent;
use tamperlock::drivers::indicator::Indicator;
use tamperlock::fsm::DeviceState;

#[test]
fn cycle_processes_one_line_per_call() {
    let mut rig = Rig::new();
    let mut console = ScriptedConsole::new(&["LOCKDEVI", "UNLOCKDE"]);

    rig.cycle(&mut console);
    assert_eq!(rig.svc.state(), DeviceState::Locked);
    assert_eq!(console.replies, vec!["Device locked."]);
    assert!(!console.is_drained());

    rig.cycle(&mut console);
    assert!(rig.svc.controller().waiting_for_key());
    assert!(console.is_drained());
}

#[test]
fn errors_are_echoed_to_console() {
    let mut rig = Rig::new();
    let mut console = ScriptedConsole::new(&["NOPE"]);
    rig.cycle(&mut console);
    assert_eq!(console.replies, vec!["Invalid or unsupported command."]);
}

#[test]
fn tamper_not_polled_while_unlocked() {
    let mut rig = Rig::new();
    rig.hw.light_level = 0;
    let mut console = ScriptedConsole::new(&[]);
    rig.cycle(&mut console);
    assert_eq!(rig.hw.light_reads, 0);
    assert_eq!(rig.svc.state(), DeviceState::Unlocked);
}

#[test]
fn sustained_darkness_tampers_exactly_once() {
    let mut rig = Rig::new();
    rig.lock();
    rig.hw.light_level = 10;
    let mut console = ScriptedConsole::new(&[]);

    for _ in 0..5 {
        rig.cycle(&mut console);
    }
    assert_eq!(rig.svc.state(), DeviceState::Tampered);
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, LockEvent::TamperDetected { .. })),
        1
    );
    assert_eq!(rig.hw.light_reads, 1);
    assert_eq!(console.replies, vec!["Tampering detected!"]);
    assert_eq!(rig.hw.lit(), Some(Indicator::Red));
}

#[test]
fn bright_reading_keeps_lock() {
    let mut rig = Rig::new();
    rig.lock();
    rig.hw.light_level = 800;
    let mut console = ScriptedConsole::new(&[]);
    rig.cycle(&mut console);
    assert_eq!(rig.svc.state(), DeviceState::Locked);
    assert_eq!(rig.hw.light_reads, 1);
}

#[test]
fn open_menu_suspends_tamper_polling() {
    let mut rig = Rig::new();
    rig.lock();
    let mut console = ScriptedConsole::new(&["DEBUG_wallence"]);
    rig.cycle(&mut console);
    assert_eq!(rig.hw.light_reads, 1);
    rig.hw.light_level = 0;
    let reads = rig.hw.light_reads;

    rig.cycle(&mut console);
    rig.cycle(&mut console);
    assert_eq!(rig.hw.light_reads, reads);
    assert_eq!(rig.svc.state(), DeviceState::Locked);
}

#[test]
fn tamper_then_lines_are_locked_out() {
    let mut rig = Rig::new();
    rig.lock();
    rig.hw.light_level = 0;
    let mut console = ScriptedConsole::new(&["UNLOCKDE"]);
    rig.cycle(&mut console);
    assert_eq!(rig.svc.state(), DeviceState::Tampered);
    assert_eq!(console.replies.len(), 2);
    assert!(console.replies[1].contains("tampered"));
}
