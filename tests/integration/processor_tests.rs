//! Command processor behaviour through the full service stack.

use crate::mock_hw::{MockStore, Rig};

use tamperlock::app::commands::Reply;
use tamperlock::app::events::LockEvent;
use tamperlock::drivers::indicator::Indicator;
use tamperlock::error::CommandError;
use tamperlock::fsm::DeviceState;
use tamperlock::keystore;

#[test]
fn lock_then_unlock_with_default_key() {
    let mut rig = Rig::new();
    rig.lock();
    assert_eq!(rig.hw.lit(), Some(Indicator::Green));

    assert_eq!(rig.send("UNLOCKDE"), Ok(Reply::UnlockArmed));
    assert_eq!(rig.send("12345678"), Ok(Reply::Unlocked));
    assert_eq!(rig.svc.state(), DeviceState::Unlocked);
    assert_eq!(rig.hw.lit(), Some(Indicator::Orange));
}

#[test]
fn redundant_lock_reports_already_locked_without_writes() {
    let mut rig = Rig::new();
    rig.lock();
    let writes = rig.store.writes.len();
    assert_eq!(
        rig.send("LOCKDEVI"),
        Ok(Reply::AlreadyInState(DeviceState::Locked))
    );
    assert_eq!(rig.store.writes.len(), writes);
}

#[test]
fn redundant_unlock_reports_already_unlocked() {
    let mut rig = Rig::new();
    assert_eq!(
        rig.send("UNLOCKDE"),
        Ok(Reply::AlreadyInState(DeviceState::Unlocked))
    );
    assert!(!rig.svc.controller().waiting_for_key());
}

#[test]
fn wrong_key_keeps_waiting_and_state() {
    let mut rig = Rig::new();
    rig.lock();
    rig.send("UNLOCKDE").unwrap();

    assert_eq!(rig.send("87654321"), Err(CommandError::WrongKeyValue));
    assert_eq!(rig.send("short"), Err(CommandError::WrongKeyLength { got: 5 }));
    assert_eq!(rig.svc.state(), DeviceState::Locked);
    assert!(rig.svc.controller().waiting_for_key());

    assert_eq!(rig.send("12345678"), Ok(Reply::Unlocked));
}

#[test]
fn keyword_outranks_pending_unlock() {
    let mut rig = Rig::new();
    rig.lock();
    rig.send("UNLOCKDE").unwrap();
    assert_eq!(rig.send("LEDSTATUS"), Ok(Reply::LedStatus(Indicator::Green)));
    assert!(rig.svc.controller().waiting_for_key());
}

#[test]
fn hear_mode_commits_new_key() {
    let mut rig = Rig::new();
    assert_eq!(rig.send("HEARMODE"), Ok(Reply::HearModeActive));
    assert_eq!(rig.send("abcdefgh"), Ok(Reply::KeyUpdated));
    assert!(!rig.svc.controller().hear_mode());
    assert_eq!(rig.sink.count(|e| *e == LockEvent::KeyUpdated), 1);

    rig.lock();
    rig.send("UNLOCKDE").unwrap();
    assert_eq!(rig.send("12345678"), Err(CommandError::WrongKeyValue));
    assert_eq!(rig.send("abcdefgh"), Ok(Reply::Unlocked));
}

#[test]
fn hear_mode_rejects_reserved_word_and_keeps_key() {
    let mut rig = Rig::new();
    rig.send("HEARMODE").unwrap();
    let writes = rig.store.writes.len();

    for word in ["LOCKDEVI", "UNLOCKDE", "HEARMODE"] {
        assert_eq!(rig.send(word), Err(CommandError::ReservedKeyRejected));
    }
    assert!(rig.svc.controller().hear_mode());
    assert_eq!(rig.svc.state(), DeviceState::Unlocked);
    assert_eq!(rig.store.writes.len(), writes);
    assert_eq!(keystore::load_key(&rig.store), Ok(None));
}

#[test]
fn hear_mode_rejects_wrong_length() {
    let mut rig = Rig::new();
    rig.send("HEARMODE").unwrap();
    assert_eq!(
        rig.send("toolongkey"),
        Err(CommandError::WrongKeyLength { got: 10 })
    );
    assert!(rig.svc.controller().hear_mode());
}

#[test]
fn hear_mode_refused_while_locked() {
    let mut rig = Rig::new();
    rig.lock();
    assert_eq!(rig.send("HEARMODE"), Err(CommandError::InvalidCommand));
    assert!(!rig.svc.controller().hear_mode());
}

#[test]
fn tampered_device_accepts_only_escape_commands() {
    let mut rig = Rig::new();
    rig.lock();
    rig.hw.light_level = 100;
    assert_eq!(
        rig.svc.poll_tamper(&mut rig.hw, &mut rig.store, &mut rig.sink),
        Ok(true)
    );

    for line in ["LOCKDEVI", "UNLOCKDE", "HEARMODE", "LEDSTATUS", "12345678"] {
        assert_eq!(rig.send(line), Err(CommandError::TamperLockout));
    }
    assert_eq!(rig.svc.state(), DeviceState::Tampered);
    assert_eq!(rig.hw.lit(), Some(Indicator::Red));

    assert_eq!(rig.send("CLEAREEP"), Ok(Reply::StoreErased));
    assert_eq!(rig.svc.state(), DeviceState::Unlocked);
    assert_eq!(rig.hw.lit(), Some(Indicator::Orange));
}

#[test]
fn unknown_line_is_invalid() {
    let mut rig = Rig::new();
    assert_eq!(rig.send("OPENSESAME"), Err(CommandError::InvalidCommand));
    assert_eq!(rig.send(""), Err(CommandError::InvalidCommand));
    assert_eq!(
        rig.sink
            .count(|e| *e == LockEvent::CommandRejected(CommandError::InvalidCommand)),
        2
    );
}

#[test]
fn factory_reset_restores_default_key() {
    let mut rig = Rig::new();
    rig.send("HEARMODE").unwrap();
    rig.send("zzzzzzzz").unwrap();
    assert_eq!(rig.send("RESETMOD"), Ok(Reply::FactoryReset));

    rig.lock();
    rig.send("UNLOCKDE").unwrap();
    assert_eq!(rig.send("12345678"), Ok(Reply::Unlocked));
}

#[test]
fn indicator_is_only_driven_after_successful_writes() {
    let mut rig = Rig::boot(MockStore::failing());
    let shows = rig.hw.shows.len();
    assert!(matches!(rig.send("LOCKDEVI"), Err(CommandError::Storage(_))));
    assert_eq!(rig.svc.state(), DeviceState::Unlocked);
    assert_eq!(rig.hw.shows.len(), shows);
}
