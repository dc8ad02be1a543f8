//! Power-cycle behaviour: what survives in the store and what boot makes of it.

use crate::mock_hw::{MockStore, Rig};

use tamperlock::app::events::LockEvent;
use tamperlock::drivers::indicator::Indicator;
use tamperlock::error::CommandError;
use tamperlock::fsm::DeviceState;
use tamperlock::key::DEFAULT_KEY;
use tamperlock::keystore::{self, KEY_START_ADDR, SENTINEL, STATE_ADDR};

#[test]
fn boot_loads_each_valid_state_byte() {
    for (byte, state, lit) in [
        (0u8, DeviceState::Unlocked, Indicator::Orange),
        (1, DeviceState::Locked, Indicator::Green),
        (2, DeviceState::Tampered, Indicator::Red),
    ] {
        let mut store = MockStore::new();
        store.poke(STATE_ADDR, byte);
        let rig = Rig::boot(store);
        assert_eq!(rig.svc.state(), state);
        assert_eq!(rig.hw.lit(), Some(lit));
        assert_eq!(rig.sink.events, vec![LockEvent::Started(state)]);
    }
}

#[test]
fn boot_coerces_garbage_state_to_unlocked() {
    for byte in [3u8, 0x7F, SENTINEL] {
        let mut store = MockStore::new();
        store.poke(STATE_ADDR, byte);
        assert_eq!(Rig::boot(store).svc.state(), DeviceState::Unlocked);
    }
}

#[test]
fn boot_never_writes() {
    let mut store = MockStore::new();
    store.poke(STATE_ADDR, 2);
    let rig = Rig::boot(store);
    assert!(rig.store.writes.is_empty());
}

#[test]
fn tampered_boot_stays_latched() {
    let mut store = MockStore::new();
    store.poke(STATE_ADDR, 2);
    let mut rig = Rig::boot(store);
    assert!(rig.svc.controller().tamper_latched());
    assert_eq!(rig.send("LOCKDEVI"), Err(CommandError::TamperLockout));
}

#[test]
fn committed_key_survives_reboot() {
    let mut rig = Rig::new();
    rig.send("HEARMODE").unwrap();
    rig.send("Q7#pz!k2").unwrap();
    rig.lock();

    let mut rebooted = rig.reboot();
    assert_eq!(rebooted.svc.state(), DeviceState::Locked);
    rebooted.send("UNLOCKDE").unwrap();
    assert_eq!(rebooted.send("12345678"), Err(CommandError::WrongKeyValue));
    assert_eq!(rebooted.svc.state(), DeviceState::Locked);
    rebooted.send("Q7#pz!k2").unwrap();
    assert_eq!(rebooted.svc.state(), DeviceState::Unlocked);
}

#[test]
fn erase_then_reboot_yields_defaults() {
    let mut rig = Rig::new();
    rig.send("HEARMODE").unwrap();
    rig.send("abcdefgh").unwrap();
    rig.lock();
    rig.hw.light_level = 0;
    rig.svc
        .poll_tamper(&mut rig.hw, &mut rig.store, &mut rig.sink)
        .unwrap();
    rig.send("CLEAREEP").unwrap();

    assert_eq!(rig.store.byte(STATE_ADDR), SENTINEL);
    for offset in 0..8 {
        assert_eq!(rig.store.byte(KEY_START_ADDR + offset), SENTINEL);
    }

    let rebooted = rig.reboot();
    assert_eq!(rebooted.svc.state(), DeviceState::Unlocked);
    assert_eq!(rebooted.svc.controller().context().key, DEFAULT_KEY);
    assert!(!rebooted.svc.controller().tamper_latched());
}

#[test]
fn factory_reset_persists_default_key_and_unlocked() {
    let mut rig = Rig::new();
    rig.send("RESETMOD").unwrap();
    assert_eq!(rig.store.byte(STATE_ADDR), 0);
    assert_eq!(keystore::load_key(&rig.store), Ok(Some(DEFAULT_KEY)));
}

#[test]
fn partially_erased_key_falls_back_to_default() {
    let mut store = MockStore::new();
    for (i, b) in b"abcdefgh".iter().enumerate() {
        store.poke(KEY_START_ADDR + i as u16, *b);
    }
    store.poke(KEY_START_ADDR + 5, SENTINEL);
    store.poke(STATE_ADDR, 1);

    let mut rig = Rig::boot(store);
    assert_eq!(rig.svc.controller().context().key, DEFAULT_KEY);
    rig.send("UNLOCKDE").unwrap();
    assert!(rig.send("12345678").is_ok());
}

#[test]
fn failed_state_write_rolls_back() {
    let mut rig = Rig::new();
    rig.lock();
    rig.send("UNLOCKDE").unwrap();
    rig.store.fail_after = Some(rig.store.writes.len());

    assert!(matches!(rig.send("12345678"), Err(CommandError::Storage(_))));
    assert_eq!(rig.svc.state(), DeviceState::Locked);
    assert!(rig.svc.controller().waiting_for_key());
    assert_eq!(rig.hw.lit(), Some(Indicator::Green));

    rig.store.fail_after = None;
    assert!(rig.send("12345678").is_ok());
}

#[test]
fn failed_key_write_keeps_old_key() {
    let mut rig = Rig::new();
    rig.send("HEARMODE").unwrap();
    rig.store.fail_after = Some(rig.store.writes.len());
    assert!(matches!(rig.send("abcdefgh"), Err(CommandError::Storage(_))));
    assert_eq!(rig.svc.controller().context().key, DEFAULT_KEY);
    assert!(rig.svc.controller().hear_mode());
}

#[test]
fn interrupted_reset_leaves_live_state_equal_to_reboot() {
    // erase (9) + default key into an erased window (8) + state byte (1)
    for allowed in 0..18 {
        let mut rig = Rig::new();
        rig.tamper();
        rig.store.fail_after = Some(rig.store.writes.len() + allowed);

        assert!(
            matches!(rig.send("RESETMOD"), Err(CommandError::Storage(_))),
            "allowed {allowed}"
        );
        let live = rig.svc.state();
        let rebooted = rig.reboot();
        assert_eq!(rebooted.svc.state(), live, "allowed {allowed}");
        assert_eq!(
            rebooted.svc.controller().context().key,
            rig.svc.controller().context().key,
            "allowed {allowed}"
        );
        assert_eq!(rig.hw.lit(), Some(Indicator::for_state(live)));
        assert_eq!(rig.svc.controller().tamper_latched(), live == DeviceState::Tampered);
    }
}

#[test]
fn reset_cut_after_erase_unlocks_in_ram_too() {
    let mut rig = Rig::new();
    rig.tamper();
    rig.store.fail_after = Some(rig.store.writes.len() + 9);

    assert!(matches!(rig.send("RESETMOD"), Err(CommandError::Storage(_))));
    assert_eq!(rig.store.byte(STATE_ADDR), SENTINEL);
    assert_eq!(rig.svc.state(), DeviceState::Unlocked);
    assert_eq!(rig.hw.lit(), Some(Indicator::Orange));
    assert!(rig.sink.events.contains(&LockEvent::StateChanged {
        from: DeviceState::Tampered,
        to: DeviceState::Unlocked,
    }));
}

#[test]
fn reset_failing_on_first_write_keeps_tampered() {
    let mut rig = Rig::new();
    rig.tamper();
    rig.store.fail_after = Some(rig.store.writes.len());

    assert!(matches!(rig.send("CLEAREEP"), Err(CommandError::Storage(_))));
    assert_eq!(rig.svc.state(), DeviceState::Tampered);
    assert!(rig.svc.controller().tamper_latched());
    assert_eq!(rig.hw.lit(), Some(Indicator::Red));
}

#[test]
fn interrupted_key_update_never_leaves_a_mixed_key() {
    let mut rig = Rig::new();
    rig.send("HEARMODE").unwrap();
    rig.send("abcdefgh").unwrap();
    rig.send("HEARMODE").unwrap();
    rig.store.fail_after = Some(rig.store.writes.len() + 3);

    assert!(matches!(rig.send("Zx9!Qw2#"), Err(CommandError::Storage(_))));
    assert_eq!(keystore::load_key(&rig.store), Ok(None));
    assert_eq!(rig.svc.controller().context().key, DEFAULT_KEY);
    assert!(rig.svc.controller().hear_mode());

    let mut rebooted = rig.reboot();
    assert_eq!(rebooted.svc.controller().context().key, DEFAULT_KEY);
    rebooted.lock();
    rebooted.send("UNLOCKDE").unwrap();
    assert!(rebooted.send("12345678").is_ok());
}
