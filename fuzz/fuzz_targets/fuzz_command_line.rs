//! Fuzz target: `LockService::handle_line`
//!
//! Splits arbitrary input on newlines and feeds each piece to the service
//! as a command line.  Asserts that nothing panics, that rejected lines
//! never write, and that the persisted state always reloads to the live one.
//!
//! cargo fuzz run fuzz_command_line

#![no_main]

use libfuzzer_sys::fuzz_target;
use tamperlock::adapters::nvs::EepromImage;
use tamperlock::app::events::LockEvent;
use tamperlock::app::ports::{EventSink, IndicatorPort};
use tamperlock::app::service::LockService;
use tamperlock::config::LockConfig;
use tamperlock::drivers::indicator::Indicator;
use tamperlock::fsm::LockController;

struct Led(Option<Indicator>);

impl IndicatorPort for Led {
    fn show(&mut self, output: Indicator) {
        self.0 = Some(output);
    }
    fn active(&self) -> Option<Indicator> {
        self.0
    }
}

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &LockEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };

    let mut store = EepromImage::new();
    let mut led = Led(None);
    let mut sink = Discard;
    let mut svc = LockService::boot(&LockConfig::default(), &store, &mut led, &mut sink);

    for line in text.split('\n') {
        let writes = store.write_count();
        if svc.handle_line(line, &mut store, &mut led, &mut sink).is_err() {
            assert_eq!(store.write_count(), writes, "rejected line wrote to store");
        }
        assert_eq!(led.0, Some(Indicator::for_state(svc.state())));
    }

    assert_eq!(LockController::load(&store).state(), svc.state());
});
