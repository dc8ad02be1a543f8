//! Fuzz target: `ConsoleAdapter::feed`
//!
//! Drives arbitrary byte sequences into the line assembler and asserts
//! that every yielded line fits the buffer and carries no terminators.
//!
//! cargo fuzz run fuzz_console_bytes

#![no_main]

use libfuzzer_sys::fuzz_target;
use tamperlock::adapters::console::{ConsoleAdapter, LINE_CAP, QUEUE_CAP};
use tamperlock::app::ports::LineSource;

fuzz_target!(|data: &[u8]| {
    let mut console = ConsoleAdapter::new();
    console.feed(data);

    let mut yielded = 0;
    while let Some(line) = console.poll_line() {
        yielded += 1;
        assert!(line.len() <= LINE_CAP, "line exceeds LINE_CAP");
        assert!(!line.contains('\n') && !line.contains('\r'));
    }
    assert!(yielded <= QUEUE_CAP, "queue yielded more than its capacity");
});
