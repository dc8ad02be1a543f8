//! UART console adapter.
//!
//! Implements [`LineSource`] by assembling raw console bytes into lines.
//! `\n` ends a line and `\r` is dropped, so both LF and CRLF terminals
//! work.  Lines longer than [`LINE_CAP`] bytes are discarded whole rather
//! than split, which would otherwise turn one long line into a spurious
//! 8-byte key candidate.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drains the UART driver's RX buffer without blocking.
//! On host/test: bytes are injected with [`ConsoleAdapter::feed`] and
//! replies are kept for inspection.

use heapless::{Deque, String, Vec};
use log::warn;

use crate::app::ports::LineSource;
use crate::drivers::hw_init;

/// Longest accepted line, excluding the terminator.
pub const LINE_CAP: usize = 64;
/// Completed lines held until the service polls them.
pub const QUEUE_CAP: usize = 4;

pub struct ConsoleAdapter {
    partial: Vec<u8, LINE_CAP>,
    overflowed: bool,
    ready: Deque<String<LINE_CAP>, QUEUE_CAP>,
    dropped: u32,
    #[cfg(not(target_os = "espidf"))]
    sent: std::vec::Vec<std::string::String>,
}

impl ConsoleAdapter {
    pub fn new() -> Self {
        Self {
            partial: Vec::new(),
            overflowed: false,
            ready: Deque::new(),
            dropped: 0,
            #[cfg(not(target_os = "espidf"))]
            sent: std::vec::Vec::new(),
        }
    }

    /// Push raw received bytes through the line assembler.
    pub fn feed(&mut self, bytes: &[u8]) {
        for &b in bytes {
            match b {
                b'\r' => {}
                b'\n' => self.finish_line(),
                _ if self.overflowed => {}
                _ => {
                    if self.partial.push(b).is_err() {
                        self.overflowed = true;
                        self.partial.clear();
                    }
                }
            }
        }
    }

    /// Lines lost to overflow, bad UTF-8, or a full queue.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Replies written so far (simulation only).
    #[cfg(not(target_os = "espidf"))]
    pub fn sent(&self) -> &[std::string::String] {
        &self.sent
    }

    fn finish_line(&mut self) {
        if self.overflowed {
            self.overflowed = false;
            self.dropped += 1;
            warn!("Console: line longer than {LINE_CAP} bytes discarded");
            return;
        }
        let raw = core::mem::take(&mut self.partial);
        let line = match String::from_utf8(raw) {
            Ok(line) => line,
            Err(_) => {
                self.dropped += 1;
                warn!("Console: non-UTF-8 line discarded");
                return;
            }
        };
        if self.ready.push_back(line).is_err() {
            self.dropped += 1;
            warn!("Console: line queue full, line discarded");
        }
    }

    #[cfg(target_os = "espidf")]
    fn pump(&mut self) {
        let mut chunk = [0u8; 32];
        loop {
            let n = hw_init::uart_read(&mut chunk);
            if n == 0 {
                break;
            }
            self.feed(&chunk[..n]);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn pump(&mut self) {
        let mut chunk = [0u8; 32];
        let n = hw_init::uart_read(&mut chunk);
        self.feed(&chunk[..n]);
    }
}

impl Default for ConsoleAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl LineSource for ConsoleAdapter {
    fn poll_line(&mut self) -> Option<String<LINE_CAP>> {
        self.pump();
        self.ready.pop_front()
    }

    fn reply(&mut self, text: &str) {
        hw_init::uart_write(text.as_bytes());
        hw_init::uart_write(b"\r\n");
        #[cfg(not(target_os = "espidf"))]
        self.sent.push(text.into());
    }
}
