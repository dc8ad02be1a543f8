//! GPIO / peripheral pin assignments for the lock board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Indicator LEDs (discrete, active HIGH)
// ---------------------------------------------------------------------------

/// Locked.
pub const LED_GREEN_GPIO: i32 = 6;
/// Tampered.
pub const LED_RED_GPIO: i32 = 5;
/// Unlocked.
pub const LED_ORANGE_GPIO: i32 = 9;

// ---------------------------------------------------------------------------
// Light sensor (LDR voltage divider)
// ---------------------------------------------------------------------------

/// LDR divider output, ADC1 channel 1 (GPIO 2 on ESP32-S3).
pub const LDR_ADC_GPIO: i32 = 2;
pub const LDR_ADC1_CHANNEL: u32 = 1;

// ---------------------------------------------------------------------------
// UART console
// ---------------------------------------------------------------------------

pub const UART_PORT: i32 = 0;
pub const UART_TX_GPIO: i32 = 43;
pub const UART_RX_GPIO: i32 = 44;
pub const UART_BAUD: i32 = 115_200;
/// Driver RX ring buffer, bytes.
pub const UART_RX_BUF: i32 = 256;
