//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to              |
//! |------------|--------------------|--------------------------|
//! | `console`  | LineSource         | UART console             |
//! | `hardware` | IndicatorPort      | ESP32 GPIO (3 LEDs)      |
//! |            | LightSensorPort    | ESP32 ADC1 (LDR)         |
//! | `log_sink` | EventSink          | Serial log output        |
//! | `nvs`      | PersistentStore    | NVS / in-memory image    |
//! |            | ConfigPort         |                          |

pub mod console;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
