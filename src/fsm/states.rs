//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers — no closures, no dynamic
//! dispatch, no heap.  Handlers only touch the mode flags; persisting the
//! state byte and driving the indicator belong to the engine.
//!
//! ```text
//!  UNLOCKED ──[LOCKDEVI]──▶ LOCKED ──[light < threshold]──▶ TAMPERED
//!     ▲                        │                               │
//!     └───[UNLOCKDE + key]─────┘                               │
//!     └──────────────────[CLEAREEP / RESETMOD]─────────────────┘
//! ```

use super::context::DeviceContext;
use super::{DeviceState, StateDescriptor};
use log::{info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; DeviceState::COUNT] {
    [
        // Index 0 — Unlocked
        StateDescriptor {
            id: DeviceState::Unlocked,
            name: "Unlocked",
            on_enter: Some(unlocked_enter),
            on_exit: None,
        },
        // Index 1 — Locked
        StateDescriptor {
            id: DeviceState::Locked,
            name: "Locked",
            on_enter: Some(locked_enter),
            on_exit: Some(locked_exit),
        },
        // Index 2 — Tampered
        StateDescriptor {
            id: DeviceState::Tampered,
            name: "Tampered",
            on_enter: Some(tampered_enter),
            on_exit: Some(tampered_exit),
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  UNLOCKED state
// ═══════════════════════════════════════════════════════════════════════════

fn unlocked_enter(ctx: &mut DeviceContext) {
    ctx.flags.waiting_for_key = false;
    ctx.flags.tamper_latched = false;
    info!("UNLOCKED: orange indicator, commands open");
}

// ═══════════════════════════════════════════════════════════════════════════
//  LOCKED state — tamper monitor armed
// ═══════════════════════════════════════════════════════════════════════════

fn locked_enter(ctx: &mut DeviceContext) {
    ctx.flags.tamper_latched = false;
    ctx.flags.hear_mode = false;
    info!("LOCKED: green indicator, tamper monitor armed");
}

fn locked_exit(ctx: &mut DeviceContext) {
    ctx.flags.waiting_for_key = false;
}

// ═══════════════════════════════════════════════════════════════════════════
//  TAMPERED state — lockout until erase or reset
// ═══════════════════════════════════════════════════════════════════════════

fn tampered_enter(ctx: &mut DeviceContext) {
    ctx.flags.tamper_latched = true;
    ctx.flags.waiting_for_key = false;
    ctx.flags.hear_mode = false;
    warn!("TAMPERED: red indicator, only CLEAREEP / RESETMOD accepted");
}

fn tampered_exit(_ctx: &mut DeviceContext) {
    info!("TAMPERED: lockout cleared");
}
