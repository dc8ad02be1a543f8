//! Interactive test menu.
//!
//! Opened with `DEBUG_wallence`, the menu lets a bench operator either
//! simulate an IR remote (which only ever sends `LOCKDEVI`) or type one
//! ordinary command.  It is an explicit mode of the service rather than a
//! blocking read loop, so the cycle keeps running while it is open.
//!
//! ```text
//!  Normal ──DEBUG──▶ ChooseInput ──"1"──▶ SimulateIr ──IR_CURRENT_DATA──▶ submit LOCKDEVI
//!                        │                                                  ──▶ Normal
//!                        └────"2"──▶ DirectCommand ──any line──▶ submit line ──▶ Normal
//! ```

use super::commands::{LOCK_WORD, Reply};

/// Line the IR simulation waits for.
pub const IR_TRIGGER: &str = "IR_CURRENT_DATA";
/// Command a simulated IR frame decodes to.
pub const SIMULATED_IR_COMMAND: &str = LOCK_WORD;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuStage {
    ChooseInput,
    SimulateIr,
    DirectCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    InteractiveTest(MenuStage),
}

impl Mode {
    pub fn in_menu(&self) -> bool {
        matches!(self, Mode::InteractiveTest(_))
    }
}

/// What one line does to an open menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuStep<'a> {
    /// Stay at the current stage.
    Stay(Reply),
    /// Move to another stage.
    Goto(MenuStage, Reply),
    /// Leave the menu and process this command line.
    Submit(&'a str),
}

/// Advance an open menu by one (already trimmed) line.
pub fn advance(stage: MenuStage, line: &str) -> MenuStep<'_> {
    match stage {
        MenuStage::ChooseInput => match line {
            "1" => MenuStep::Goto(MenuStage::SimulateIr, Reply::SimulateIrArmed),
            "2" => MenuStep::Goto(MenuStage::DirectCommand, Reply::DirectCommandArmed),
            _ => MenuStep::Stay(Reply::MenuInvalidChoice),
        },
        MenuStage::SimulateIr if line == IR_TRIGGER => MenuStep::Submit(SIMULATED_IR_COMMAND),
        MenuStage::SimulateIr => MenuStep::Stay(Reply::Ignored),
        MenuStage::DirectCommand => MenuStep::Submit(line),
    }
}
