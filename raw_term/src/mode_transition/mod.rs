// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Pure mode transitions: each takes a captured state and returns a derived one.
//!
//! | Transition        | Unix (termios)                | Windows (console mode)                       |
//! | :---------------- | :---------------------------- | :------------------------------------------- |
//! | raw input         | `cfmakeraw()`                 | no echo, line, processed, mouse, window      |
//! | raw output        | none (no snapshot is taken)   | `DISABLE_NEWLINE_AUTO_RETURN` (+ VT if able) |
//! | echo disabled     | clear `ECHO`                  | clear echo, keep line and processed input    |
//! | VT probe          | none (VT is native)           | VT input / VT processing bits                |
//!
//! Nothing in here touches a device. [`crate::TerminalDevice`] implementations call
//! these to compute the state they then apply. The two submodules use the same function
//! names, so they are public and only their types are re-exported.

// Attach sources.
pub mod console_mode;
#[cfg(unix)]
pub mod termios_mode;

// Re-export.
pub use console_mode::ConsoleMode;
#[cfg(unix)]
pub use termios_mode::{TermiosState, VMIN_RAW_MODE, VTIME_RAW_MODE};
