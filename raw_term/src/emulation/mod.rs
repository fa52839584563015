// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Software stand-ins for native VT processing, used on consoles that reject the VT
//! console modes.
//!
//! This is a thin adapter and not a terminal emulator: [`vte`] tokenizes the output
//! byte stream and [`crossterm`] performs each recognized operation (through WinAPI
//! calls on legacy Windows consoles). On input, [`crossterm`] key events are turned
//! back into the bytes a VT terminal would have produced.

// Private modules.
mod ansi_reader;
mod ansi_writer;

// Re-export.
pub use ansi_reader::*;
pub use ansi_writer::*;
