// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words LVB

//! Windows console mode bitmask and the pure transitions over it.
//!
//! This is compiled on every platform. Only the device that reads and writes it
//! ([`GetConsoleMode()`] / [`SetConsoleMode()`]) is Windows specific, so the
//! transitions can be verified anywhere.
//!
//! Input and output handles share one `u32` with overlapping bit values. For example
//! `0x0004` is [`ENABLE_ECHO_INPUT`] on an input handle and
//! [`ENABLE_VIRTUAL_TERMINAL_PROCESSING`] on an output handle.
//!
//! [`GetConsoleMode()`]: https://learn.microsoft.com/en-us/windows/console/getconsolemode
//! [`SetConsoleMode()`]: https://learn.microsoft.com/en-us/windows/console/setconsolemode
//! [`ENABLE_ECHO_INPUT`]: ConsoleMode::ENABLE_ECHO_INPUT
//! [`ENABLE_VIRTUAL_TERMINAL_PROCESSING`]: ConsoleMode::ENABLE_VIRTUAL_TERMINAL_PROCESSING

use crate::StdStream;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ConsoleMode: u32 {
        // Input handle bits.
        const ENABLE_PROCESSED_INPUT = 0x0001;
        const ENABLE_LINE_INPUT = 0x0002;
        const ENABLE_ECHO_INPUT = 0x0004;
        const ENABLE_WINDOW_INPUT = 0x0008;
        const ENABLE_MOUSE_INPUT = 0x0010;
        const ENABLE_INSERT_MODE = 0x0020;
        const ENABLE_QUICK_EDIT_MODE = 0x0040;
        const ENABLE_EXTENDED_FLAGS = 0x0080;
        const ENABLE_AUTO_POSITION = 0x0100;
        const ENABLE_VIRTUAL_TERMINAL_INPUT = 0x0200;

        // Output handle bits.
        const ENABLE_PROCESSED_OUTPUT = 0x0001;
        const ENABLE_WRAP_AT_EOL_OUTPUT = 0x0002;
        const ENABLE_VIRTUAL_TERMINAL_PROCESSING = 0x0004;
        const DISABLE_NEWLINE_AUTO_RETURN = 0x0008;
        const ENABLE_LVB_GRID_WORLDWIDE = 0x0010;
    }
}

/// Raw input: no line buffering, no echo, no Ctrl+C processing, no mouse or window
/// events. Quick edit and insert mode are kept on (they need
/// [`ENABLE_EXTENDED_FLAGS`] to take effect). VT input is only requested when the
/// console accepted it during the capability probe; asking for it otherwise makes
/// [`SetConsoleMode()`] fail and would lose the whole transition.
///
/// [`ENABLE_EXTENDED_FLAGS`]: ConsoleMode::ENABLE_EXTENDED_FLAGS
/// [`SetConsoleMode()`]: https://learn.microsoft.com/en-us/windows/console/setconsolemode
#[must_use]
pub fn raw_input(original: ConsoleMode, vt_input_supported: bool) -> ConsoleMode {
    let mut mode = original;
    mode.remove(
        ConsoleMode::ENABLE_ECHO_INPUT
            | ConsoleMode::ENABLE_LINE_INPUT
            | ConsoleMode::ENABLE_MOUSE_INPUT
            | ConsoleMode::ENABLE_WINDOW_INPUT
            | ConsoleMode::ENABLE_PROCESSED_INPUT,
    );
    mode.insert(
        ConsoleMode::ENABLE_EXTENDED_FLAGS
            | ConsoleMode::ENABLE_INSERT_MODE
            | ConsoleMode::ENABLE_QUICK_EDIT_MODE,
    );
    if vt_input_supported {
        mode.insert(ConsoleMode::ENABLE_VIRTUAL_TERMINAL_INPUT);
    }
    mode
}

/// Raw output: stop the console from turning `\n` into `\r\n` behind the renderer's
/// back, and switch on VT processing when the console supports it.
///
/// Always returns `Some`: on Windows output handles are part of the managed state.
#[must_use]
pub fn raw_output(original: ConsoleMode, vt_output_supported: bool) -> Option<ConsoleMode> {
    let mut mode = original | ConsoleMode::DISABLE_NEWLINE_AUTO_RETURN;
    if vt_output_supported {
        mode.insert(ConsoleMode::ENABLE_VIRTUAL_TERMINAL_PROCESSING);
    }
    Some(mode)
}

/// Password style input: echo off, but lines and Ctrl+C keep working.
#[must_use]
pub fn echo_disabled(original: ConsoleMode) -> ConsoleMode {
    let mut mode = original;
    mode.remove(ConsoleMode::ENABLE_ECHO_INPUT);
    mode.insert(ConsoleMode::ENABLE_PROCESSED_INPUT | ConsoleMode::ENABLE_LINE_INPUT);
    mode
}

/// The experimental mode the capability probe tries (and then reverts).
///
/// Output handles are also asked for [`DISABLE_NEWLINE_AUTO_RETURN`], which older
/// Windows 10 builds reject even when they accept VT processing. Those consoles get the
/// emulator, since raw rendering depends on both.
///
/// [`DISABLE_NEWLINE_AUTO_RETURN`]: ConsoleMode::DISABLE_NEWLINE_AUTO_RETURN
#[must_use]
pub fn vt_probe_candidate(stream: StdStream, original: ConsoleMode) -> ConsoleMode {
    match stream {
        StdStream::Input => original | ConsoleMode::ENABLE_VIRTUAL_TERMINAL_INPUT,
        StdStream::Output | StdStream::Error => {
            original
                | ConsoleMode::ENABLE_VIRTUAL_TERMINAL_PROCESSING
                | ConsoleMode::DISABLE_NEWLINE_AUTO_RETURN
        }
    }
}

/// Persistently enabled VT processing for an output handle.
#[must_use]
pub fn vt_output(original: ConsoleMode) -> ConsoleMode {
    original | ConsoleMode::ENABLE_VIRTUAL_TERMINAL_PROCESSING
}
