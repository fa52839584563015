// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Windows device using the Console API.
//!
//! Each standard stream maps to its own handle from [`GetStdHandle()`]. A handle that
//! is redirected to a file or pipe fails [`GetConsoleMode()`], which is how a non
//! terminal is detected.
//!
//! [`GetStdHandle()`]: https://learn.microsoft.com/en-us/windows/console/getstdhandle
//! [`GetConsoleMode()`]: https://learn.microsoft.com/en-us/windows/console/getconsolemode

use crate::{StdStream, TerminalDevice, WindowSize,
            mode_transition::{ConsoleMode, console_mode}};
use std::io;
use windows::Win32::{Foundation::HANDLE,
                     System::Console::{CONSOLE_MODE, CONSOLE_SCREEN_BUFFER_INFO,
                                       GetConsoleMode, GetConsoleScreenBufferInfo,
                                       GetStdHandle, STD_ERROR_HANDLE, STD_HANDLE,
                                       STD_INPUT_HANDLE, STD_OUTPUT_HANDLE,
                                       SetConsoleMode}};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NativeTerminal;

fn std_handle_id(stream: StdStream) -> STD_HANDLE {
    match stream {
        StdStream::Input => STD_INPUT_HANDLE,
        StdStream::Output => STD_OUTPUT_HANDLE,
        StdStream::Error => STD_ERROR_HANDLE,
    }
}

fn std_handle(stream: StdStream) -> io::Result<HANDLE> {
    // SAFETY: GetStdHandle only reads the process parameter block.
    let handle = unsafe { GetStdHandle(std_handle_id(stream)) }?;
    Ok(handle)
}

impl TerminalDevice for NativeTerminal {
    type State = ConsoleMode;

    fn is_terminal(&self, stream: StdStream) -> bool { self.get_state(stream).is_ok() }

    fn get_state(&self, stream: StdStream) -> io::Result<ConsoleMode> {
        let handle = std_handle(stream)?;
        let mut mode = CONSOLE_MODE(0);
        // SAFETY: `mode` outlives the call and the handle belongs to this process.
        unsafe { GetConsoleMode(handle, &raw mut mode) }?;
        Ok(ConsoleMode::from_bits_retain(mode.0))
    }

    fn set_state(&self, stream: StdStream, state: &ConsoleMode) -> io::Result<()> {
        let handle = std_handle(stream)?;
        // SAFETY: the handle belongs to this process.
        unsafe { SetConsoleMode(handle, CONSOLE_MODE(state.bits())) }?;
        Ok(())
    }

    fn raw_input(&self, original: &ConsoleMode, vt_input_supported: bool) -> ConsoleMode {
        console_mode::raw_input(*original, vt_input_supported)
    }

    fn raw_output(
        &self,
        original: &ConsoleMode,
        vt_output_supported: bool,
    ) -> Option<ConsoleMode> {
        console_mode::raw_output(*original, vt_output_supported)
    }

    fn echo_disabled(&self, original: &ConsoleMode) -> ConsoleMode {
        console_mode::echo_disabled(*original)
    }

    fn vt_probe_candidate(
        &self,
        stream: StdStream,
        original: &ConsoleMode,
    ) -> Option<ConsoleMode> {
        Some(console_mode::vt_probe_candidate(stream, *original))
    }

    fn vt_output(&self, original: &ConsoleMode) -> Option<ConsoleMode> {
        Some(console_mode::vt_output(*original))
    }

    /// Rows and columns of the visible window, not of the whole scroll back buffer.
    fn window_size(&self, stream: StdStream) -> io::Result<WindowSize> {
        let handle = std_handle(stream)?;
        let mut info = CONSOLE_SCREEN_BUFFER_INFO::default();
        // SAFETY: `info` outlives the call.
        unsafe { GetConsoleScreenBufferInfo(handle, &raw mut info) }?;
        let window = info.srWindow;
        let rows = u16::try_from(window.Bottom - window.Top + 1).unwrap_or(0);
        let cols = u16::try_from(window.Right - window.Left + 1).unwrap_or(0);
        Ok(WindowSize::new(rows, cols))
    }

    fn set_window_size(&self, _stream: StdStream, _size: WindowSize) -> io::Result<()> {
        Err(io::Error::from(io::ErrorKind::Unsupported))
    }
}
