// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Unix/Linux/macOS device using rustix's safe termios API.
//!
//! Unlike a "controlling terminal" approach that falls back to `/dev/tty`, every call
//! here targets the descriptor of the requested standard stream. A redirected stream is
//! reported as not a terminal, so callers pass it through untouched.

use crate::{StdStream, TerminalDevice, WindowSize,
            mode_transition::{TermiosState, termios_mode}};
use rustix::{fd::{AsFd, BorrowedFd},
             termios::{self, OptionalActions, Winsize}};
use std::io;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NativeTerminal;

/// Borrows the descriptor of `stream` for the duration of `f`.
fn with_fd<T>(stream: StdStream, f: impl FnOnce(BorrowedFd<'_>) -> T) -> T {
    match stream {
        StdStream::Input => {
            let stdin = io::stdin();
            f(stdin.as_fd())
        }
        StdStream::Output => {
            let stdout = io::stdout();
            f(stdout.as_fd())
        }
        StdStream::Error => {
            let stderr = io::stderr();
            f(stderr.as_fd())
        }
    }
}

/// `tcgetattr()` on any descriptor. Also used by tests against a PTY slave.
///
/// # Errors
///
/// `ENOTTY` when `fd` is not a terminal.
pub fn tcget(fd: impl AsFd) -> io::Result<TermiosState> {
    Ok(TermiosState::from(termios::tcgetattr(fd)?))
}

/// `tcsetattr(TCSANOW)` on any descriptor.
///
/// # Errors
///
/// When the kernel rejects the configuration.
pub fn tcset(fd: impl AsFd, state: &TermiosState) -> io::Result<()> {
    termios::tcsetattr(fd, OptionalActions::Now, state.termios())?;
    Ok(())
}

// Fn items like `termios::isatty` are not general enough for the `with_fd` bound.
#[allow(clippy::redundant_closure)]
impl TerminalDevice for NativeTerminal {
    type State = TermiosState;

    fn is_terminal(&self, stream: StdStream) -> bool {
        with_fd(stream, |fd| termios::isatty(fd))
    }

    fn get_state(&self, stream: StdStream) -> io::Result<TermiosState> {
        with_fd(stream, |fd| tcget(fd))
    }

    fn set_state(&self, stream: StdStream, state: &TermiosState) -> io::Result<()> {
        with_fd(stream, |fd| tcset(fd, state))
    }

    fn raw_input(&self, original: &TermiosState, _vt_input_supported: bool) -> TermiosState {
        termios_mode::raw_input(original)
    }

    fn raw_output(
        &self,
        original: &TermiosState,
        _vt_output_supported: bool,
    ) -> Option<TermiosState> {
        termios_mode::raw_output(original)
    }

    fn echo_disabled(&self, original: &TermiosState) -> TermiosState {
        termios_mode::echo_disabled(original)
    }

    fn vt_probe_candidate(
        &self,
        _stream: StdStream,
        _original: &TermiosState,
    ) -> Option<TermiosState> {
        None
    }

    fn vt_output(&self, _original: &TermiosState) -> Option<TermiosState> { None }

    fn window_size(&self, stream: StdStream) -> io::Result<WindowSize> {
        let winsize = with_fd(stream, |fd| termios::tcgetwinsize(fd))?;
        Ok(WindowSize {
            rows: winsize.ws_row,
            cols: winsize.ws_col,
            x_pixels: winsize.ws_xpixel,
            y_pixels: winsize.ws_ypixel,
        })
    }

    fn set_window_size(&self, stream: StdStream, size: WindowSize) -> io::Result<()> {
        let winsize = Winsize {
            ws_row: size.rows,
            ws_col: size.cols,
            ws_xpixel: size.x_pixels,
            ws_ypixel: size.y_pixels,
        };
        with_fd(stream, |fd| termios::tcsetwinsize(fd, winsize))?;
        Ok(())
    }
}
