// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Free functions over the real standard streams and the process wide
//! [`InterruptGuard`](crate::InterruptGuard). Each one is a thin wrapper around
//! [`Terminal::native()`].
//!
//! Use [`Session`](crate::Session) to manage all three streams at once.

use crate::{EffectiveInput, EffectiveOutput, NativeTerminal, OutputTarget,
            SessionOptions, Snapshot, StdStream, StreamInfo, TermError, Terminal,
            TerminalDevice, WindowSize, capability::NATIVE_ESCAPE_PROCESSING,
            stream_selector::{select_input, select_output}};

/// Captures the current configuration of `stream`.
///
/// # Errors
///
/// [`TermError::NotATerminal`] for a file or pipe, [`TermError::Platform`] when the
/// query fails.
pub fn capture_state(stream: StdStream) -> Result<Snapshot, TermError> {
    Terminal::native().capture_state(stream)
}

/// Puts `snapshot` back on `stream` and disarms the interrupt guard for it.
///
/// # Errors
///
/// [`TermError::Platform`] when the platform rejects the configuration.
pub fn restore_state(stream: StdStream, snapshot: &Snapshot) -> Result<(), TermError> {
    Terminal::native().restore_state(stream, snapshot)
}

/// Captures `stream`, switches it to raw input, and arms the interrupt guard to put
/// the captured configuration back on Ctrl+C. Keep the returned snapshot and hand it
/// to [`restore_state()`].
///
/// # Errors
///
/// [`TermError::NotATerminal`] or [`TermError::Platform`]. Nothing is changed or armed
/// on error.
pub fn set_raw_input_mode(stream: StdStream) -> Result<Snapshot, TermError> {
    Terminal::native().set_raw_input_mode(stream)
}

/// Raw output for stdout or stderr. `None` when the platform keeps no output state
/// (Unix).
///
/// # Errors
///
/// When the stream can't be captured.
pub fn set_raw_output_mode(stream: StdStream) -> Result<Option<Snapshot>, TermError> {
    Terminal::native().set_raw_output_mode(stream)
}

/// Turns echo off, leaving line editing and Ctrl+C alone. Arms the interrupt guard
/// with `snapshot`.
///
/// # Errors
///
/// [`TermError::Platform`] when the platform rejects the change.
pub fn set_echo_disabled(stream: StdStream, snapshot: &Snapshot) -> Result<(), TermError> {
    Terminal::native().set_echo_disabled(stream, snapshot)
}

/// # Errors
///
/// When `stream` is not a terminal or the query fails.
pub fn query_window_size(stream: StdStream) -> Result<WindowSize, TermError> {
    Terminal::native().window_size(stream)
}

/// # Errors
///
/// [`TermError::Unsupported`] on Windows, [`TermError::Platform`] when the platform
/// rejects the size.
pub fn set_window_size(stream: StdStream, size: WindowSize) -> Result<(), TermError> {
    Terminal::native().set_window_size(stream, size)
}

#[must_use]
pub fn is_terminal_device(stream: StdStream) -> bool {
    NativeTerminal.is_terminal(stream)
}

/// Whether every standard stream that is a terminal handles VT sequences natively (and
/// at least one is a terminal). Probed once, then cached until
/// [`reset_native_escape_processing()`].
#[must_use]
pub fn negotiate_native_escape_processing() -> bool {
    NATIVE_ESCAPE_PROCESSING.get_or_probe(|| {
        Terminal::native()
            .probe_all(false)
            .native_escape_processing()
    })
}

/// Forgets the cached answer of [`negotiate_native_escape_processing()`], so the next
/// call probes again. Useful after the process was attached to another console.
pub fn reset_native_escape_processing() { NATIVE_ESCAPE_PROCESSING.reset(); }

/// The effective reader and writers for the three standard streams, without changing
/// any terminal mode.
#[derive(Debug)]
pub struct StdStreams {
    pub input: EffectiveInput,
    pub output: EffectiveOutput,
    pub error: EffectiveOutput,
}

/// Probes each standard stream and picks native or emulated I/O for it. Unlike
/// [`Session`](crate::Session) this does not enter raw mode.
#[must_use]
pub fn std_streams(options: SessionOptions) -> StdStreams {
    let capabilities = Terminal::native().probe_all(options.force_emulation);
    StdStreams {
        input: select_input(capabilities.input, options.effective_duplicate_input()),
        output: select_output(OutputTarget::Stdout, capabilities.output),
        error: select_output(OutputTarget::Stderr, capabilities.error),
    }
}

/// Whether stdin accepts VT input. Non mutating: the console mode is put back.
#[must_use]
pub fn allow_vt_input() -> bool {
    let capability = Terminal::native().probe(StdStream::Input);
    capability.is_terminal && capability.native_vt
}

/// Whether `stream` accepts VT output processing. Non mutating.
#[must_use]
pub fn allow_vt_output(stream: StdStream) -> bool {
    let capability = Terminal::native().probe(stream);
    capability.is_terminal && capability.native_vt
}

/// Switches VT output processing on for good. `true` on success, and always on Unix
/// terminals.
#[must_use]
pub fn enable_vt_output(stream: StdStream) -> bool { Terminal::native().enable_vt_output(stream) }

/// An emulated writer for `target` when its console can't process VT sequences. When
/// it can, VT processing is switched on for good and `None` is returned.
///
/// # Errors
///
/// [`TermError::NotATerminal`] when `target` is redirected to a file or pipe.
pub fn emulated_output(target: OutputTarget) -> Result<Option<EffectiveOutput>, TermError> {
    let terminal = Terminal::native();
    let stream = target.stream();
    let capability = terminal.probe(stream);
    if !capability.is_terminal {
        return Err(TermError::NotATerminal { stream });
    }
    if capability.needs_emulation() {
        return Ok(Some(select_output(target, capability)));
    }
    if !terminal.enable_vt_output(stream) {
        tracing::warn!(message = "Failed to enable VT output", %stream);
    }
    Ok(None)
}

/// Which standard streams are terminals.
#[must_use]
pub fn stream_info() -> [StreamInfo; 3] {
    [StdStream::Input, StdStream::Output, StdStream::Error].map(|stream| StreamInfo {
        stream,
        is_terminal: is_terminal_device(stream),
    })
}
