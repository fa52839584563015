// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Picks, per stream, either the native descriptor or a software emulated substitute.
//! Callers only see [`Read`] / [`Write`], so the choice is invisible to them.
//!
//! | Capability                   | Input                              | Output       |
//! | :--------------------------- | :--------------------------------- | :----------- |
//! | not a terminal               | `Native`                           | `Native`     |
//! | terminal, native VT          | `Native`, or `Duplicate` if asked  | `Native`     |
//! | terminal, no native VT       | `Emulated`                         | `Emulated`   |

use crate::{DuplicateInput, InputCloser, OutputTarget, StreamCapability,
            emulation::{AnsiReader, AnsiWriter}};
use std::{fmt,
          io::{self, Read, Stderr, Stdin, Stdout, Write}};

/// The reader a session hands out for standard input.
pub enum EffectiveInput {
    /// Standard input itself.
    Native(Stdin),
    /// An owned duplicate of standard input. Closing it does not close stdin, and an
    /// [`InputCloser`] can release a read blocked on it.
    Duplicate(DuplicateInput),
    /// Key events re-encoded as VT bytes.
    Emulated(AnsiReader),
}

impl EffectiveInput {
    #[must_use]
    pub fn is_emulated(&self) -> bool { matches!(self, EffectiveInput::Emulated(_)) }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            EffectiveInput::Native(_) => "native",
            EffectiveInput::Duplicate(_) => "duplicate",
            EffectiveInput::Emulated(_) => "emulated",
        }
    }

    /// A handle that releases a read blocked on this input from another thread. Only a
    /// duplicate can be released this way.
    #[must_use]
    pub fn closer(&self) -> Option<InputCloser> {
        match self {
            EffectiveInput::Duplicate(input) => Some(input.closer()),
            EffectiveInput::Native(_) | EffectiveInput::Emulated(_) => None,
        }
    }
}

impl fmt::Debug for EffectiveInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EffectiveInput").field(&self.kind()).finish()
    }
}

impl Read for EffectiveInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            EffectiveInput::Native(stdin) => stdin.read(buf),
            EffectiveInput::Duplicate(input) => input.read(buf),
            EffectiveInput::Emulated(reader) => reader.read(buf),
        }
    }
}

/// Unlocked handle to stdout or stderr.
#[derive(Debug)]
pub enum StdStreamWriter {
    Stdout(Stdout),
    Stderr(Stderr),
}

impl StdStreamWriter {
    #[must_use]
    pub fn new(target: OutputTarget) -> Self {
        match target {
            OutputTarget::Stdout => StdStreamWriter::Stdout(io::stdout()),
            OutputTarget::Stderr => StdStreamWriter::Stderr(io::stderr()),
        }
    }
}

impl Write for StdStreamWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            StdStreamWriter::Stdout(it) => it.write(buf),
            StdStreamWriter::Stderr(it) => it.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            StdStreamWriter::Stdout(it) => it.flush(),
            StdStreamWriter::Stderr(it) => it.flush(),
        }
    }
}

/// The writer for stdout or stderr.
#[derive(Debug)]
pub enum EffectiveOutput {
    Native(StdStreamWriter),
    Emulated(AnsiWriter<StdStreamWriter>),
}

impl EffectiveOutput {
    #[must_use]
    pub fn is_emulated(&self) -> bool { matches!(self, EffectiveOutput::Emulated(_)) }
}

impl Write for EffectiveOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            EffectiveOutput::Native(it) => it.write(buf),
            EffectiveOutput::Emulated(it) => it.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            EffectiveOutput::Native(it) => it.flush(),
            EffectiveOutput::Emulated(it) => it.flush(),
        }
    }
}

/// Whether input is duplicated when the caller has no preference. Windows always
/// duplicates, Unix only when asked (see [`SessionOptions`](crate::SessionOptions)).
#[must_use]
pub fn duplicate_input_by_default() -> bool { cfg!(windows) }

/// Chooses the reader for standard input.
///
/// When duplication is asked for but fails, the native stream is used instead and the
/// failure is logged.
#[must_use]
pub fn select_input(capability: StreamCapability, duplicate: bool) -> EffectiveInput {
    if capability.needs_emulation() {
        return EffectiveInput::Emulated(AnsiReader::console());
    }
    if capability.is_terminal && duplicate {
        match DuplicateInput::from_stdin() {
            Ok(input) => return EffectiveInput::Duplicate(input),
            Err(error) => {
                tracing::warn!(message = "Failed to duplicate stdin, using it directly", error = %error);
            }
        }
    }
    EffectiveInput::Native(io::stdin())
}

/// Chooses the writer for stdout or stderr.
#[must_use]
pub fn select_output(target: OutputTarget, capability: StreamCapability) -> EffectiveOutput {
    let writer = StdStreamWriter::new(target);
    if capability.needs_emulation() {
        EffectiveOutput::Emulated(AnsiWriter::new(writer))
    } else {
        EffectiveOutput::Native(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const PIPE: StreamCapability = StreamCapability::NOT_A_TERMINAL;
    const VT: StreamCapability = StreamCapability {
        is_terminal: true,
        native_vt: true,
    };
    const LEGACY: StreamCapability = StreamCapability {
        is_terminal: true,
        native_vt: false,
    };

    #[test_case(PIPE, false, "native" ; "pipe")]
    #[test_case(PIPE, true, "native" ; "pipe is never duplicated")]
    #[test_case(VT, false, "native" ; "vt terminal")]
    #[test_case(LEGACY, false, "emulated" ; "legacy console")]
    #[test_case(LEGACY, true, "emulated" ; "emulation wins over duplication")]
    fn test_select_input(capability: StreamCapability, duplicate: bool, expected: &str) {
        assert_eq!(select_input(capability, duplicate).kind(), expected);
    }

    #[test_case(PIPE, false ; "pipe")]
    #[test_case(VT, false ; "vt terminal")]
    #[test_case(LEGACY, true ; "legacy console")]
    fn test_select_output(capability: StreamCapability, emulated: bool) {
        assert_eq!(
            select_output(OutputTarget::Stdout, capability).is_emulated(),
            emulated
        );
        assert_eq!(
            select_output(OutputTarget::Stderr, capability).is_emulated(),
            emulated
        );
    }

    #[test]
    fn test_only_a_duplicate_has_a_closer() {
        assert!(select_input(PIPE, false).closer().is_none());
        assert!(select_input(LEGACY, true).closer().is_none());
    }

    #[test]
    fn test_duplicate_default_is_platform_specific() {
        assert_eq!(duplicate_input_by_default(), cfg!(windows));
    }
}
