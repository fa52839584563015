// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words IGNBRK BRKINT PARMRK ISTRIP INLCR IGNCR ICRNL IXON OPOST ECHONL ICANON
// cspell:words ISIG IEXTEN CSIZE PARENB VMIN VTIME VINTR VQUIT VERASE VKILL VSUSP cfmakeraw

//! Termios state and the pure transitions over it (Unix/Linux/macOS).
//!
//! Each function clones the captured [`TermiosState`] and returns a derived value. The
//! captured value is never modified, since it is the restoration target.

use rustix::termios::{LocalModes, SpecialCodeIndex, Termios};
use std::fmt;

/// Minimum bytes for a raw read to return.
pub const VMIN_RAW_MODE: u8 = 1;

/// Read timeout in deciseconds. Zero means block until `VMIN` bytes arrive.
pub const VTIME_RAW_MODE: u8 = 0;

/// Special codes that take part in equality. These are the ones raw mode and the
/// line discipline care about.
const COMPARED_SPECIAL_CODES: [SpecialCodeIndex; 10] = [
    SpecialCodeIndex::VINTR,
    SpecialCodeIndex::VQUIT,
    SpecialCodeIndex::VERASE,
    SpecialCodeIndex::VKILL,
    SpecialCodeIndex::VEOF,
    SpecialCodeIndex::VMIN,
    SpecialCodeIndex::VTIME,
    SpecialCodeIndex::VSTART,
    SpecialCodeIndex::VSTOP,
    SpecialCodeIndex::VSUSP,
];

/// A captured termios, the line discipline flags of one terminal device.
#[derive(Clone)]
pub struct TermiosState(pub(crate) Termios);

impl TermiosState {
    #[must_use]
    pub fn termios(&self) -> &Termios { &self.0 }

    #[must_use]
    pub fn is_echo_enabled(&self) -> bool { self.0.local_modes.contains(LocalModes::ECHO) }

    #[must_use]
    pub fn is_canonical(&self) -> bool { self.0.local_modes.contains(LocalModes::ICANON) }
}

impl From<Termios> for TermiosState {
    fn from(termios: Termios) -> Self { Self(termios) }
}

impl PartialEq for TermiosState {
    fn eq(&self, other: &Self) -> bool {
        let (lhs, rhs) = (&self.0, &other.0);
        lhs.input_modes == rhs.input_modes
            && lhs.output_modes == rhs.output_modes
            && lhs.control_modes == rhs.control_modes
            && lhs.local_modes == rhs.local_modes
            && COMPARED_SPECIAL_CODES
                .iter()
                .all(|&index| lhs.special_codes[index] == rhs.special_codes[index])
    }
}

impl fmt::Debug for TermiosState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TermiosState")
            .field("input_modes", &self.0.input_modes)
            .field("output_modes", &self.0.output_modes)
            .field("control_modes", &self.0.control_modes)
            .field("local_modes", &self.0.local_modes)
            .field("vmin", &self.0.special_codes[SpecialCodeIndex::VMIN])
            .field("vtime", &self.0.special_codes[SpecialCodeIndex::VTIME])
            .finish()
    }
}

/// Raw input, `cfmakeraw()` semantics via rustix's [`Termios::make_raw()`]:
/// - No break, parity marking, stripping, CR/NL translation or XON/XOFF on input.
/// - No output post processing.
/// - No echo, canonical mode, signal characters or extended processing.
/// - 8 bit characters, no parity.
/// - `VMIN=1`, `VTIME=0`: a read returns as soon as one byte is available.
#[must_use]
pub fn raw_input(original: &TermiosState) -> TermiosState {
    let mut termios = original.0.clone();
    termios.make_raw();
    termios.special_codes[SpecialCodeIndex::VMIN] = VMIN_RAW_MODE;
    termios.special_codes[SpecialCodeIndex::VTIME] = VTIME_RAW_MODE;
    TermiosState(termios)
}

/// Output needs no separate raw mode on Unix. [`raw_input()`] already clears `OPOST`
/// on the device, and stdout usually shares that device with stdin.
#[must_use]
pub fn raw_output(_original: &TermiosState) -> Option<TermiosState> { None }

/// Echo off. Canonical mode and signal generation are left alone so Ctrl+C still works.
#[must_use]
pub fn echo_disabled(original: &TermiosState) -> TermiosState {
    let mut termios = original.0.clone();
    termios.local_modes.remove(LocalModes::ECHO);
    TermiosState(termios)
}
