// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Per stream capability detection: is it a terminal, and does the terminal process
//! VT escape sequences natively.
//!
//! The VT probe is the only place that mutates a device outside of an explicit
//! transition. It tries the candidate configuration, notes whether the platform accepted
//! it, and then always puts the captured configuration back. Callers observe no change,
//! and probing twice gives the same answer.

use crate::{StdStream, TerminalDevice};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamCapability {
    pub is_terminal: bool,
    /// Only meaningful when [`is_terminal`](Self::is_terminal) is `true`.
    pub native_vt: bool,
}

impl StreamCapability {
    pub const NOT_A_TERMINAL: Self = Self {
        is_terminal: false,
        native_vt: false,
    };

    /// A terminal without native VT processing gets the software emulator.
    #[must_use]
    pub fn needs_emulation(self) -> bool { self.is_terminal && !self.native_vt }

    /// The same capability with native VT processing masked off.
    #[must_use]
    pub fn without_native_vt(self) -> Self {
        Self {
            native_vt: false,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamCapabilities {
    pub input: StreamCapability,
    pub output: StreamCapability,
    pub error: StreamCapability,
}

impl StreamCapabilities {
    #[must_use]
    pub fn get(&self, stream: StdStream) -> StreamCapability {
        match stream {
            StdStream::Input => self.input,
            StdStream::Output => self.output,
            StdStream::Error => self.error,
        }
    }

    /// `true` when at least one stream is a terminal, and every stream that is a
    /// terminal handles VT sequences natively.
    #[must_use]
    pub fn native_escape_processing(&self) -> bool {
        let all = [self.input, self.output, self.error];
        let terminals = all.iter().filter(|it| it.is_terminal);
        let mut any_terminal = false;
        for capability in terminals {
            any_terminal = true;
            if !capability.native_vt {
                return false;
            }
        }
        any_terminal
    }
}

/// Probes one stream. Never fails: a stream whose configuration can't be read is not a
/// terminal.
pub fn probe<D: TerminalDevice>(device: &D, stream: StdStream) -> StreamCapability {
    let Ok(original) = device.get_state(stream) else {
        return StreamCapability::NOT_A_TERMINAL;
    };

    let native_vt = match device.vt_probe_candidate(stream, &original) {
        None => true,
        Some(candidate) => {
            let accepted = device.set_state(stream, &candidate).is_ok();
            if let Err(error) = device.set_state(stream, &original) {
                tracing::warn!(
                    message = "Failed to revert VT probe",
                    %stream,
                    error = %error
                );
            }
            accepted
        }
    };

    tracing::debug!(message = "Probed stream", %stream, native_vt);
    StreamCapability {
        is_terminal: true,
        native_vt,
    }
}

/// Probes all three standard streams. With `force_emulation` every terminal is treated
/// as lacking native VT processing.
pub fn probe_all<D: TerminalDevice>(device: &D, force_emulation: bool) -> StreamCapabilities {
    let probe_one = |stream| {
        let capability = probe(device, stream);
        if force_emulation {
            capability.without_native_vt()
        } else {
            capability
        }
    };
    StreamCapabilities {
        input: probe_one(StdStream::Input),
        output: probe_one(StdStream::Output),
        error: probe_one(StdStream::Error),
    }
}

/// Memoizes a process wide capability answer until [`reset()`](Self::reset) is called.
#[derive(Debug, Default)]
pub struct CapabilityCache {
    cached: Mutex<Option<bool>>,
}

impl CapabilityCache {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cached: Mutex::new(None),
        }
    }

    /// Returns the cached answer, or runs `probe` once and caches its result.
    pub fn get_or_probe(&self, probe: impl FnOnce() -> bool) -> bool {
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        *cached.get_or_insert_with(probe)
    }

    #[must_use]
    pub fn cached(&self) -> Option<bool> {
        *self.cached.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn reset(&self) { *self.cached.lock().unwrap_or_else(PoisonError::into_inner) = None; }
}

/// Backs [`crate::negotiate_native_escape_processing()`].
pub(crate) static NATIVE_ESCAPE_PROCESSING: CapabilityCache = CapabilityCache::new();
