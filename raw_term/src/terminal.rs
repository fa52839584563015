// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Single stream operations: capture, restore, raw and echo transitions, probes and
//! window size. [`crate::Session`] builds on these for all three streams at once.

use crate::{InterruptGuard, NativeTerminal, Snapshot, StdStream, StreamCapabilities,
            StreamCapability, TermError, TerminalDevice, WindowSize, capability};
use std::{io, sync::Arc};

/// A [`TerminalDevice`] paired with the [`InterruptGuard`] that mode changes arm.
#[derive(Debug)]
pub struct Terminal<D: TerminalDevice = NativeTerminal> {
    device: Arc<D>,
    guard: Arc<InterruptGuard>,
}

impl<D: TerminalDevice> Clone for Terminal<D> {
    fn clone(&self) -> Self {
        Self {
            device: Arc::clone(&self.device),
            guard: Arc::clone(&self.guard),
        }
    }
}

impl Terminal<NativeTerminal> {
    /// The real standard streams and the process wide interrupt guard.
    #[must_use]
    pub fn native() -> Self { Self::new(NativeTerminal, InterruptGuard::global()) }
}

impl Default for Terminal<NativeTerminal> {
    fn default() -> Self { Self::native() }
}

impl<D: TerminalDevice> Terminal<D> {
    pub fn new(device: D, guard: Arc<InterruptGuard>) -> Self {
        Self {
            device: Arc::new(device),
            guard,
        }
    }

    #[must_use]
    pub fn device(&self) -> &D { &self.device }

    #[must_use]
    pub fn guard(&self) -> &Arc<InterruptGuard> { &self.guard }

    #[must_use]
    pub fn is_terminal_device(&self, stream: StdStream) -> bool {
        self.device.is_terminal(stream)
    }

    /// Captures the current configuration of `stream`. No side effects.
    ///
    /// # Errors
    ///
    /// [`TermError::NotATerminal`] for a file or pipe, [`TermError::Platform`] when the
    /// query fails on a terminal.
    pub fn capture_state(&self, stream: StdStream) -> Result<Snapshot<D::State>, TermError> {
        if !self.device.is_terminal(stream) {
            return Err(TermError::NotATerminal { stream });
        }
        let state = self
            .device
            .get_state(stream)
            .map_err(TermError::platform("capture terminal state", stream))?;
        tracing::trace!(message = "Captured terminal state", %stream, ?state);
        Ok(Snapshot::new(stream, state))
    }

    /// Puts `stream` back into the configuration held by `snapshot`, and disarms the
    /// interrupt guard for it.
    ///
    /// # Errors
    ///
    /// [`TermError::Platform`] when the platform rejects the configuration. The guard
    /// stays armed in that case.
    pub fn restore_state(
        &self,
        stream: StdStream,
        snapshot: &Snapshot<D::State>,
    ) -> Result<(), TermError> {
        restore_with(&*self.device, stream, snapshot)?;
        self.guard.disarm(stream);
        Ok(())
    }

    /// Installs a configuration derived from a captured snapshot.
    ///
    /// # Errors
    ///
    /// [`TermError::Platform`] when the platform rejects the configuration.
    pub fn apply_derived(&self, stream: StdStream, derived: &D::State) -> Result<(), TermError> {
        self.device
            .set_state(stream, derived)
            .map_err(TermError::platform("apply terminal state", stream))?;
        tracing::trace!(message = "Applied derived terminal state", %stream, ?derived);
        Ok(())
    }

    /// Captures `stream`, switches it to raw input, and arms the interrupt guard with
    /// the captured snapshot. Returns the snapshot the caller restores later.
    ///
    /// # Errors
    ///
    /// [`TermError::NotATerminal`] for a file or pipe, [`TermError::Platform`] when a
    /// platform call fails. The stream is unchanged when this fails.
    pub fn set_raw_input_mode(&self, stream: StdStream) -> Result<Snapshot<D::State>, TermError> {
        let capability = self.probe(stream);
        let snapshot = self.capture_state(stream)?;
        let raw = self.device.raw_input(snapshot.state(), capability.native_vt);
        self.apply_derived(stream, &raw)?;
        self.arm(stream, &snapshot);
        tracing::debug!(message = "Entered raw input mode", %stream);
        Ok(snapshot)
    }

    /// Captures `stream` and applies the raw output configuration, when the platform
    /// has one. Returns `None` when output needs no managed state.
    ///
    /// A rejected raw output configuration is logged and ignored. The snapshot is
    /// still returned, since older consoles refuse `DISABLE_NEWLINE_AUTO_RETURN` but
    /// the stream is otherwise usable.
    ///
    /// # Errors
    ///
    /// [`TermError::NotATerminal`] for a file or pipe, [`TermError::Platform`] when the
    /// capture fails.
    pub fn set_raw_output_mode(
        &self,
        stream: StdStream,
    ) -> Result<Option<Snapshot<D::State>>, TermError> {
        let capability = self.probe(stream);
        let snapshot = self.capture_state(stream)?;
        let managed = self.enter_raw_output(&snapshot, capability.native_vt);
        Ok(managed.then_some(snapshot))
    }

    /// Turns off echo on `stream`, starting from `snapshot`, and arms the interrupt
    /// guard so Ctrl+C restores it.
    ///
    /// # Errors
    ///
    /// [`TermError::Platform`] when the platform rejects the configuration.
    pub fn set_echo_disabled(
        &self,
        stream: StdStream,
        snapshot: &Snapshot<D::State>,
    ) -> Result<(), TermError> {
        let quiet = self.device.echo_disabled(snapshot.state());
        self.apply_derived(stream, &quiet)?;
        self.arm(stream, snapshot);
        tracing::debug!(message = "Disabled echo", %stream);
        Ok(())
    }

    /// See [`capability::probe()`].
    #[must_use]
    pub fn probe(&self, stream: StdStream) -> StreamCapability {
        capability::probe(&*self.device, stream)
    }

    /// See [`capability::probe_all()`].
    #[must_use]
    pub fn probe_all(&self, force_emulation: bool) -> StreamCapabilities {
        capability::probe_all(&*self.device, force_emulation)
    }

    /// Switches on VT processing for an output stream and leaves it on. Returns
    /// whether the stream now handles VT sequences.
    #[must_use]
    pub fn enable_vt_output(&self, stream: StdStream) -> bool {
        let Ok(original) = self.device.get_state(stream) else {
            return false;
        };
        match self.device.vt_output(&original) {
            None => true,
            Some(enabled) => match self.device.set_state(stream, &enabled) {
                Ok(()) => true,
                Err(error) => {
                    tracing::debug!(message = "VT output rejected", %stream, error = %error);
                    false
                }
            },
        }
    }

    /// # Errors
    ///
    /// [`TermError::Platform`] when the size can't be read.
    pub fn window_size(&self, stream: StdStream) -> Result<WindowSize, TermError> {
        self.device
            .window_size(stream)
            .map_err(TermError::platform("query window size", stream))
    }

    /// # Errors
    ///
    /// [`TermError::Unsupported`] on Windows, [`TermError::Platform`] when the resize
    /// fails.
    pub fn set_window_size(&self, stream: StdStream, size: WindowSize) -> Result<(), TermError> {
        match self.device.set_window_size(stream, size) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::Unsupported => {
                Err(TermError::Unsupported {
                    operation: "set window size",
                })
            }
            Err(error) => Err(TermError::platform("set window size", stream)(error)),
        }
    }

    /// Applies raw input starting from `snapshot`, without arming the guard. The
    /// session arms its own restore action.
    pub(crate) fn enter_raw_input(
        &self,
        snapshot: &Snapshot<D::State>,
        vt_input_supported: bool,
    ) -> Result<(), TermError> {
        let raw = self
            .device
            .raw_input(snapshot.state(), vt_input_supported);
        self.apply_derived(snapshot.stream(), &raw)
    }

    /// Applies raw output starting from `snapshot`, when the platform has one. Errors
    /// are logged and ignored. Returns whether the platform manages output state.
    pub(crate) fn enter_raw_output(
        &self,
        snapshot: &Snapshot<D::State>,
        vt_output_supported: bool,
    ) -> bool {
        let stream = snapshot.stream();
        let Some(raw) = self
            .device
            .raw_output(snapshot.state(), vt_output_supported)
        else {
            return false;
        };
        if let Err(error) = self.apply_derived(stream, &raw) {
            tracing::debug!(message = "Raw output rejected, ignoring", %stream, error = %error);
        }
        true
    }

    pub(crate) fn shared_device(&self) -> Arc<D> { Arc::clone(&self.device) }

    fn arm(&self, stream: StdStream, snapshot: &Snapshot<D::State>) {
        let device = Arc::clone(&self.device);
        let snapshot = snapshot.clone();
        self.guard.arm(
            stream,
            Box::new(move || restore_with(&*device, stream, &snapshot)),
        );
    }
}

/// Sets the captured configuration back on the device.
pub(crate) fn restore_with<D: TerminalDevice>(
    device: &D,
    stream: StdStream,
    snapshot: &Snapshot<D::State>,
) -> Result<(), TermError> {
    device
        .set_state(stream, snapshot.state())
        .map_err(TermError::platform("restore terminal state", stream))?;
    tracing::trace!(message = "Restored terminal state", %stream);
    Ok(())
}
