// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! [`Session`] puts stdin, stdout and stderr into raw mode together, and puts them back
//! with one [`close()`](Session::close).
//!
//! # Lifecycle
//!
//! ```text
//! open ─▶ probe all ─▶ per stream: capture ─▶ derive ─▶ apply ─▶ slot = Some(snapshot)
//!                   ─▶ arm interrupt guard (one action per occupied slot)
//!                   ─▶ select effective input
//!
//! close ─▶ drop effective input, release a read blocked on a duplicate
//!       ─▶ restore error, output, input (each on its own, slot = None on success)
//!       ─▶ disarm restored streams
//! ```
//!
//! # Slots
//!
//! Each slot is an `Arc<Mutex<Option<Snapshot>>>` shared between the session and the
//! interrupt guard's restore action. Whoever takes the lock first restores and empties
//! the slot. The loser finds it empty and does nothing, so an interrupt that races a
//! `close()` never restores twice.
//!
//! A slot is empty when the stream is not a terminal, when its transition failed, when
//! the platform keeps no output state (Unix stdout and stderr), or after a successful
//! restore.

use crate::{InputCloser, NativeTerminal, OutputTarget, SessionOptions, Snapshot,
            StdStream, StreamCapabilities, TermError, Terminal, TerminalDevice,
            stream_selector::{EffectiveInput, EffectiveOutput, select_input,
                              select_output},
            terminal::restore_with};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type SharedSlot<S> = Arc<Mutex<Option<Snapshot<S>>>>;

fn lock_slot<S>(slot: &SharedSlot<S>) -> MutexGuard<'_, Option<Snapshot<S>>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
pub struct Session<D: TerminalDevice = NativeTerminal> {
    terminal: Terminal<D>,
    options: SessionOptions,
    capabilities: StreamCapabilities,
    input_slot: SharedSlot<D::State>,
    output_slot: SharedSlot<D::State>,
    error_slot: SharedSlot<D::State>,
    input: Option<EffectiveInput>,
    input_closer: Option<InputCloser>,
}

impl Session<NativeTerminal> {
    /// Opens a session on the real standard streams, with options from
    /// [`SessionOptions::from_env()`].
    #[must_use]
    pub fn open() -> Self { Self::open_with(SessionOptions::from_env()) }

    #[must_use]
    pub fn open_with(options: SessionOptions) -> Self {
        Self::open_on(Terminal::native(), options)
    }
}

impl<D: TerminalDevice> Session<D> {
    /// Opens a session on any device.
    ///
    /// Never fails. A stream that can't be managed (not a terminal, or the platform
    /// refused the change) is logged and left alone, and the other streams are still
    /// managed.
    pub fn open_on(terminal: Terminal<D>, options: SessionOptions) -> Self {
        let capabilities = terminal.probe_all(options.force_emulation);
        let mut session = Self {
            terminal,
            options,
            capabilities,
            input_slot: Arc::default(),
            output_slot: Arc::default(),
            error_slot: Arc::default(),
            input: None,
            input_closer: None,
        };

        for stream in [StdStream::Input, StdStream::Output, StdStream::Error] {
            session.manage(stream);
        }

        if options.arm_interrupt_guard {
            session.arm_guard();
        }

        let input = select_input(capabilities.input, options.effective_duplicate_input());
        session.input_closer = input.closer();
        session.input = Some(input);

        tracing::debug!(
            message = "Opened terminal session",
            input = session.is_managed(StdStream::Input),
            output = session.is_managed(StdStream::Output),
            error = session.is_managed(StdStream::Error),
            ?capabilities
        );
        session
    }

    /// The reader for standard input, or `None` after [`close()`](Self::close).
    pub fn effective_input(&mut self) -> Option<&mut EffectiveInput> { self.input.as_mut() }

    /// Moves the reader for standard input out of the session, so another thread can
    /// block on it. When it is a duplicate, [`close()`](Self::close) still releases that
    /// read, which then returns `Ok(0)`.
    pub fn take_input(&mut self) -> Option<EffectiveInput> { self.input.take() }

    /// A writer for stdout or stderr that matches the probed capability.
    #[must_use]
    pub fn effective_output(&self, target: OutputTarget) -> EffectiveOutput {
        select_output(target, self.capabilities.get(target.stream()))
    }

    #[must_use]
    pub fn capabilities(&self) -> StreamCapabilities { self.capabilities }

    #[must_use]
    pub fn options(&self) -> SessionOptions { self.options }

    #[must_use]
    pub fn terminal(&self) -> &Terminal<D> { &self.terminal }

    /// Whether `stream` holds a snapshot that [`close()`](Self::close) will restore.
    #[must_use]
    pub fn is_managed(&self, stream: StdStream) -> bool {
        lock_slot(self.slot(stream)).is_some()
    }

    /// `true` once every slot is empty and the input reader has been dropped or released.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.input.is_none()
            && self.input_closer.is_none()
            && StdStream::RESTORE_ORDER
                .iter()
                .all(|&stream| !self.is_managed(stream))
    }

    /// Drops the effective input and releases a read blocked on a duplicate, then
    /// restores error, output and input.
    ///
    /// Each stream is restored independently. A slot is emptied only when its restore
    /// succeeds, so calling `close()` again retries just the failures, and costs no
    /// device calls once everything is restored.
    ///
    /// # Errors
    ///
    /// The first restore failure. The other streams are still attempted.
    pub fn close(&mut self) -> Result<(), TermError> {
        if let Some(input) = self.input.take() {
            tracing::trace!(message = "Dropped effective input", kind = input.kind());
        }
        if let Some(closer) = self.input_closer.take() {
            closer.close();
        }

        let mut first_error = None;
        for stream in StdStream::RESTORE_ORDER {
            match restore_slot(self.terminal.device(), stream, self.slot(stream)) {
                Ok(restored) => {
                    if restored {
                        self.terminal.guard().disarm(stream);
                    }
                }
                Err(error) => {
                    tracing::warn!(message = "Failed to restore stream", %stream, error = %error);
                    first_error.get_or_insert(error);
                }
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Restores one stream ahead of [`close()`](Self::close), which then skips it.
    ///
    /// # Errors
    ///
    /// [`TermError::InvalidSnapshot`] when the stream is not managed (never was, or
    /// already restored), [`TermError::Platform`] when the restore fails.
    pub fn restore_stream(&self, stream: StdStream) -> Result<(), TermError> {
        if restore_slot(self.terminal.device(), stream, self.slot(stream))? {
            self.terminal.guard().disarm(stream);
            Ok(())
        } else {
            Err(TermError::InvalidSnapshot { stream })
        }
    }

    fn slot(&self, stream: StdStream) -> &SharedSlot<D::State> {
        match stream {
            StdStream::Input => &self.input_slot,
            StdStream::Output => &self.output_slot,
            StdStream::Error => &self.error_slot,
        }
    }

    fn manage(&mut self, stream: StdStream) {
        let snapshot = match self.terminal.capture_state(stream) {
            Ok(snapshot) => snapshot,
            Err(TermError::NotATerminal { .. }) => {
                tracing::debug!(message = "Not a terminal, passing through", %stream);
                return;
            }
            Err(error) => {
                tracing::warn!(message = "Failed to capture stream", %stream, error = %error);
                return;
            }
        };

        let native_vt = self.capabilities.get(stream).native_vt;
        let managed = if stream.is_input() {
            match self.terminal.enter_raw_input(&snapshot, native_vt) {
                Ok(()) => true,
                Err(error) => {
                    tracing::warn!(message = "Failed to enter raw input", %stream, error = %error);
                    false
                }
            }
        } else {
            self.terminal.enter_raw_output(&snapshot, native_vt)
        };

        if managed {
            *lock_slot(self.slot(stream)) = Some(snapshot);
        }
    }

    fn arm_guard(&self) {
        for stream in StdStream::RESTORE_ORDER {
            if !self.is_managed(stream) {
                continue;
            }
            let device = self.terminal.shared_device();
            let slot = Arc::clone(self.slot(stream));
            self.terminal.guard().arm(
                stream,
                Box::new(move || restore_slot(&*device, stream, &slot).map(|_| ())),
            );
        }
    }
}

impl<D: TerminalDevice> Drop for Session<D> {
    fn drop(&mut self) {
        if let Err(error) = self.close() {
            tracing::error!(message = "Terminal left in raw mode", error = %error);
        }
    }
}

/// Restores and empties `slot`. Returns `false` when it was already empty.
fn restore_slot<D: TerminalDevice>(
    device: &D,
    stream: StdStream,
    slot: &SharedSlot<D::State>,
) -> Result<bool, TermError> {
    let mut slot = lock_slot(slot);
    let Some(snapshot) = slot.as_ref() else {
        return Ok(false);
    };
    restore_with(device, stream, snapshot)?;
    *slot = None;
    Ok(true)
}
