// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The seam between the lifecycle logic and the operating system.
//!
//! [`TerminalDevice`] has one associated [`State`] type, the opaque configuration of a
//! terminal device. [`NativeTerminal`] is the implementation selected at compile time:
//!
//! | Platform            | `State`                  | get / set                                |
//! | :------------------ | :----------------------- | :--------------------------------------- |
//! | Unix, Linux, macOS  | [`TermiosState`]         | `tcgetattr()` / `tcsetattr(TCSANOW)`     |
//! | Windows             | [`ConsoleMode`]          | `GetConsoleMode()` / `SetConsoleMode()`  |
//!
//! Everything above this module ([`crate::Terminal`], [`crate::Session`], the
//! capability probe) is generic over the trait. Tests plug in an in-memory device that
//! records every call.
//!
//! [`State`]: TerminalDevice::State
//! [`TermiosState`]: crate::mode_transition::TermiosState
//! [`ConsoleMode`]: crate::mode_transition::ConsoleMode

// Private modules.
#[cfg(unix)]
mod device_unix;
#[cfg(windows)]
mod device_windows;

// Re-export.
#[cfg(unix)]
pub use device_unix::*;
#[cfg(windows)]
pub use device_windows::*;

use crate::{StdStream, WindowSize};
use std::{fmt::Debug, io};

/// Platform access to the terminal configuration of the standard streams.
///
/// The getters and setters talk to the device. The transition methods are pure: they
/// compute a derived state from a captured one and never touch the device.
pub trait TerminalDevice: Send + Sync + Debug + 'static {
    type State: Clone + PartialEq + Debug + Send + Sync + 'static;

    /// Whether the descriptor behind `stream` is an interactive terminal.
    fn is_terminal(&self, stream: StdStream) -> bool;

    /// # Errors
    ///
    /// When the descriptor is not a terminal, or the platform query fails.
    fn get_state(&self, stream: StdStream) -> io::Result<Self::State>;

    /// # Errors
    ///
    /// When the platform rejects the configuration.
    fn set_state(&self, stream: StdStream, state: &Self::State) -> io::Result<()>;

    fn raw_input(&self, original: &Self::State, vt_input_supported: bool) -> Self::State;

    /// `None` means output needs no managed state on this platform.
    fn raw_output(
        &self,
        original: &Self::State,
        vt_output_supported: bool,
    ) -> Option<Self::State>;

    fn echo_disabled(&self, original: &Self::State) -> Self::State;

    /// The configuration the VT capability probe tries. `None` means VT processing is
    /// native and there is nothing to try.
    fn vt_probe_candidate(
        &self,
        stream: StdStream,
        original: &Self::State,
    ) -> Option<Self::State>;

    /// The configuration with VT processing switched on for good. `None` means it is
    /// always on.
    fn vt_output(&self, original: &Self::State) -> Option<Self::State>;

    /// # Errors
    ///
    /// When the size can't be queried.
    fn window_size(&self, stream: StdStream) -> io::Result<WindowSize>;

    /// # Errors
    ///
    /// [`io::ErrorKind::Unsupported`] where the platform can't resize, or the
    /// platform error.
    fn set_window_size(&self, stream: StdStream, size: WindowSize) -> io::Result<()>;
}

/// The captured state type of the compile-time selected device.
pub type NativeState = <NativeTerminal as TerminalDevice>::State;
