// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words termios conpty

//! # r3bl_raw_term
//!
//! Raw mode for stdin, stdout and stderr on Unix and Windows, with guaranteed
//! restoration.
//!
//! - **Capture and restore**: a [`Snapshot`] holds the opaque configuration of one
//!   stream (termios on Unix, console mode on Windows). Restoring it is last writer
//!   wins.
//! - **Raw, echo off**: [`set_raw_input_mode()`] and [`set_echo_disabled()`] derive a
//!   new configuration from a snapshot and install it.
//! - **Interrupt safety**: every mode change arms the process wide
//!   [`InterruptGuard`]. On Ctrl+C it restores each armed stream (error, output, then
//!   input) and exits with status `0`, even while the main thread is blocked in a read.
//! - **VT fallback**: consoles that can't process escape sequences natively get a
//!   software emulator ([`emulation::AnsiWriter`], [`emulation::AnsiReader`]) behind
//!   the same [`std::io::Read`] / [`std::io::Write`] interface.
//!
//! # Session
//!
//! ```no_run
//! use r3bl_raw_term::Session;
//! use std::io::Read;
//!
//! # fn main() -> miette::Result<()> {
//! let mut session = Session::open();
//! let mut key = [0; 1];
//! if let Some(input) = session.effective_input() {
//!     input.read_exact(&mut key).map_err(|error| miette::miette!("{error}"))?;
//! }
//! session.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Platform differences
//!
//! | Concern                 | Unix                               | Windows                                |
//! | :---------------------- | :--------------------------------- | :------------------------------------- |
//! | state                   | termios                            | console mode bits                      |
//! | raw output              | nothing to do                      | `DISABLE_NEWLINE_AUTO_RETURN` (+ VT)   |
//! | VT processing           | always native                      | probed, emulated when rejected         |
//! | interrupt               | `SIGINT` via `signal-hook`         | console control handler via `ctrlc`    |
//! | set window size         | `TIOCSWINSZ`                       | [`TermError::Unsupported`]             |
//! | unblock read on close   | when input is duplicated (opt in)  | yes (input is a duplicated handle)     |
//!
//! # Logging
//!
//! Lifecycle events are emitted with [`tracing`]. Nothing is printed unless a
//! subscriber is installed, for example with [`try_initialize_logging_global()`]. Log
//! to a file: stderr may itself be in raw mode.

// Enforce strict error handling in production library code only. Tests and examples are
// allowed to use .unwrap() (workspace `Cargo.toml` config allows it).
#![cfg_attr(not(test), deny(clippy::unwrap_in_result))]

// Attach modules.
pub mod capability;
pub mod duplicate_input;
pub mod emulation;
pub mod error;
pub mod interrupt_guard;
pub mod log;
pub mod mode_transition;
pub mod options;
pub mod public_api;
pub mod session;
pub mod snapshot;
pub mod stream;
pub mod stream_selector;
pub mod terminal;
pub mod terminal_device;

#[cfg(test)]
pub mod test_fixtures;

#[cfg(all(test, unix))]
mod integration_tests;

// Re-export.
pub use capability::{CapabilityCache, StreamCapabilities, StreamCapability};
pub use duplicate_input::*;
pub use error::*;
pub use interrupt_guard::*;
pub use log::*;
pub use mode_transition::ConsoleMode;
#[cfg(unix)]
pub use mode_transition::TermiosState;
pub use options::*;
pub use public_api::*;
pub use session::*;
pub use snapshot::*;
pub use stream::*;
pub use stream_selector::{EffectiveInput, EffectiveOutput, StdStreamWriter};
pub use terminal::*;
pub use terminal_device::*;
