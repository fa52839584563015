// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Error taxonomy for terminal state operations.
//!
//! | Variant             | Cause                                                        |
//! | :------------------ | :----------------------------------------------------------- |
//! | [`NotATerminal`]    | The stream is a file or pipe, not an interactive terminal    |
//! | [`Platform`]        | The termios / console mode call itself failed                |
//! | [`Unsupported`]     | The platform has no equivalent for the requested operation   |
//! | [`InvalidSnapshot`] | A restore was attempted with an absent or consumed snapshot  |
//!
//! Capability probes never return these; they degrade to `false`. Mutating operations
//! return them to the immediate caller.
//!
//! [`NotATerminal`]: TermError::NotATerminal
//! [`Platform`]: TermError::Platform
//! [`Unsupported`]: TermError::Unsupported
//! [`InvalidSnapshot`]: TermError::InvalidSnapshot

use crate::StdStream;
use std::io;

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum TermError {
    #[error("{stream} is not an interactive terminal")]
    #[diagnostic(
        code(r3bl_raw_term::not_a_terminal),
        help("The stream is redirected to a file or pipe. Raw mode only applies to a TTY.")
    )]
    NotATerminal { stream: StdStream },

    /// The platform call failed. The [`io::Error`] is kept for diagnostics only.
    #[error("{operation} failed on {stream}")]
    #[diagnostic(code(r3bl_raw_term::platform))]
    Platform {
        operation: &'static str,
        stream: StdStream,
        #[source]
        source: io::Error,
    },

    #[error("{operation} is not supported on this platform")]
    #[diagnostic(code(r3bl_raw_term::unsupported))]
    Unsupported { operation: &'static str },

    #[error("no snapshot to restore for {stream}")]
    #[diagnostic(
        code(r3bl_raw_term::invalid_snapshot),
        help("The snapshot was never captured, or it was already consumed by a restore.")
    )]
    InvalidSnapshot { stream: StdStream },
}

impl TermError {
    pub(crate) fn platform(
        operation: &'static str,
        stream: StdStream,
    ) -> impl FnOnce(io::Error) -> Self {
        move |source| TermError::Platform {
            operation,
            stream,
            source,
        }
    }

    #[must_use]
    pub fn is_not_a_terminal(&self) -> bool {
        matches!(self, TermError::NotATerminal { .. })
    }
}
