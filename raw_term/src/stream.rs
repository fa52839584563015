// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Identity of the three standard streams, and the window size value type.
//!
//! The descriptors themselves are never owned by this crate. They are borrowed from
//! [`std::io::stdin()`], [`std::io::stdout()`] and [`std::io::stderr()`] every time a
//! platform call needs them.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// One of the three standard streams of the current process.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    Serialize,
    Deserialize,
)]
pub enum StdStream {
    #[strum(to_string = "stdin")]
    Input,
    #[strum(to_string = "stdout")]
    Output,
    #[strum(to_string = "stderr")]
    Error,
}

impl StdStream {
    /// Order in which a session restores its slots. The error stream goes first since it
    /// is the least likely to be actively read.
    pub const RESTORE_ORDER: [StdStream; 3] =
        [StdStream::Error, StdStream::Output, StdStream::Input];

    #[must_use]
    pub fn is_input(self) -> bool { matches!(self, StdStream::Input) }
}

/// The two standard streams that can be written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum OutputTarget {
    #[strum(to_string = "stdout")]
    Stdout,
    #[strum(to_string = "stderr")]
    Stderr,
}

impl OutputTarget {
    #[must_use]
    pub fn stream(self) -> StdStream {
        match self {
            OutputTarget::Stdout => StdStream::Output,
            OutputTarget::Stderr => StdStream::Error,
        }
    }
}

/// Visible size of a terminal window.
///
/// The pixel fields are only reported on Unix, where `TIOCGWINSZ` carries them. They
/// are written back unchanged by [`set_window_size()`] so that a caller that only
/// adjusts rows and columns does not clobber them.
///
/// [`set_window_size()`]: crate::set_window_size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WindowSize {
    pub rows: u16,
    pub cols: u16,
    pub x_pixels: u16,
    pub y_pixels: u16,
}

impl WindowSize {
    #[must_use]
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            rows,
            cols,
            ..Default::default()
        }
    }
}

/// Whether a standard stream is attached to an interactive terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    pub stream: StdStream,
    pub is_terminal: bool,
}
