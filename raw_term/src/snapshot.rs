// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{NativeState, StdStream};

/// Opaque capture of one stream's terminal configuration, taken at a point in time.
///
/// A snapshot is only meaningful for the device it was captured from. Restoring it is
/// last writer wins: it overwrites whatever configuration the device has now. Derived
/// configurations (raw mode, echo off) are computed from the snapshot as new values,
/// and the snapshot itself is never modified.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<S = NativeState> {
    stream: StdStream,
    state: S,
}

impl<S> Snapshot<S> {
    pub(crate) fn new(stream: StdStream, state: S) -> Self { Self { stream, state } }

    /// The stream this snapshot was captured from.
    #[must_use]
    pub fn stream(&self) -> StdStream { self.stream }

    /// The platform configuration. Exposed for diagnostics, a caller can't build a
    /// snapshot from it.
    #[must_use]
    pub fn state(&self) -> &S { &self.state }
}
