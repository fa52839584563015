// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod fake_terminal;
#[cfg(unix)]
pub mod pty_fixtures;

// Re-export.
pub use fake_terminal::*;
#[cfg(unix)]
pub use pty_fixtures::*;
