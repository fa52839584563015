// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Tests against real standard streams. Each one re-runs the test binary as a child
//! process whose stdin, stdout and stderr are a PTY slave (or a file or pipe), and
//! checks what the child reports back.

mod pty_interrupt_restore_test;
mod pty_raw_input_test;
mod pty_round_trip_test;
mod pty_session_interrupt_test;
