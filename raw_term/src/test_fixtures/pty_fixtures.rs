// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{mode_transition::TermiosState, terminal_device::tcget};
use portable_pty::{NativePtySystem, PtyPair, PtySize, PtySystem};
use std::{fs::{File, OpenOptions},
          io::BufRead,
          time::{Duration, Instant}};

/// Opens a PTY pair and the slave side as a plain file, for tests that need a real
/// terminal device without touching the test runner's own streams. `None` when the
/// sandbox has no PTY support.
#[must_use]
pub fn open_pty_slave() -> Option<(PtyPair, File)> {
    let pair = NativePtySystem::default()
        .openpty(PtySize {
            rows: 24,
            cols: 80,
            pixel_width: 0,
            pixel_height: 0,
        })
        .ok()?;
    let slave_path = pair.master.tty_name()?;
    let slave = OpenOptions::new()
        .read(true)
        .write(true)
        .open(slave_path)
        .ok()?;
    Some((pair, slave))
}

/// The cooked termios of a fresh PTY slave.
#[must_use]
pub fn open_pty_slave_termios() -> Option<TermiosState> {
    let (_pair, slave) = open_pty_slave()?;
    tcget(&slave).ok()
}

/// Reads lines from the PTY master until one contains `sentinel`. Returns every line
/// read up to and including it, trimmed. Panics when the deadline passes or the slave
/// goes away.
pub fn read_until_sentinel(
    buf_reader: &mut impl BufRead,
    sentinel: &str,
    timeout: Duration,
) -> Vec<String> {
    let expires_at = Instant::now() + timeout;
    let mut lines = Vec::new();
    loop {
        assert!(
            Instant::now() < expires_at,
            "Timeout waiting for {sentinel:?}, got {lines:?}"
        );
        let mut line = String::new();
        match buf_reader.read_line(&mut line) {
            Ok(0) => panic!("EOF before {sentinel:?}, got {lines:?}"),
            Ok(_) => {
                let trimmed = line.trim().to_string();
                eprintln!("  <- Slave output: {trimmed:?}");
                if trimmed.contains(sentinel) {
                    lines.push(trimmed);
                    return lines;
                }
                lines.push(trimmed);
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(Duration::from_millis(10));
            }
            Err(e) => panic!("Read error while waiting for {sentinel:?}: {e}"),
        }
    }
}
