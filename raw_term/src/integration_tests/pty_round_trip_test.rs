// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{StdStream, capture_state, generate_pty_test, restore_state, set_raw_input_mode,
            terminal_device::tcget,
            test_fixtures::read_until_sentinel};
use portable_pty::{Child, PtyPair};
use std::{io::{BufReader, Write},
          time::Duration};

generate_pty_test! {
    /// Raw input on the real stdin, then restore. The child checks the termios itself.
    ///
    /// Run with: `cargo test -p r3bl_raw_term --lib test_pty_round_trip -- --nocapture`
    test_fn: test_pty_round_trip,
    master: pty_master_entry_point,
    slave: pty_slave_entry_point
}

fn pty_master_entry_point(pty_pair: PtyPair, mut child: Box<dyn Child + Send + Sync>) {
    let reader = pty_pair
        .master
        .try_clone_reader()
        .expect("Failed to clone reader");
    drop(pty_pair.slave);

    let mut buf_reader = BufReader::new(reader);
    let lines = read_until_sentinel(&mut buf_reader, "ROUND_TRIP_OK", Duration::from_secs(10));
    assert!(lines.iter().any(|it| it.contains("RAW canonical=false echo=false")));

    let status = child.wait().expect("Failed to wait for slave");
    assert!(status.success(), "Slave failed: {status:?}");
}

fn pty_slave_entry_point() -> ! {
    let cooked = tcget(std::io::stdin()).expect("stdin is a PTY");
    assert!(cooked.is_canonical());

    let snapshot = capture_state(StdStream::Input).expect("Failed to capture stdin");
    let raw_snapshot = set_raw_input_mode(StdStream::Input).expect("Failed to enter raw mode");
    assert_eq!(raw_snapshot.state(), snapshot.state());

    let raw = tcget(std::io::stdin()).expect("stdin is a PTY");
    println!(
        "RAW canonical={} echo={}",
        raw.is_canonical(),
        raw.is_echo_enabled()
    );

    restore_state(StdStream::Input, &snapshot).expect("Failed to restore stdin");
    let restored = tcget(std::io::stdin()).expect("stdin is a PTY");
    assert_eq!(restored, cooked);

    println!("ROUND_TRIP_OK");
    std::io::stdout().flush().expect("Failed to flush");
    std::process::exit(0);
}
