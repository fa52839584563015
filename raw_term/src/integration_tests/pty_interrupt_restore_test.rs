// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{StdStream, capture_state, generate_pty_test, set_echo_disabled,
            terminal_device::tcget,
            test_fixtures::read_until_sentinel};
use portable_pty::{Child, PtyPair};
use std::{fs::OpenOptions,
          io::{BufReader, Write},
          sync::mpsc,
          time::Duration};

generate_pty_test! {
    /// Ctrl+C while the main thread is blocked in a read: the interrupt guard restores
    /// echo and exits with status 0.
    ///
    /// Run with: `cargo test -p r3bl_raw_term --lib test_pty_interrupt_restore -- --nocapture`
    test_fn: test_pty_interrupt_restore,
    master: pty_master_entry_point,
    slave: pty_slave_entry_point
}

fn pty_master_entry_point(pty_pair: PtyPair, mut child: Box<dyn Child + Send + Sync>) {
    let slave_path = pty_pair.master.tty_name().expect("PTY has a slave path");
    let mut writer = pty_pair.master.take_writer().expect("Failed to get writer");
    let reader = pty_pair
        .master
        .try_clone_reader()
        .expect("Failed to clone reader");
    drop(pty_pair.slave);

    let (armed_sender, armed_receiver) = mpsc::channel();
    std::thread::spawn(move || {
        let mut buf_reader = BufReader::new(reader);
        let _lines = read_until_sentinel(&mut buf_reader, "ARMED", Duration::from_secs(10));
        let _unused = armed_sender.send(());
        // Keep draining so the slave never blocks on a full PTY buffer.
        let _unused = std::io::copy(&mut buf_reader, &mut std::io::sink());
    });

    armed_receiver
        .recv_timeout(Duration::from_secs(20))
        .expect("Slave never armed the guard");

    let slave_file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(&slave_path)
        .expect("Failed to open PTY slave");
    assert!(!tcget(&slave_file).expect("PTY slave termios").is_echo_enabled());

    // ISIG is still on, so the line discipline turns this into SIGINT.
    writer.write_all(&[0x03]).expect("Failed to write Ctrl+C");
    writer.flush().expect("Failed to flush");

    let status = child.wait().expect("Failed to wait for slave");
    assert_eq!(status.exit_code(), 0, "Slave failed: {status:?}");
    assert!(tcget(&slave_file).expect("PTY slave termios").is_echo_enabled());
}

fn pty_slave_entry_point() -> ! {
    let snapshot = capture_state(StdStream::Input).expect("Failed to capture stdin");
    set_echo_disabled(StdStream::Input, &snapshot).expect("Failed to disable echo");

    println!("ARMED");
    std::io::stdout().flush().expect("Failed to flush");

    // Blocked here when Ctrl+C arrives. The guard thread restores and exits.
    let mut line = String::new();
    let _unused = std::io::stdin().read_line(&mut line);

    // Only reached if the interrupt never came.
    std::process::exit(1);
}
