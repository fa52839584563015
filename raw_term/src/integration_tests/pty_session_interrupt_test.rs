// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{Session, SessionOptions, StdStream, generate_pty_test, terminal_device::tcget,
            test_fixtures::read_until_sentinel};
use portable_pty::{Child, PtyPair};
use rustix::process::{Pid, Signal, kill_process};
use std::{fs::OpenOptions,
          io::{BufReader, Read, Write},
          sync::mpsc,
          time::Duration};

generate_pty_test! {
    /// `SIGINT` while a raw session is blocked reading stdin: the interrupt guard puts
    /// the cooked terminal back and exits with status 0. `ISIG` is off in raw mode, so
    /// the signal is sent to the process rather than typed.
    ///
    /// Run with: `cargo test -p r3bl_raw_term --lib test_pty_session_interrupt -- --nocapture`
    test_fn: test_pty_session_interrupt,
    master: pty_master_entry_point,
    slave: pty_slave_entry_point
}

fn pty_master_entry_point(pty_pair: PtyPair, mut child: Box<dyn Child + Send + Sync>) {
    let slave_path = pty_pair.master.tty_name().expect("PTY has a slave path");
    let writer = pty_pair.master.take_writer().expect("Failed to get writer");
    let reader = pty_pair
        .master
        .try_clone_reader()
        .expect("Failed to clone reader");
    drop(pty_pair.slave);

    let (ready_sender, ready_receiver) = mpsc::channel();
    std::thread::spawn(move || {
        let mut buf_reader = BufReader::new(reader);
        let _lines =
            read_until_sentinel(&mut buf_reader, "RAW_READING", Duration::from_secs(10));
        let _unused = ready_sender.send(());
        let _unused = std::io::copy(&mut buf_reader, &mut std::io::sink());
    });

    ready_receiver
        .recv_timeout(Duration::from_secs(20))
        .expect("Slave never started reading");

    let slave_file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(&slave_path)
        .expect("Failed to open PTY slave");
    let raw = tcget(&slave_file).expect("PTY slave termios");
    assert!(!raw.is_canonical());
    assert!(!raw.is_echo_enabled());

    // Give the slave time to block in `read()`.
    std::thread::sleep(Duration::from_millis(200));
    let pid = child
        .process_id()
        .and_then(|it| Pid::from_raw(i32::try_from(it).ok()?))
        .expect("Slave has a pid");
    kill_process(pid, Signal::INT).expect("Failed to send SIGINT");

    let status = child.wait().expect("Failed to wait for slave");
    assert_eq!(status.exit_code(), 0, "Slave failed: {status:?}");
    let restored = tcget(&slave_file).expect("PTY slave termios");
    assert!(restored.is_canonical());
    assert!(restored.is_echo_enabled());
    drop(writer);
}

fn pty_slave_entry_point() -> ! {
    let mut session = Session::open_with(SessionOptions {
        duplicate_input: Some(false),
        ..SessionOptions::default()
    });
    assert!(session.is_managed(StdStream::Input));
    assert!(session.terminal().guard().is_armed(StdStream::Input));

    println!("RAW_READING");
    std::io::stdout().flush().expect("Failed to flush");

    // Blocked here when SIGINT arrives. The guard thread restores and exits.
    let mut key = [0; 1];
    let _unused = session
        .effective_input()
        .expect("Session is open")
        .read(&mut key);

    // Only reached if the interrupt never came.
    std::process::exit(1);
}
