// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{Session, StdStream, generate_pty_test, terminal_device::tcget,
            test_fixtures::read_until_sentinel};
use portable_pty::{Child, PtyPair};
use std::{io::{BufReader, Read, Write},
          sync::mpsc,
          time::Duration};

generate_pty_test! {
    /// A session delivers each key as it is typed, without echo and without waiting for
    /// Enter, and `close()` brings back the cooked terminal.
    ///
    /// Run with: `cargo test -p r3bl_raw_term --lib test_pty_raw_input -- --nocapture`
    test_fn: test_pty_raw_input,
    master: pty_master_entry_point,
    slave: pty_slave_entry_point
}

fn pty_master_entry_point(pty_pair: PtyPair, mut child: Box<dyn Child + Send + Sync>) {
    let mut writer = pty_pair.master.take_writer().expect("Failed to get writer");
    let reader = pty_pair
        .master
        .try_clone_reader()
        .expect("Failed to clone reader");
    drop(pty_pair.slave);

    let (ready_sender, ready_receiver) = mpsc::channel();
    let (sender, receiver) = mpsc::channel();
    std::thread::spawn(move || {
        let mut buf_reader = BufReader::new(reader);
        let _ready = read_until_sentinel(&mut buf_reader, "SLAVE_READY", Duration::from_secs(10));
        let _unused = ready_sender.send(());
        let after =
            read_until_sentinel(&mut buf_reader, "SESSION_CLOSED", Duration::from_secs(10));
        let _unused = sender.send(after);
    });

    ready_receiver
        .recv_timeout(Duration::from_secs(20))
        .expect("Slave never became ready");

    // No Enter: a cooked terminal would hold these bytes back.
    writer.write_all(b"QZ").expect("Failed to write keys");
    writer.flush().expect("Failed to flush");

    let after = receiver
        .recv_timeout(Duration::from_secs(20))
        .expect("Slave output never arrived");

    assert!(after.iter().any(|it| it.contains("GOT:51,5a")), "{after:?}");
    // Echo off: the typed keys never come back.
    assert!(!after.iter().any(|it| it.contains("QZ")), "{after:?}");
    assert!(after.iter().any(|it| it.contains("canonical=true")), "{after:?}");

    drop(writer);
    let status = child.wait().expect("Failed to wait for slave");
    assert!(status.success(), "Slave failed: {status:?}");
}

fn pty_slave_entry_point() -> ! {
    let mut session = Session::open();
    assert!(session.is_managed(StdStream::Input));
    assert!(session.terminal().guard().is_armed(StdStream::Input));

    println!("SLAVE_READY");
    std::io::stdout().flush().expect("Failed to flush");

    let mut keys = [0; 2];
    session
        .effective_input()
        .expect("Session is open")
        .read_exact(&mut keys)
        .expect("Failed to read keys");
    println!("GOT:{:02x},{:02x}", keys[0], keys[1]);

    session.close().expect("Failed to close session");
    let restored = tcget(std::io::stdin()).expect("stdin is a PTY");
    println!(
        "canonical={} echo={}",
        restored.is_canonical(),
        restored.is_echo_enabled()
    );
    println!("SESSION_CLOSED");
    std::io::stdout().flush().expect("Failed to flush");
    std::process::exit(0);
}
