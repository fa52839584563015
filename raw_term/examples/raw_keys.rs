// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Prints the bytes of each key press until `q` or Ctrl+C.
//!
//! Run with: `cargo run -p r3bl_raw_term --example raw_keys -- --help`

use clap::Parser;
use miette::IntoDiagnostic;
use r3bl_raw_term::{OutputTarget, Session, SessionOptions, StdStream, TracingConfig,
                    capture_state, query_window_size, restore_state, set_echo_disabled,
                    stream_info, try_initialize_logging_global};
use std::io::{BufRead, Read, Write};
use tracing_core::LevelFilter;

#[derive(Debug, Parser)]
#[command(
    name = "raw_keys",
    about = "Show the bytes a terminal sends for each key, in raw mode",
    version
)]
struct CLIArg {
    /// Read one line with echo off instead of raw keys
    #[arg(long)]
    password: bool,

    /// Use the software ANSI emulator even on VT capable terminals
    #[arg(long)]
    force_emulation: bool,

    /// Write debug logs to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<String>,
}

fn main() -> miette::Result<()> {
    let cli_arg = CLIArg::parse();

    if let Some(log_file) = cli_arg.log_file.clone() {
        try_initialize_logging_global(TracingConfig::new_file(
            Some(log_file),
            LevelFilter::DEBUG,
        ))?;
    }

    for info in stream_info() {
        println!("{}: terminal={}", info.stream, info.is_terminal);
    }
    if let Ok(size) = query_window_size(StdStream::Output) {
        println!("window: {} rows x {} cols", size.rows, size.cols);
    }

    if cli_arg.password {
        read_password()
    } else {
        show_raw_keys(cli_arg.force_emulation)
    }
}

fn read_password() -> miette::Result<()> {
    let snapshot = capture_state(StdStream::Input)?;
    set_echo_disabled(StdStream::Input, &snapshot)?;

    print!("password: ");
    std::io::stdout().flush().into_diagnostic()?;
    let mut line = String::new();
    let result = std::io::stdin().lock().read_line(&mut line);

    restore_state(StdStream::Input, &snapshot)?;
    result.into_diagnostic()?;
    println!("\nread {} characters", line.trim_end().chars().count());
    Ok(())
}

fn show_raw_keys(force_emulation: bool) -> miette::Result<()> {
    let mut session = Session::open_with(SessionOptions {
        force_emulation,
        ..SessionOptions::from_env()
    });
    let mut output = session.effective_output(OutputTarget::Stdout);

    write!(output, "Press keys, q or Ctrl+C to quit.\r\n").into_diagnostic()?;
    output.flush().into_diagnostic()?;

    let mut buf = [0; 32];
    loop {
        let Some(input) = session.effective_input() else {
            break;
        };
        let count = input.read(&mut buf).into_diagnostic()?;
        if count == 0 {
            break;
        }
        let bytes = &buf[..count];
        write!(output, "{bytes:02x?}\r\n").into_diagnostic()?;
        output.flush().into_diagnostic()?;
        if bytes.iter().any(|byte| matches!(byte, b'q' | 0x03)) {
            break;
        }
    }

    session.close()?;
    Ok(())
}
