// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! An in-memory [`TerminalDevice`] that behaves like a Windows console, so every
//! lifecycle property can be checked on any platform.

use crate::{InterruptGuard, StdStream, Terminal, TerminalDevice, WindowSize,
            mode_transition::console_mode::{self, ConsoleMode}};
use std::{collections::{HashMap, HashSet},
          io,
          sync::{Arc, Mutex, MutexGuard}};

/// Every call that reached the device, in order. Failed sets are recorded too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCall {
    Get(StdStream),
    Set(StdStream, ConsoleMode),
}

#[derive(Debug)]
struct Inner {
    modes: HashMap<StdStream, ConsoleMode>,
    /// Bits a stream refuses, like a console that predates VT support.
    rejected: HashMap<StdStream, ConsoleMode>,
    detached: HashSet<StdStream>,
    failing: HashSet<StdStream>,
    resizable: bool,
    window_size: WindowSize,
    calls: Vec<DeviceCall>,
}

#[derive(Debug)]
pub struct FakeTerminal {
    inner: Mutex<Inner>,
}

pub const FAKE_INPUT_MODE: ConsoleMode = ConsoleMode::from_bits_retain(0x01f7);
pub const FAKE_OUTPUT_MODE: ConsoleMode = ConsoleMode::from_bits_retain(0x0003);

impl Default for FakeTerminal {
    fn default() -> Self { Self::new() }
}

impl FakeTerminal {
    /// All three streams are consoles that accept VT processing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                modes: HashMap::from([
                    (StdStream::Input, FAKE_INPUT_MODE),
                    (StdStream::Output, FAKE_OUTPUT_MODE),
                    (StdStream::Error, FAKE_OUTPUT_MODE),
                ]),
                rejected: HashMap::new(),
                detached: HashSet::new(),
                failing: HashSet::new(),
                resizable: true,
                window_size: WindowSize::new(24, 80),
                calls: Vec::new(),
            }),
        }
    }

    /// Consoles that reject the VT bits.
    #[must_use]
    pub fn legacy_console() -> Self {
        let it = Self::new();
        {
            let mut inner = it.lock();
            inner
                .rejected
                .insert(StdStream::Input, ConsoleMode::ENABLE_VIRTUAL_TERMINAL_INPUT);
            for stream in [StdStream::Output, StdStream::Error] {
                inner
                    .rejected
                    .insert(stream, ConsoleMode::ENABLE_VIRTUAL_TERMINAL_PROCESSING);
            }
        }
        it
    }

    /// Turns `stream` into a file or pipe.
    pub fn detach(&self, stream: StdStream) { self.lock().detached.insert(stream); }

    /// Every following set on `stream` fails.
    pub fn fail_set(&self, stream: StdStream) { self.lock().failing.insert(stream); }

    pub fn allow_set(&self, stream: StdStream) { self.lock().failing.remove(&stream); }

    pub fn disable_resize(&self) { self.lock().resizable = false; }

    #[must_use]
    pub fn current(&self, stream: StdStream) -> ConsoleMode { self.lock().modes[&stream] }

    /// Input, output and error modes.
    #[must_use]
    pub fn all_current(&self) -> [ConsoleMode; 3] {
        let inner = self.lock();
        [
            inner.modes[&StdStream::Input],
            inner.modes[&StdStream::Output],
            inner.modes[&StdStream::Error],
        ]
    }

    #[must_use]
    pub fn calls(&self) -> Vec<DeviceCall> { self.lock().calls.clone() }

    pub fn clear_calls(&self) { self.lock().calls.clear(); }

    #[must_use]
    pub fn set_calls(&self) -> usize {
        self.set_streams().len()
    }

    /// The stream of every set, in order.
    #[must_use]
    pub fn set_streams(&self) -> Vec<StdStream> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                DeviceCall::Set(stream, _) => Some(*stream),
                DeviceCall::Get(_) => None,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }
}

fn not_a_terminal() -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, "not a terminal")
}

impl TerminalDevice for FakeTerminal {
    type State = ConsoleMode;

    fn is_terminal(&self, stream: StdStream) -> bool { !self.lock().detached.contains(&stream) }

    fn get_state(&self, stream: StdStream) -> io::Result<ConsoleMode> {
        let mut inner = self.lock();
        inner.calls.push(DeviceCall::Get(stream));
        if inner.detached.contains(&stream) {
            return Err(not_a_terminal());
        }
        Ok(inner.modes[&stream])
    }

    fn set_state(&self, stream: StdStream, state: &ConsoleMode) -> io::Result<()> {
        let mut inner = self.lock();
        inner.calls.push(DeviceCall::Set(stream, *state));
        if inner.detached.contains(&stream) {
            return Err(not_a_terminal());
        }
        let rejected = inner.rejected.get(&stream).copied().unwrap_or_default();
        if inner.failing.contains(&stream) || state.intersects(rejected) {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "mode rejected"));
        }
        inner.modes.insert(stream, *state);
        Ok(())
    }

    fn raw_input(&self, original: &ConsoleMode, vt_input_supported: bool) -> ConsoleMode {
        console_mode::raw_input(*original, vt_input_supported)
    }

    fn raw_output(
        &self,
        original: &ConsoleMode,
        vt_output_supported: bool,
    ) -> Option<ConsoleMode> {
        console_mode::raw_output(*original, vt_output_supported)
    }

    fn echo_disabled(&self, original: &ConsoleMode) -> ConsoleMode {
        console_mode::echo_disabled(*original)
    }

    fn vt_probe_candidate(
        &self,
        stream: StdStream,
        original: &ConsoleMode,
    ) -> Option<ConsoleMode> {
        Some(console_mode::vt_probe_candidate(stream, *original))
    }

    fn vt_output(&self, original: &ConsoleMode) -> Option<ConsoleMode> {
        Some(console_mode::vt_output(*original))
    }

    fn window_size(&self, stream: StdStream) -> io::Result<WindowSize> {
        let inner = self.lock();
        if inner.detached.contains(&stream) {
            return Err(not_a_terminal());
        }
        Ok(inner.window_size)
    }

    fn set_window_size(&self, stream: StdStream, size: WindowSize) -> io::Result<()> {
        let mut inner = self.lock();
        if !inner.resizable {
            return Err(io::ErrorKind::Unsupported.into());
        }
        if inner.detached.contains(&stream) {
            return Err(not_a_terminal());
        }
        inner.window_size = size;
        Ok(())
    }
}

/// A [`Terminal`] over `device` with a private guard. The guard records exit statuses
/// instead of exiting.
pub fn fake_terminal(device: FakeTerminal) -> (Terminal<FakeTerminal>, Arc<Mutex<Vec<i32>>>) {
    let exits = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&exits);
    let guard = InterruptGuard::with_exit_hook(move |status| {
        recorder.lock().unwrap().push(status);
    });
    (Terminal::new(device, Arc::new(guard)), exits)
}
