// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Restores terminal state when the process is interrupted, even while the main thread
//! is blocked in a read.
//!
//! # Registration table
//!
//! The guard holds at most one restore action per [`StdStream`]. Arming a stream that
//! is already armed replaces its action. When the guard fires it:
//! 1. Takes the whole table out under the lock (so a concurrent `close()` never waits
//!    on an action that waits on it).
//! 2. Runs the actions in [`StdStream::RESTORE_ORDER`], logging and swallowing errors.
//! 3. Calls the exit hook with status `0`.
//!
//! It fires at most once per guard, no matter how many threads trigger it.
//!
//! # OS handler
//!
//! The process wide guard from [`InterruptGuard::global()`] installs one handler the
//! first time anything is armed:
//! - Unix: a thread waiting on `SIGINT` through [`signal_hook::iterator::Signals`].
//! - Windows: a console control handler through [`ctrlc`] (Ctrl+C and Ctrl+Break).
//!
//! In raw input mode `ISIG` is off, so Ctrl+C arrives as byte `0x03` rather than a
//! signal. The handler covers echo disabled mode and a `SIGINT` sent by another
//! process.

use crate::{StdStream, TermError};
use std::{collections::HashMap,
          fmt,
          sync::{Arc, LazyLock, Mutex, Once, PoisonError,
                 atomic::{AtomicBool, Ordering}}};

/// Puts one stream back into its captured configuration.
pub type RestoreAction = Box<dyn FnMut() -> Result<(), TermError> + Send>;

/// Ends the process. Receives the exit status.
pub type ExitHook = Box<dyn Fn(i32) + Send + Sync>;

/// Exit status used after an interrupt restored the terminal.
pub const INTERRUPT_EXIT_STATUS: i32 = 0;

pub struct InterruptGuard {
    actions: Mutex<HashMap<StdStream, RestoreAction>>,
    exit_hook: ExitHook,
    fired: AtomicBool,
    installs_os_handler: bool,
}

static GLOBAL_GUARD: LazyLock<Arc<InterruptGuard>> = LazyLock::new(|| {
    Arc::new(InterruptGuard {
        actions: Mutex::new(HashMap::new()),
        exit_hook: Box::new(|status| std::process::exit(status)),
        fired: AtomicBool::new(false),
        installs_os_handler: true,
    })
});

impl InterruptGuard {
    /// The process wide guard. Its exit hook is [`std::process::exit()`].
    #[must_use]
    pub fn global() -> Arc<InterruptGuard> { Arc::clone(&GLOBAL_GUARD) }

    /// A private guard that is never connected to an OS handler. It only fires through
    /// [`trigger()`](Self::trigger).
    #[must_use]
    pub fn with_exit_hook(exit_hook: impl Fn(i32) + Send + Sync + 'static) -> Self {
        Self {
            actions: Mutex::new(HashMap::new()),
            exit_hook: Box::new(exit_hook),
            fired: AtomicBool::new(false),
            installs_os_handler: false,
        }
    }

    pub fn arm(&self, stream: StdStream, action: RestoreAction) {
        if self.installs_os_handler {
            install_os_handler();
        }
        let replaced = self.lock_actions().insert(stream, action).is_some();
        tracing::debug!(message = "Armed interrupt guard", %stream, replaced);
    }

    pub fn disarm(&self, stream: StdStream) {
        if self.lock_actions().remove(&stream).is_some() {
            tracing::debug!(message = "Disarmed interrupt guard", %stream);
        }
    }

    #[must_use]
    pub fn is_armed(&self, stream: StdStream) -> bool {
        self.lock_actions().contains_key(&stream)
    }

    #[must_use]
    pub fn has_fired(&self) -> bool { self.fired.load(Ordering::SeqCst) }

    /// Restores every armed stream, then calls the exit hook. Only the first call does
    /// anything.
    pub fn trigger(&self) {
        if self.fired.swap(true, Ordering::SeqCst) {
            return;
        }

        let mut actions = std::mem::take(&mut *self.lock_actions());
        tracing::info!(message = "Interrupted, restoring terminal", armed = actions.len());

        for stream in StdStream::RESTORE_ORDER {
            let Some(mut action) = actions.remove(&stream) else {
                continue;
            };
            if let Err(error) = action() {
                tracing::error!(
                    message = "Failed to restore terminal on interrupt",
                    %stream,
                    error = %error
                );
            }
        }

        (self.exit_hook)(INTERRUPT_EXIT_STATUS);
    }

    fn lock_actions(&self) -> std::sync::MutexGuard<'_, HashMap<StdStream, RestoreAction>> {
        self.actions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for InterruptGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut armed: Vec<StdStream> = self.lock_actions().keys().copied().collect();
        armed.sort();
        f.debug_struct("InterruptGuard")
            .field("armed", &armed)
            .field("fired", &self.has_fired())
            .field("installs_os_handler", &self.installs_os_handler)
            .finish_non_exhaustive()
    }
}

#[cfg(unix)]
fn install_os_handler() {
    use signal_hook::{consts::SIGINT, iterator::Signals};

    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let mut signals = match Signals::new([SIGINT]) {
            Ok(signals) => signals,
            Err(error) => {
                tracing::error!(message = "Failed to register SIGINT handler", error = %error);
                return;
            }
        };
        let spawned = std::thread::Builder::new()
            .name("r3bl_raw_term_interrupt".into())
            .spawn(move || {
                if signals.forever().next().is_some() {
                    InterruptGuard::global().trigger();
                }
            });
        if let Err(error) = spawned {
            tracing::error!(message = "Failed to spawn interrupt thread", error = %error);
        }
    });
}

#[cfg(windows)]
fn install_os_handler() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        if let Err(error) = ctrlc::set_handler(|| InterruptGuard::global().trigger()) {
            tracing::error!(message = "Failed to register console control handler", error = %error);
        }
    });
}
