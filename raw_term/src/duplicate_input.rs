// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words EINTR

//! A duplicate of standard input that another thread can close while a read on it is
//! blocked.
//!
//! [`DuplicateInput`] is the reader, [`InputCloser`] is the handle that releases it.
//! After [`InputCloser::close()`] a pending read returns `Ok(0)` (end of stream), and so
//! does every read after it.
//!
//! | Platform | How a blocked read is released                                          |
//! | :------- | :---------------------------------------------------------------------- |
//! | Unix     | the read waits in `poll()` on the duplicate and a wake pipe; `close()`  |
//! |          | writes one byte into the pipe                                           |
//! | Windows  | `close()` cancels the pending I/O on the duplicated handle              |
//!
//! Closing never touches the original stdin descriptor.

use std::{fs::File,
          io::{self, Read},
          sync::{Arc,
                 atomic::{AtomicBool, Ordering}}};

#[derive(Debug)]
struct Shared {
    closed: AtomicBool,
    #[cfg(unix)]
    wake: WakePipe,
}

/// Reader over an owned duplicate of stdin. Dropping it closes the duplicate only.
#[derive(Debug)]
pub struct DuplicateInput {
    file: Arc<File>,
    shared: Arc<Shared>,
}

/// Releases a [`DuplicateInput`] from any thread. Cheap to clone.
#[derive(Debug, Clone)]
pub struct InputCloser {
    shared: Arc<Shared>,
    #[cfg(windows)]
    file: Arc<File>,
}

impl DuplicateInput {
    /// Duplicates the descriptor (handle on Windows) of standard input.
    ///
    /// # Errors
    ///
    /// When the descriptor can't be duplicated, or the wake pipe can't be created.
    pub fn from_stdin() -> io::Result<Self> { Self::new(duplicate_stdin()?) }

    /// Wraps any readable file. Used with pipes and PTY slaves in tests.
    ///
    /// # Errors
    ///
    /// When the wake pipe can't be created (Unix).
    pub fn new(file: File) -> io::Result<Self> {
        Ok(Self {
            file: Arc::new(file),
            shared: Arc::new(Shared {
                closed: AtomicBool::new(false),
                #[cfg(unix)]
                wake: WakePipe::new()?,
            }),
        })
    }

    #[must_use]
    pub fn closer(&self) -> InputCloser {
        InputCloser {
            shared: Arc::clone(&self.shared),
            #[cfg(windows)]
            file: Arc::clone(&self.file),
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool { self.shared.closed.load(Ordering::SeqCst) }
}

impl InputCloser {
    /// Releases a read blocked on the paired [`DuplicateInput`]. Later calls do nothing.
    pub fn close(&self) {
        if self.shared.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::debug!(message = "Closing duplicated input");
        #[cfg(unix)]
        self.shared.wake.wake();
        #[cfg(windows)]
        cancel_pending_read(&self.file);
    }

    #[must_use]
    pub fn is_closed(&self) -> bool { self.shared.closed.load(Ordering::SeqCst) }
}

#[cfg(unix)]
impl Read for DuplicateInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        use rustix::{event::{PollFd, PollFlags, poll},
                     io::Errno};

        loop {
            if self.is_closed() {
                return Ok(0);
            }
            let mut fds = [
                PollFd::new(&*self.file, PollFlags::IN),
                PollFd::new(&self.shared.wake.receiver, PollFlags::IN),
            ];
            match poll(&mut fds, None) {
                Ok(_) => {}
                Err(Errno::INTR) => continue,
                Err(error) => return Err(error.into()),
            }
            if !fds[1].revents().is_empty() {
                return Ok(0);
            }
            if !fds[0].revents().is_empty() {
                break;
            }
        }
        (&*self.file).read(buf)
    }
}

#[cfg(windows)]
impl Read for DuplicateInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.is_closed() {
            return Ok(0);
        }
        match (&*self.file).read(buf) {
            Err(_) if self.is_closed() => Ok(0),
            other => other,
        }
    }
}

/// Both ends of the pipe stay open as long as either the reader or a closer is alive,
/// so dropping a closer never looks like a wake up.
#[cfg(unix)]
#[derive(Debug)]
struct WakePipe {
    receiver: rustix::fd::OwnedFd,
    sender: rustix::fd::OwnedFd,
}

#[cfg(unix)]
impl WakePipe {
    fn new() -> io::Result<Self> {
        let (receiver, sender) = rustix::pipe::pipe()?;
        Ok(Self { receiver, sender })
    }

    fn wake(&self) {
        if let Err(error) = rustix::io::write(&self.sender, &[1]) {
            tracing::warn!(message = "Failed to wake input reader", error = %error);
        }
    }
}

#[cfg(unix)]
fn duplicate_stdin() -> io::Result<File> {
    use std::os::fd::AsFd;
    Ok(File::from(io::stdin().as_fd().try_clone_to_owned()?))
}

#[cfg(windows)]
fn duplicate_stdin() -> io::Result<File> {
    use std::os::windows::io::AsHandle;
    Ok(File::from(io::stdin().as_handle().try_clone_to_owned()?))
}

#[cfg(windows)]
fn cancel_pending_read(file: &File) {
    use std::os::windows::io::AsRawHandle;
    use windows::Win32::{Foundation::HANDLE, System::IO::CancelIoEx};

    // SAFETY: `file` keeps the handle open for the duration of the call.
    if let Err(error) = unsafe { CancelIoEx(HANDLE(file.as_raw_handle()), None) } {
        // Nothing was pending.
        tracing::trace!(message = "No input read to cancel", error = %error);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::{io::Write,
              sync::mpsc,
              thread,
              time::Duration};

    fn pipe_input() -> (DuplicateInput, File) {
        let (receiver, sender) = rustix::pipe::pipe().unwrap();
        let input = DuplicateInput::new(File::from(receiver)).unwrap();
        (input, File::from(sender))
    }

    #[test]
    fn test_reads_data_before_close() {
        let (mut input, mut sender) = pipe_input();
        sender.write_all(b"abc").unwrap();

        let mut buf = [0; 8];
        let count = input.read(&mut buf).unwrap();
        assert_eq!(&buf[..count], b"abc");
    }

    #[test]
    fn test_close_releases_blocked_read() {
        let (mut input, _sender) = pipe_input();
        let closer = input.closer();
        let (tx, rx) = mpsc::channel();

        let reader = thread::spawn(move || {
            let mut buf = [0; 8];
            tx.send(input.read(&mut buf).unwrap()).unwrap();
        });

        // Nothing is written, so the reader stays blocked.
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());

        closer.close();
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 0);
        reader.join().unwrap();
    }

    #[test]
    fn test_reads_after_close_are_end_of_stream() {
        let (mut input, mut sender) = pipe_input();
        sender.write_all(b"ignored").unwrap();
        input.closer().close();

        let mut buf = [0; 8];
        assert_eq!(input.read(&mut buf).unwrap(), 0);
        assert!(input.is_closed());
    }

    #[test]
    fn test_dropping_a_closer_does_not_close() {
        let (mut input, mut sender) = pipe_input();
        let closer = input.closer();
        drop(closer);
        sender.write_all(b"x").unwrap();

        let mut buf = [0; 1];
        assert_eq!(input.read(&mut buf).unwrap(), 1);
        assert!(!input.is_closed());
    }

    #[test]
    fn test_close_is_idempotent() {
        let (input, _sender) = pipe_input();
        let closer = input.closer();
        closer.close();
        closer.clone().close();
        assert!(closer.is_closed());
    }
}
