//! Termination signal handling.
//!
//! The actual signal handler is kept to the bare minimum the POSIX spec
//! allows inside a signal context: a single `write(2)` of one byte into a
//! self-pipe. A regular thread blocks reading that pipe and forwards a
//! typed [`Signal`] onto a `crossbeam_channel`, giving the rest of the
//! daemon a single-writer/single-reader channel to block on, the same shape
//! as a process-wide flag but without a spin loop.

use std::os::unix::io::RawFd;
use std::sync::atomic::{AtomicI32, Ordering};

use crossbeam_channel as chan;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to create self-pipe: {0}")]
    Pipe(std::io::Error),
    #[error("failed to install handler for {signal:?}: {source}")]
    Install {
        signal: Signal,
        source: std::io::Error,
    },
}

/// A termination-relevant operating system signal.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Signal {
    /// `SIGTERM`.
    Terminate,
    /// `SIGINT`.
    Interrupt,
    /// `SIGHUP`.
    Hangup,
}

impl Signal {
    fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            libc::SIGTERM => Some(Signal::Terminate),
            libc::SIGINT => Some(Signal::Interrupt),
            libc::SIGHUP => Some(Signal::Hangup),
            _ => None,
        }
    }

    fn as_raw(self) -> i32 {
        match self {
            Signal::Terminate => libc::SIGTERM,
            Signal::Interrupt => libc::SIGINT,
            Signal::Hangup => libc::SIGHUP,
        }
    }
}

static PIPE_WRITE_FD: AtomicI32 = AtomicI32::new(-1);

extern "C" fn handle_signal(raw: i32) {
    let fd = PIPE_WRITE_FD.load(Ordering::Relaxed);
    if fd < 0 {
        return;
    }
    let byte = raw as u8;
    unsafe {
        libc::write(fd, &byte as *const u8 as *const libc::c_void, 1);
    }
}

/// Installs handlers for `Terminate`, `Interrupt`, and `Hangup`, and spawns
/// a thread that forwards each delivery onto the returned receiver.
pub fn install() -> Result<chan::Receiver<Signal>, Error> {
    let mut fds = [0i32; 2];
    if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
        return Err(Error::Pipe(std::io::Error::last_os_error()));
    }
    let (read_fd, write_fd): (RawFd, RawFd) = (fds[0], fds[1]);
    PIPE_WRITE_FD.store(write_fd, Ordering::SeqCst);

    for signal in [Signal::Terminate, Signal::Interrupt, Signal::Hangup] {
        let rc = unsafe { libc::signal(signal.as_raw(), handle_signal as usize) };
        if rc == libc::SIG_ERR {
            return Err(Error::Install {
                signal,
                source: std::io::Error::last_os_error(),
            });
        }
    }

    let (tx, rx) = chan::unbounded();
    std::thread::Builder::new()
        .name("bigsi-signals".to_string())
        .spawn(move || loop {
            let mut byte = 0u8;
            let n = unsafe { libc::read(read_fd, &mut byte as *mut u8 as *mut libc::c_void, 1) };
            if n <= 0 {
                return;
            }
            if let Some(signal) = Signal::from_raw(byte as i32) {
                if tx.send(signal).is_err() {
                    return;
                }
            }
        })
        .expect("failed to spawn signal-forwarding thread");

    Ok(rx)
}
