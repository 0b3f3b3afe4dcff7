// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Key source — one byte at a time from the terminal, never blocking for long.
//
// The viewer is single-threaded: every loop iteration renders a frame, then
// asks the key source for at most one byte. `StdinKeys` waits on stdin with
// `poll()` for a short timeout, so an idle viewer still wakes up regularly
// and a terminal resize becomes visible within one timeout.
//
// Timeouts, EAGAIN and EINTR all mean "no key this time". Anything else,
// including end of input, is `TermError::InputUnavailable`: with stdin gone
// the viewer can never be quit by a keystroke, so it must stop.

use std::io;

use crate::error::TermError;

/// Default poll timeout in milliseconds.
pub const POLL_TIMEOUT_MS: i32 = 100;

/// A source of raw keystroke bytes.
pub trait KeySource {
    /// Return the next byte if one arrives within the source's timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::InputUnavailable`] when the source is broken or
    /// exhausted.
    fn read_byte(&mut self) -> Result<Option<u8>, TermError>;
}

/// Keystrokes read from stdin with a `poll()` timeout.
#[derive(Debug, Clone, Copy)]
pub struct StdinKeys {
    timeout_ms: i32,
}

impl StdinKeys {
    /// Key source with the given poll timeout in milliseconds.
    #[must_use]
    pub const fn new(timeout_ms: i32) -> Self {
        Self { timeout_ms }
    }

    /// Current poll timeout in milliseconds.
    #[must_use]
    pub const fn timeout_ms(&self) -> i32 {
        self.timeout_ms
    }
}

impl Default for StdinKeys {
    fn default() -> Self {
        Self::new(POLL_TIMEOUT_MS)
    }
}

/// Whether `err` only means "try again later".
fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
    )
}

#[cfg(unix)]
impl KeySource for StdinKeys {
    fn read_byte(&mut self) -> Result<Option<u8>, TermError> {
        use std::os::unix::io::AsRawFd;

        let fd = io::stdin().as_raw_fd();

        let ready = unsafe {
            let mut pfd = libc::pollfd {
                fd,
                events: libc::POLLIN,
                revents: 0,
            };
            libc::poll(&raw mut pfd, 1, self.timeout_ms)
        };

        if ready == 0 {
            return Ok(None);
        }
        if ready < 0 {
            let err = io::Error::last_os_error();
            return if is_transient(&err) {
                Ok(None)
            } else {
                Err(TermError::InputUnavailable(err))
            };
        }

        let mut byte = 0u8;
        let n = unsafe { libc::read(fd, (&raw mut byte).cast(), 1) };

        match n {
            1 => Ok(Some(byte)),
            0 => Err(TermError::InputUnavailable(io::Error::from(
                io::ErrorKind::UnexpectedEof,
            ))),
            _ => {
                let err = io::Error::last_os_error();
                if is_transient(&err) {
                    Ok(None)
                } else {
                    Err(TermError::InputUnavailable(err))
                }
            }
        }
    }
}

/// Non-unix fallback: a blocking one-byte read with no timeout.
#[cfg(not(unix))]
impl KeySource for StdinKeys {
    fn read_byte(&mut self) -> Result<Option<u8>, TermError> {
        use std::io::Read;

        let mut byte = [0u8; 1];
        match io::stdin().lock().read(&mut byte) {
            Ok(1) => Ok(Some(byte[0])),
            Ok(_) => Err(TermError::InputUnavailable(io::Error::from(
                io::ErrorKind::UnexpectedEof,
            ))),
            Err(e) if is_transient(&e) => Ok(None),
            Err(e) => Err(TermError::InputUnavailable(e)),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
