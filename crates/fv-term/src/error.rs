// SPDX-License-Identifier: MIT
//
// Terminal-layer errors.
//
// Every variant here is fatal for the viewer: the event loop stops, the
// `Terminal` guard restores the tty on drop, and the binary reports the
// error on a working terminal.

use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

/// Errors raised by the terminal layer.
#[derive(Debug, Error)]
pub enum TermError {
    /// The frame buffer could not grow to hold the next frame.
    #[error("frame buffer could not grow: {0}")]
    ResourceExhausted(#[source] TryReserveError),

    /// The keystroke source failed for a reason other than a timeout, or
    /// reached end of input.
    #[error("keyboard input unavailable: {0}")]
    InputUnavailable(#[source] io::Error),

    /// Writing to the terminal or changing its mode failed.
    #[error("terminal I/O failed: {0}")]
    Io(#[source] io::Error),
}

impl From<io::Error> for TermError {
    /// Recover [`TermError::ResourceExhausted`] from an `io::Error` produced
    /// by `OutputBuffer`'s `Write` impl, so `?` on the ANSI helpers keeps
    /// the allocation failure distinguishable from real terminal I/O.
    fn from(err: io::Error) -> Self {
        if err.kind() != io::ErrorKind::OutOfMemory {
            return Self::Io(err);
        }
        match err.into_inner() {
            Some(inner) => match inner.downcast::<TryReserveError>() {
                Ok(reserve) => Self::ResourceExhausted(*reserve),
                Err(other) => Self::Io(io::Error::new(io::ErrorKind::OutOfMemory, other)),
            },
            None => Self::Io(io::Error::from(io::ErrorKind::OutOfMemory)),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn reserve_failure() -> TryReserveError {
        Vec::<u8>::new().try_reserve(usize::MAX).unwrap_err()
    }

    #[test]
    fn plain_io_error_maps_to_io() {
        let err = TermError::from(io::Error::from(io::ErrorKind::BrokenPipe));
        assert!(matches!(err, TermError::Io(_)));
    }

    #[test]
    fn wrapped_reserve_error_maps_to_resource_exhausted() {
        let io_err = io::Error::new(io::ErrorKind::OutOfMemory, reserve_failure());
        let err = TermError::from(io_err);
        assert!(matches!(err, TermError::ResourceExhausted(_)));
    }

    #[test]
    fn bare_out_of_memory_maps_to_io() {
        let err = TermError::from(io::Error::from(io::ErrorKind::OutOfMemory));
        assert!(matches!(err, TermError::Io(_)));
    }

    #[test]
    fn display_mentions_cause() {
        let err = TermError::InputUnavailable(io::Error::other("tty gone"));
        assert!(err.to_string().contains("tty gone"));
    }
}
