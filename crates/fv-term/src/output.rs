// SPDX-License-Identifier: MIT
//
// Output buffering.
//
// OutputBuffer accumulates all ANSI bytes of a frame in memory so the entire
// frame can be written in a single write() call. The terminal never sees a
// half-drawn screen, which is what keeps the viewer flicker-free.
//
// The buffer is reused across frames: `reset()` drops the contents but keeps
// the capacity, so after the first few frames rendering allocates nothing.
// Growth goes through `try_reserve` so an allocation failure surfaces as
// `TermError::ResourceExhausted` instead of aborting mid-frame.

use std::io::{self, Write};

use crate::error::TermError;

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// Initial capacity of a fresh buffer.
pub const INITIAL_CAPACITY: usize = 1024;

/// A growable byte buffer that holds one frame for a single `write()`.
///
/// Capacity doubles whenever an append does not fit, so appends are
/// amortised O(1).
#[derive(Debug)]
pub struct OutputBuffer {
    buf: Vec<u8>,
}

impl OutputBuffer {
    /// Create an empty buffer with [`INITIAL_CAPACITY`] bytes reserved.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(INITIAL_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Bytes currently reserved.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Append `bytes`, growing the buffer geometrically if needed.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::ResourceExhausted`] if the allocator refuses to
    /// grow the buffer. The buffer is left unchanged in that case.
    pub fn append(&mut self, bytes: &[u8]) -> Result<(), TermError> {
        self.grow_for(bytes.len())
            .map_err(TermError::ResourceExhausted)?;
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// The accumulated frame, ready for one write.
    #[inline]
    #[must_use]
    pub fn finalize(&self) -> &[u8] {
        &self.buf
    }

    /// Drop the contents for reuse (keeps allocated capacity).
    #[inline]
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// Write the accumulated frame to `w` in one call and reset the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }

    /// Make room for `additional` more bytes, doubling capacity.
    fn grow_for(&mut self, additional: usize) -> Result<(), std::collections::TryReserveError> {
        let free = self.buf.capacity() - self.buf.len();
        if free >= additional {
            return Ok(());
        }
        let needed = self.buf.len().saturating_add(additional);
        let target = self
            .buf
            .capacity()
            .max(INITIAL_CAPACITY)
            .saturating_mul(2)
            .max(needed);
        self.buf.try_reserve_exact(target - self.buf.len())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.grow_for(buf.len())
            .map_err(|e| io::Error::new(io::ErrorKind::OutOfMemory, e))?;
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Intentionally a no-op. Real flushing via flush_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
