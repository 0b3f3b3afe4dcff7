//! Errors raised by the viewer core.
//!
//! Only loading errors ever reach the user. [`ViewError::IndexOutOfRange`]
//! guards [`LineStore::line_at`](crate::lines::LineStore::line_at), and
//! [`ViewError::InvalidNumericPrompt`] is absorbed by the navigation engine,
//! which clears the prompt and leaves the viewport where it was.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Viewer core errors.
#[derive(Debug, Error)]
pub enum ViewError {
    /// A line index past the end of the store.
    #[error("line index {index} out of range (file has {count} lines)")]
    IndexOutOfRange { index: usize, count: usize },

    /// Accumulated prompt text is not a plain decimal number.
    #[error("numeric prompt does not hold a decimal number")]
    InvalidNumericPrompt,

    /// The path exists but is not a regular file (directory, device, ...).
    #[error("{} is not a regular file", .0.display())]
    NotRegularFile(PathBuf),

    /// The file could not be inspected or read.
    #[error("cannot read {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
