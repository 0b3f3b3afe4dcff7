//! Line store — the file, split into immutable display lines.
//!
//! A [`LineStore`] is built once when the file is loaded and never changes
//! afterwards. Lines live in one contiguous `Vec`, so any line is reachable
//! in O(1), which random jumps and page-sized scrolls rely on.
//!
//! # Normalisation
//!
//! Lines are stored ready to be written to the terminal:
//!
//! - line terminators (`\n`, `\r\n`, stray trailing `\r`) are stripped
//! - tabs are expanded with spaces to the next tab stop
//! - other control bytes (C0 and DEL) become `?`, so the file can never
//!   smuggle escape sequences into the frame
//!
//! After this, one byte is one column and a line's display length is its
//! byte length. Wide and combining characters are not measured.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::ViewError;

/// Replacement for control bytes that must not reach the terminal.
const CONTROL_REPLACEMENT: u8 = b'?';

// ---------------------------------------------------------------------------
// Line
// ---------------------------------------------------------------------------

/// One immutable line of the file, terminator removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    text: Box<[u8]>,
}

impl Line {
    /// Wrap already-normalised bytes.
    #[must_use]
    pub fn new(text: impl Into<Box<[u8]>>) -> Self {
        Self { text: text.into() }
    }

    /// The bytes of the line.
    #[inline]
    #[must_use]
    pub fn text(&self) -> &[u8] {
        &self.text
    }

    /// Width of the line in terminal columns.
    #[inline]
    #[must_use]
    pub fn display_length(&self) -> usize {
        self.text.len()
    }

    /// The visible part of the line when scrolled to `offset` and limited to
    /// `width` columns. Empty when the line ends before `offset`.
    #[must_use]
    pub fn visible(&self, offset: usize, width: usize) -> &[u8] {
        if offset >= self.text.len() {
            return &[];
        }
        let end = offset.saturating_add(width).min(self.text.len());
        &self.text[offset..end]
    }
}

// ---------------------------------------------------------------------------
// LineStore
// ---------------------------------------------------------------------------

/// Number of decimal digits in `n`. `digits(0)` is 1.
#[must_use]
pub const fn digits(n: usize) -> usize {
    if n == 0 { 1 } else { n.ilog10() as usize + 1 }
}

/// The loaded file: lines plus metadata precomputed for layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineStore {
    lines: Vec<Line>,
    max_display_length: usize,
    line_number_digit_width: usize,
}

impl LineStore {
    /// Build a store from lines, computing the layout metadata.
    #[must_use]
    pub fn new(lines: Vec<Line>) -> Self {
        let max_display_length = lines.iter().map(Line::display_length).max().unwrap_or(0);
        let line_number_digit_width = digits(lines.len());
        Self {
            lines,
            max_display_length,
            line_number_digit_width,
        }
    }

    /// Split raw file contents into normalised lines.
    ///
    /// A trailing newline does not start an extra empty line, and empty
    /// input yields an empty store.
    #[must_use]
    pub fn from_bytes(bytes: &[u8], tab_width: u8) -> Self {
        let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
        if bytes.is_empty() {
            return Self::new(Vec::new());
        }
        let lines = body
            .split(|&b| b == b'\n')
            .map(|raw| Line::new(normalize(strip_terminator(raw), tab_width)))
            .collect();
        Self::new(lines)
    }

    /// Load a regular file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::NotRegularFile`] for directories, devices and
    /// the like, and [`ViewError::Load`] if the file cannot be read.
    pub fn from_file(path: &Path, tab_width: u8) -> Result<Self, ViewError> {
        let load_err = |source| ViewError::Load {
            path: path.to_path_buf(),
            source,
        };

        let meta = fs::metadata(path).map_err(load_err)?;
        if !meta.is_file() {
            return Err(ViewError::NotRegularFile(path.to_path_buf()));
        }

        let bytes = fs::read(path).map_err(load_err)?;
        let store = Self::from_bytes(&bytes, tab_width);
        debug!(
            path = %path.display(),
            bytes = bytes.len(),
            lines = store.line_count(),
            "file loaded"
        );
        Ok(store)
    }

    // -- Queries ------------------------------------------------------------

    /// Number of lines.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Whether the file has no lines at all.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The line at `index` (0-based).
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::IndexOutOfRange`] if `index >= line_count()`.
    pub fn line_at(&self, index: usize) -> Result<&Line, ViewError> {
        self.lines.get(index).ok_or(ViewError::IndexOutOfRange {
            index,
            count: self.lines.len(),
        })
    }

    /// Display length of the longest line, 0 for an empty file.
    #[inline]
    #[must_use]
    pub const fn max_display_length(&self) -> usize {
        self.max_display_length
    }

    /// Digits needed for the largest line number.
    #[inline]
    #[must_use]
    pub const fn line_number_digit_width(&self) -> usize {
        self.line_number_digit_width
    }
}

// ---------------------------------------------------------------------------
// Normalisation helpers
// ---------------------------------------------------------------------------

/// Drop trailing `\r` / `\n` bytes.
fn strip_terminator(mut raw: &[u8]) -> &[u8] {
    while let [rest @ .., b'\r' | b'\n'] = raw {
        raw = rest;
    }
    raw
}

/// Expand tabs and neutralise control bytes.
fn normalize(raw: &[u8], tab_width: u8) -> Vec<u8> {
    let tab_w = usize::from(tab_width.max(1));
    let mut out = Vec::with_capacity(raw.len());

    for &b in raw {
        match b {
            b'\t' => {
                let next_stop = (out.len() / tab_w + 1) * tab_w;
                out.resize(next_stop, b' ');
            }
            0x00..=0x1f | 0x7f => out.push(CONTROL_REPLACEMENT),
            _ => out.push(b),
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn texts(store: &LineStore) -> Vec<String> {
        (0..store.line_count())
            .map(|i| String::from_utf8_lossy(store.line_at(i).unwrap().text()).into_owned())
            .collect()
    }

    // -- digits ---------------------------------------------------------------

    #[test]
    fn digits_of_small_numbers() {
        assert_eq!(digits(0), 1);
        assert_eq!(digits(1), 1);
        assert_eq!(digits(9), 1);
        assert_eq!(digits(10), 2);
        assert_eq!(digits(99), 2);
        assert_eq!(digits(100), 3);
    }

    #[test]
    fn digits_of_large_numbers() {
        assert_eq!(digits(10_000), 5);
        assert_eq!(digits(usize::MAX), usize::MAX.to_string().len());
    }

    // -- Line -----------------------------------------------------------------

    #[test]
    fn line_display_length_is_byte_length() {
        assert_eq!(Line::new(b"hello".to_vec()).display_length(), 5);
        assert_eq!(Line::new(Vec::new()).display_length(), 0);
    }

    #[test]
    fn visible_slices_from_offset() {
        let line = Line::new(b"abcdefgh".to_vec());
        assert_eq!(line.visible(0, 3), b"abc");
        assert_eq!(line.visible(2, 3), b"cde");
        assert_eq!(line.visible(6, 10), b"gh");
    }

    #[test]
    fn visible_past_end_is_empty() {
        let line = Line::new(b"abc".to_vec());
        assert!(line.visible(3, 10).is_empty());
        assert!(line.visible(100, 10).is_empty());
    }

    #[test]
    fn visible_zero_width_is_empty() {
        let line = Line::new(b"abc".to_vec());
        assert!(line.visible(0, 0).is_empty());
    }

    #[test]
    fn visible_huge_width_does_not_overflow() {
        let line = Line::new(b"abc".to_vec());
        assert_eq!(line.visible(1, usize::MAX), b"bc");
    }

    // -- Splitting ------------------------------------------------------------

    #[test]
    fn empty_input_has_no_lines() {
        let store = LineStore::from_bytes(b"", 4);
        assert!(store.is_empty());
        assert_eq!(store.line_count(), 0);
        assert_eq!(store.max_display_length(), 0);
        assert_eq!(store.line_number_digit_width(), 1);
    }

    #[test]
    fn lone_newline_is_one_empty_line() {
        let store = LineStore::from_bytes(b"\n", 4);
        assert_eq!(texts(&store), vec![""]);
    }

    #[test]
    fn trailing_newline_adds_no_line() {
        let store = LineStore::from_bytes(b"one\ntwo\n", 4);
        assert_eq!(texts(&store), vec!["one", "two"]);
    }

    #[test]
    fn missing_trailing_newline_keeps_last_line() {
        let store = LineStore::from_bytes(b"one\ntwo", 4);
        assert_eq!(texts(&store), vec!["one", "two"]);
    }

    #[test]
    fn blank_lines_are_kept() {
        let store = LineStore::from_bytes(b"a\n\n\nb\n", 4);
        assert_eq!(store.line_count(), 4);
        assert_eq!(store.line_at(1).unwrap().display_length(), 0);
    }

    #[test]
    fn crlf_terminators_are_stripped() {
        let store = LineStore::from_bytes(b"dos\r\nline\r\n", 4);
        assert_eq!(texts(&store), vec!["dos", "line"]);
    }

    #[test]
    fn interior_carriage_return_is_neutralised() {
        let store = LineStore::from_bytes(b"a\rb\n", 4);
        assert_eq!(texts(&store), vec!["a?b"]);
    }

    // -- Normalisation --------------------------------------------------------

    #[test]
    fn tabs_expand_to_next_stop() {
        let store = LineStore::from_bytes(b"\tx\nab\tc\nabcd\te\n", 4);
        assert_eq!(
            texts(&store),
            vec!["    x", "ab  c", "abcd    e"]
        );
    }

    #[test]
    fn tab_width_zero_behaves_as_one() {
        let store = LineStore::from_bytes(b"a\tb\n", 0);
        assert_eq!(texts(&store), vec!["a b"]);
    }

    #[test]
    fn escape_bytes_cannot_reach_the_terminal() {
        let store = LineStore::from_bytes(b"\x1b[2Jboom\x7f\n", 4);
        assert_eq!(texts(&store), vec!["?[2Jboom?"]);
    }

    #[test]
    fn utf8_bytes_pass_through() {
        let store = LineStore::from_bytes("café\n".as_bytes(), 4);
        assert_eq!(store.line_at(0).unwrap().text(), "café".as_bytes());
    }

    // -- Metadata -------------------------------------------------------------

    #[test]
    fn metadata_tracks_longest_line_and_digits() {
        let text: String = (1..=120).map(|i| format!("{}\n", "x".repeat(i % 37))).collect();
        let store = LineStore::from_bytes(text.as_bytes(), 4);
        assert_eq!(store.line_count(), 120);
        assert_eq!(store.max_display_length(), 36);
        assert_eq!(store.line_number_digit_width(), 3);
    }

    #[test]
    fn new_computes_metadata() {
        let store = LineStore::new(vec![Line::new(b"ab".to_vec()), Line::new(b"abcde".to_vec())]);
        assert_eq!(store.max_display_length(), 5);
        assert_eq!(store.line_number_digit_width(), 1);
    }

    #[test]
    fn line_at_out_of_range() {
        let store = LineStore::from_bytes(b"only\n", 4);
        let err = store.line_at(1).unwrap_err();
        assert!(matches!(err, ViewError::IndexOutOfRange { index: 1, count: 1 }));
    }

    // -- File loading ---------------------------------------------------------

    #[test]
    fn from_file_reads_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"first\nsecond\n").unwrap();
        let store = LineStore::from_file(file.path(), 4).unwrap();
        assert_eq!(texts(&store), vec!["first", "second"]);
    }

    #[test]
    fn from_file_missing_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LineStore::from_file(&dir.path().join("nope.txt"), 4).unwrap_err();
        assert!(matches!(err, ViewError::Load { .. }));
    }

    #[test]
    fn from_file_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = LineStore::from_file(dir.path(), 4).unwrap_err();
        assert!(matches!(err, ViewError::NotRegularFile(_)));
    }
}
