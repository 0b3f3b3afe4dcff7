//! Frame rendering — the whole screen, every frame.
//!
//! [`render`] writes one complete frame into an [`OutputBuffer`]; the event
//! loop sends it with a single write. There is no diffing: every content
//! row is cleared and redrawn, then the status bar and the prompt line.
//!
//! The cursor is hidden while drawing and left on the prompt line, just
//! after the typed text.

use std::io::Write;

use fv_term::TermError;
use fv_term::ansi;
use fv_term::output::OutputBuffer;

use crate::lines::LineStore;
use crate::viewport::{GUTTER_DECORATION, ViewportState};

/// Longest file name shown in the status bar before it is shortened.
pub const STATUS_NAME_MAX: usize = 32;

/// Marker put in front of a shortened file name.
const ELLIPSIS: &str = "...";

/// Render one frame into `out` and return the frame length in bytes.
///
/// # Errors
///
/// Returns [`TermError::ResourceExhausted`] if the buffer cannot grow.
pub fn render(
    out: &mut OutputBuffer,
    store: &LineStore,
    state: &ViewportState,
    filename: &str,
) -> Result<usize, TermError> {
    let cols = usize::from(state.terminal_cols());
    let rows = state.terminal_rows();

    ansi::cursor_hide(out)?;
    ansi::cursor_home(out)?;

    draw_content(out, store, state, cols)?;
    // spacer
    ansi::clear_line(out)?;

    let status_row = rows.saturating_sub(2);
    ansi::cursor_to(out, 0, status_row)?;
    ansi::invert(out)?;
    let status = status_line(filename, state.vertical_offset(), store.line_count(), cols);
    out.append(status.as_bytes())?;
    ansi::uninvert(out)?;

    let prompt_row = rows.saturating_sub(1);
    let prompt = state.prompt().text();
    ansi::cursor_to(out, 0, prompt_row)?;
    out.append(prompt)?;
    ansi::clear_line(out)?;

    let prompt_end = u16::try_from(prompt.len()).unwrap_or(u16::MAX);
    ansi::cursor_to(out, prompt_end, prompt_row)?;
    ansi::cursor_show(out)?;

    Ok(out.len())
}

fn draw_content(
    out: &mut OutputBuffer,
    store: &LineStore,
    state: &ViewportState,
    cols: usize,
) -> Result<(), TermError> {
    let digit_width = state
        .gutter_enabled()
        .then(|| store.line_number_digit_width());

    for row in 0..state.usable_rows() {
        ansi::clear_line(out)?;

        let index = state.vertical_offset().saturating_add(row);
        if let Ok(line) = store.line_at(index) {
            let used = match digit_width {
                Some(width) => draw_gutter(out, index + 1, width, cols)?,
                None => 0,
            };
            out.append(line.visible(state.horizontal_offset(), cols - used))?;
        }

        out.append(b"\r\n")?;
    }
    Ok(())
}

/// Write the gutter for line `number`, cut to `cols`. Returns its width.
fn draw_gutter(
    out: &mut OutputBuffer,
    number: usize,
    width: usize,
    cols: usize,
) -> Result<usize, TermError> {
    let full = width + GUTTER_DECORATION;
    if full <= cols {
        write!(out, " {number:>width$} | ")?;
        return Ok(full);
    }
    let gutter = format!(" {number:>width$} | ");
    out.append(&gutter.as_bytes()[..cols])?;
    Ok(cols)
}

// ---------------------------------------------------------------------------
// Status bar
// ---------------------------------------------------------------------------

/// The status bar text, exactly `cols` characters wide.
///
/// `<line>` is the 1-based number of the first visible line (0 for an empty
/// file).
#[must_use]
pub fn status_line(filename: &str, vertical_offset: usize, total: usize, cols: usize) -> String {
    let line = vertical_offset.saturating_add(1).min(total);
    let mut status = format!(" File: {} [{line}/{total}]", shorten_name(filename));
    fit_to_width(&mut status, cols);
    status
}

/// Make a file name safe to print and keep only its tail if it is long.
fn shorten_name(name: &str) -> String {
    let clean: String = name
        .chars()
        .map(|c| if c.is_control() { '?' } else { c })
        .collect();

    let count = clean.chars().count();
    if count <= STATUS_NAME_MAX {
        return clean;
    }
    let tail: String = clean.chars().skip(count - STATUS_NAME_MAX).collect();
    format!("{ELLIPSIS}{tail}")
}

fn fit_to_width(s: &mut String, cols: usize) {
    let width = s.chars().count();
    if width > cols {
        if let Some((cut, _)) = s.char_indices().nth(cols) {
            s.truncate(cut);
        }
    } else {
        s.extend(std::iter::repeat_n(' ', cols - width));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
