// SPDX-License-Identifier: MIT
//
// Escape sequences used by the viewer.
//
// One function per sequence, each writing into any `impl Write` (in practice
// the frame's `OutputBuffer`, or stdout while entering and leaving the
// session). Callers decide what to emit and when; this module only knows the
// bytes.
//
// Positions are 0-based here. CUP on the wire is 1-based, so `cursor_to`
// adds one to each coordinate.
use std::io::{self, Write};

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// CUP: put the cursor at column `x`, row `y` (both 0-based).
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

/// CUP without parameters: top-left corner.
#[inline]
pub fn cursor_home(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[H")
}

/// DECTCEM off.
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// DECTCEM on.
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Erase ───────────────────────────────────────────────────────────────────

/// ED 2: erase the whole screen. The cursor does not move.
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// EL 0: erase from the cursor to the end of its row.
#[inline]
pub fn clear_line(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[K")
}

// ─── Video ───────────────────────────────────────────────────────────────────

/// SGR 7: inverse video, used for the status bar.
#[inline]
pub fn invert(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[7m")
}

/// SGR 27: inverse video off. Other attributes are left alone.
#[inline]
pub fn uninvert(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[27m")
}

// ─── Alternate screen ────────────────────────────────────────────────────────

/// DEC private mode 1049 on: switch to the alternate screen, saving the
/// normal one.
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

/// DEC private mode 1049 off: back to the normal screen as it was.
#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    type Emit = fn(&mut Vec<u8>) -> io::Result<()>;

    fn bytes(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> Vec<u8> {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        out
    }

    // ── CUP ─────────────────────────────────────────────────────────────

    #[test]
    fn cursor_to_is_one_based_row_then_column() {
        assert_eq!(bytes(|w| cursor_to(w, 0, 0)), b"\x1b[1;1H");
        assert_eq!(bytes(|w| cursor_to(w, 4, 22)), b"\x1b[23;5H");
    }

    #[test]
    fn cursor_to_max_coordinates() {
        assert_eq!(
            bytes(|w| cursor_to(w, u16::MAX, u16::MAX)),
            b"\x1b[65536;65536H"
        );
    }

    // ── Fixed sequences ─────────────────────────────────────────────────

    #[test]
    fn fixed_sequences_are_exact() {
        let table: [(Emit, &[u8]); 9] = [
            (cursor_home, b"\x1b[H"),
            (cursor_hide, b"\x1b[?25l"),
            (cursor_show, b"\x1b[?25h"),
            (clear_screen, b"\x1b[2J"),
            (clear_line, b"\x1b[K"),
            (invert, b"\x1b[7m"),
            (uninvert, b"\x1b[27m"),
            (enter_alt_screen, b"\x1b[?1049h"),
            (exit_alt_screen, b"\x1b[?1049l"),
        ];
        for (emit, expected) in table {
            assert_eq!(bytes(emit), expected);
        }
    }

    #[test]
    fn status_bar_bracket() {
        let out = bytes(|w| {
            cursor_to(w, 0, 22)?;
            invert(w)?;
            w.write_all(b" File: a")?;
            uninvert(w)
        });
        assert_eq!(out, b"\x1b[23;1H\x1b[7m File: a\x1b[27m");
    }
}
