// SPDX-License-Identifier: MIT
//
// Terminal session — raw mode and the alternate screen, undone on every exit.
//
// Two layers:
//
//   RawMode   → termios switched to byte-at-a-time input, restored on drop
//   Terminal  → RawMode + alternate screen + hidden cursor, the viewer session
//
// `unsafe` is confined to the libc calls (tcgetattr/tcsetattr, TIOCGWINSZ,
// isatty, and the raw write in the panic hook).
#![allow(unsafe_code)]
//
// A panic while the session is active must not strand the user in raw mode
// on a blank alternate screen. The panic hook therefore writes a fixed
// restore sequence straight to fd 1, without taking the stdout lock (the
// panic may have happened mid-flush), and reinstates the termios saved in
// `SAVED_TERMIOS`.

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use tracing::debug;

use crate::ansi;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Width in columns.
    pub cols: u16,
    /// Height in rows.
    pub rows: u16,
}

impl Size {
    /// Used when the size cannot be queried (tests, pipes).
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };
}

/// Current size of the terminal on stdout, if it is one.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws = unsafe { std::mem::zeroed::<libc::winsize>() };
    let rc = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };

    (rc == 0 && ws.ws_col != 0 && ws.ws_row != 0).then_some(Size {
        cols: ws.ws_col,
        rows: ws.ws_row,
    })
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Whether both stdin and stdout are terminals.
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) == 1 && libc::isatty(libc::STDOUT_FILENO) == 1 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Raw mode ───────────────────────────────────────────────────────────────

/// Copy of the pre-raw termios for the panic hook, which cannot reach the
/// `RawMode` value.
#[cfg(unix)]
static SAVED_TERMIOS: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Byte-at-a-time input on stdin: no echo, no line discipline, no signals
/// from ^C/^Z, no CR/NL translation, no output post-processing, and reads
/// that return immediately (VMIN=0, VTIME=0).
///
/// The previous settings come back when the value is dropped.
pub struct RawMode {
    #[cfg(unix)]
    saved: libc::termios,
}

impl RawMode {
    /// Switch stdin to raw mode. Returns `Ok(None)` when stdin is not a
    /// terminal, where there is nothing to switch.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the termios cannot be read or written.
    #[cfg(unix)]
    pub fn enable() -> io::Result<Option<Self>> {
        if unsafe { libc::isatty(libc::STDIN_FILENO) } != 1 {
            return Ok(None);
        }

        let mut saved = unsafe { std::mem::zeroed::<libc::termios>() };
        if unsafe { libc::tcgetattr(libc::STDIN_FILENO, &raw mut saved) } != 0 {
            return Err(io::Error::last_os_error());
        }

        let mut raw = saved;
        raw.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
        raw.c_oflag &= !libc::OPOST;
        raw.c_cflag |= libc::CS8;
        raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);
        raw.c_cc[libc::VMIN] = 0;
        raw.c_cc[libc::VTIME] = 0;

        set_termios(&raw)?;
        if let Ok(mut slot) = SAVED_TERMIOS.lock() {
            *slot = Some(saved);
        }
        Ok(Some(Self { saved }))
    }

    /// Raw mode is not supported here; always `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Never fails.
    #[cfg(not(unix))]
    pub fn enable() -> io::Result<Option<Self>> {
        Ok(None)
    }

    /// Put the saved termios back.
    ///
    /// # Errors
    ///
    /// Returns the OS error from `tcsetattr`.
    pub fn restore(self) -> io::Result<()> {
        let result = self.reset();
        std::mem::forget(self);
        result
    }

    #[cfg(unix)]
    fn reset(&self) -> io::Result<()> {
        if let Ok(mut slot) = SAVED_TERMIOS.lock() {
            *slot = None;
        }
        set_termios(&self.saved)
    }

    #[cfg(not(unix))]
    fn reset(&self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = self.reset();
    }
}

#[cfg(unix)]
fn set_termios(t: &libc::termios) -> io::Result<()> {
    if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, t) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

// ─── Panic hook ─────────────────────────────────────────────────────────────

/// Undo inverse video, show the cursor, leave the alternate screen. Leaving
/// the alternate screen goes last so the shell's screen comes back clean.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[27m\x1b[?25h\x1b[?1049l";

static PANIC_HOOK: Once = Once::new();

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();
            previous(info);
        }));
    });
}

fn emergency_restore() {
    #[cfg(unix)]
    {
        unsafe {
            let _ = libc::write(
                libc::STDOUT_FILENO,
                EMERGENCY_RESTORE.as_ptr().cast(),
                EMERGENCY_RESTORE.len(),
            );
        }
        let saved = SAVED_TERMIOS.lock().ok().and_then(|mut slot| slot.take());
        if let Some(saved) = saved {
            let _ = set_termios(&saved);
        }
    }

    #[cfg(not(unix))]
    {
        let mut out = io::stdout();
        let _ = out.write_all(EMERGENCY_RESTORE);
        let _ = out.flush();
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// The viewer's terminal session.
///
/// [`enter`](Self::enter) switches to raw mode and the alternate screen and
/// hides the cursor; [`leave`](Self::leave) (or dropping the value, or a
/// panic) puts everything back.
///
/// ```no_run
/// use fv_term::terminal::Terminal;
///
/// let mut term = Terminal::new()?;
/// term.enter()?;
/// // draw frames ...
/// term.leave()?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Terminal {
    raw: Option<RawMode>,
    size: Size,
    active: bool,
}

impl Terminal {
    /// A session handle sized to the current terminal ([`Size::FALLBACK`]
    /// when there is none). Nothing is changed until [`enter`](Self::enter).
    ///
    /// # Errors
    ///
    /// Never fails today; the signature leaves room for a failing size
    /// query.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            raw: None,
            size: get_size().unwrap_or(Size::FALLBACK),
            active: false,
        })
    }

    /// Last known size.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Query the size again (after SIGWINCH). Keeps the old value if the
    /// query fails.
    pub fn refresh_size(&mut self) -> Size {
        self.size = get_size().unwrap_or(self.size);
        self.size
    }

    /// Whether the session is entered.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Raw mode, alternate screen, hidden cursor, cleared screen. Does
    /// nothing if already entered.
    ///
    /// # Errors
    ///
    /// Returns an error if termios or the terminal write fails.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }

        install_panic_hook();
        self.raw = RawMode::enable()?;

        let mut out = io::stdout().lock();
        ansi::enter_alt_screen(&mut out)?;
        ansi::cursor_hide(&mut out)?;
        ansi::clear_screen(&mut out)?;
        out.flush()?;

        self.active = true;
        debug!(
            cols = self.size.cols,
            rows = self.size.rows,
            raw = self.raw.is_some(),
            "terminal session entered"
        );
        Ok(())
    }

    /// Show the cursor, return to the normal screen, restore termios. Does
    /// nothing if not entered.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal write or termios restore fails.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        {
            let mut out = io::stdout().lock();
            ansi::uninvert(&mut out)?;
            ansi::cursor_show(&mut out)?;
            ansi::exit_alt_screen(&mut out)?;
            out.flush()?;
        }

        if let Some(raw) = self.raw.take() {
            raw.restore()?;
        }
        debug!("terminal session left");
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_80_by_24() {
        assert_eq!(Size::FALLBACK, Size { cols: 80, rows: 24 });
    }

    #[test]
    fn queried_size_is_never_zero() {
        if let Some(size) = get_size() {
            assert!(size.cols > 0 && size.rows > 0);
        }
    }

    #[test]
    fn emergency_restore_order() {
        let seq = std::str::from_utf8(EMERGENCY_RESTORE).unwrap();
        let uninvert = seq.find("\x1b[27m").unwrap();
        let show = seq.find("\x1b[?25h").unwrap();
        let alt = seq.find("\x1b[?1049l").unwrap();
        assert!(uninvert < alt && show < alt);
        assert!(seq.ends_with("\x1b[?1049l"));
    }

    #[test]
    fn new_terminal_is_inactive_and_sized() {
        let term = Terminal::new().unwrap();
        assert!(!term.is_active());
        assert!(term.size().cols > 0);
        assert!(term.size().rows > 0);
    }

    #[test]
    fn refresh_keeps_a_usable_size() {
        let mut term = Terminal::new().unwrap();
        let before = term.size();
        let after = term.refresh_size();
        assert_eq!(after, term.size());
        if get_size().is_none() {
            assert_eq!(after, before);
        }
    }

    #[test]
    fn leave_before_enter_is_a_no_op() {
        let mut term = Terminal::new().unwrap();
        term.leave().unwrap();
        term.leave().unwrap();
        assert!(!term.is_active());
    }

    #[test]
    fn session_round_trip() {
        let mut term = Terminal::new().unwrap();
        term.enter().unwrap();
        term.enter().unwrap();
        assert!(term.is_active());
        term.leave().unwrap();
        assert!(!term.is_active());
    }
}
