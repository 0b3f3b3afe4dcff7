// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop — the heartbeat of the viewer.
//
// One thread, one loop, strictly alternating:
//
//   1. apply a pending resize (if SIGWINCH fired since the last iteration)
//   2. render a full frame into the reusable OutputBuffer
//   3. write the frame with a single write
//   4. wait (bounded) for one key byte and hand it to the application
//
// The key wait is a poll with a short timeout, so an idle viewer re-renders
// a few times a second. That bounded wait is also what makes a resize show
// up without any asynchronous signal delivery into the application: the
// signal handler only flips an `AtomicBool`, and step 1 picks it up.
//
// Cleanup: the `Terminal` guard is left explicitly on every return path of
// `run`, and restored by `Drop` (or the panic hook) otherwise.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, trace};

use crate::error::TermError;
use crate::output::OutputBuffer;
use crate::reader::{KeySource, POLL_TIMEOUT_MS, StdinKeys};
use crate::terminal::{Size, Terminal};

// ─── SIGWINCH ────────────────────────────────────────────────────────────────

/// Global flag set by the SIGWINCH handler. Checked each loop iteration.
static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Install a signal handler for SIGWINCH (terminal resize).
///
/// The handler simply sets [`SIGWINCH_RECEIVED`]. Writing to an atomic is
/// async-signal-safe.
#[cfg(unix)]
fn install_sigwinch_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {
    // No-op on non-unix platforms.
}

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application tells the event loop to do after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Keep running.
    Continue,
    /// Exit the event loop cleanly. No further frame is rendered.
    Quit,
}

/// Application interface for the event loop.
///
/// Each iteration calls, in order: [`on_resize`](App::on_resize) if the
/// terminal changed size, [`render`](App::render), then
/// [`handle_key`](App::handle_key) if a byte arrived.
pub trait App {
    /// Interpret one raw key byte.
    fn handle_key(&mut self, key: u8) -> Action;

    /// The terminal now has `size`. Called before the next render.
    fn on_resize(&mut self, _size: Size) {}

    /// Build one complete frame into `out` and return its length in bytes.
    ///
    /// `out` is empty on entry. The loop writes it with a single write.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::ResourceExhausted`] if the frame cannot be
    /// buffered.
    fn render(&self, out: &mut OutputBuffer) -> Result<usize, TermError>;
}

// ─── Loop Config ─────────────────────────────────────────────────────────────

/// Configuration for the event loop timing.
#[derive(Debug, Clone, Copy)]
pub struct LoopConfig {
    /// How long one key wait may block (milliseconds). This is also the
    /// worst-case delay between a resize and the redraw that follows it.
    pub poll_timeout_ms: i32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            poll_timeout_ms: POLL_TIMEOUT_MS,
        }
    }
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// The terminal event loop.
///
/// Owns the terminal and the reusable frame buffer. Call
/// [`run`](Self::run) to enter the loop. It returns when the application
/// signals [`Action::Quit`] or a fatal error occurs.
pub struct EventLoop {
    terminal: Terminal,
    frame: OutputBuffer,
    config: LoopConfig,
}

impl EventLoop {
    /// Create a new event loop with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be initialized.
    pub fn new() -> io::Result<Self> {
        Self::with_config(LoopConfig::default())
    }

    /// Create a new event loop with custom timing configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be initialized.
    pub fn with_config(config: LoopConfig) -> io::Result<Self> {
        Ok(Self {
            terminal: Terminal::new()?,
            frame: OutputBuffer::new(),
            config,
        })
    }

    /// The current terminal size.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Run the event loop until the application returns [`Action::Quit`].
    ///
    /// Enters viewer mode, installs the SIGWINCH handler, runs
    /// [`drive`](Self::drive) against stdin/stdout, and restores the
    /// terminal on the way out, whether the loop ended cleanly or not.
    ///
    /// # Errors
    ///
    /// Returns the loop's fatal error, or an error from leaving the terminal.
    pub fn run(&mut self, app: &mut impl App) -> Result<(), TermError> {
        self.terminal.enter()?;
        install_sigwinch_handler();

        let mut keys = StdinKeys::new(self.config.poll_timeout_ms);
        let terminal = &mut self.terminal;
        let result = Self::drive(app, &mut keys, &mut io::stdout(), &mut self.frame, || {
            SIGWINCH_RECEIVED
                .swap(false, Ordering::Relaxed)
                .then(|| terminal.refresh_size())
        });

        if let Err(ref e) = result {
            debug!(error = %e, "event loop stopped");
        }

        self.terminal.leave()?;
        result
    }

    /// The loop body, independent of the real terminal.
    ///
    /// `poll_resize` is asked once per iteration and returns the new size if
    /// the terminal was resized since the previous call.
    ///
    /// # Errors
    ///
    /// Returns the first error from rendering, writing, or the key source.
    pub fn drive<A, K, W, R>(
        app: &mut A,
        keys: &mut K,
        out: &mut W,
        frame: &mut OutputBuffer,
        mut poll_resize: R,
    ) -> Result<(), TermError>
    where
        A: App + ?Sized,
        K: KeySource + ?Sized,
        W: Write + ?Sized,
        R: FnMut() -> Option<Size>,
    {
        loop {
            if let Some(size) = poll_resize() {
                debug!(cols = size.cols, rows = size.rows, "terminal resized");
                app.on_resize(size);
            }

            frame.reset();
            let len = app.render(frame)?;
            trace!(bytes = len, "frame rendered");
            out.write_all(frame.finalize())?;
            out.flush()?;

            if let Some(key) = keys.read_byte()? {
                trace!(key, "key");
                if app.handle_key(key) == Action::Quit {
                    return Ok(());
                }
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Replays a fixed script; `None` entries simulate poll timeouts.
    struct Script(VecDeque<Option<u8>>);

    impl Script {
        fn keys(bytes: &[u8]) -> Self {
            Self(bytes.iter().copied().map(Some).collect())
        }
    }

    impl KeySource for Script {
        fn read_byte(&mut self) -> Result<Option<u8>, TermError> {
            self.0.pop_front().ok_or_else(|| {
                TermError::InputUnavailable(io::Error::from(io::ErrorKind::UnexpectedEof))
            })
        }
    }

    /// Counts frames and keys; quits on `q`.
    #[derive(Default)]
    struct Recorder {
        keys: Vec<u8>,
        sizes: Vec<Size>,
        frames: std::cell::Cell<usize>,
    }

    impl App for Recorder {
        fn handle_key(&mut self, key: u8) -> Action {
            self.keys.push(key);
            if key == b'q' { Action::Quit } else { Action::Continue }
        }

        fn on_resize(&mut self, size: Size) {
            self.sizes.push(size);
        }

        fn render(&self, out: &mut OutputBuffer) -> Result<usize, TermError> {
            self.frames.set(self.frames.get() + 1);
            out.append(b"<frame>")?;
            Ok(out.len())
        }
    }

    fn drive(app: &mut Recorder, keys: &mut Script) -> (Result<(), TermError>, Vec<u8>) {
        let mut out = Vec::new();
        let mut frame = OutputBuffer::new();
        let result = EventLoop::drive(app, keys, &mut out, &mut frame, || None);
        (result, out)
    }

    // ── LoopConfig ──────────────────────────────────────────────

    #[test]
    fn default_config_uses_poll_timeout() {
        assert_eq!(LoopConfig::default().poll_timeout_ms, POLL_TIMEOUT_MS);
    }

    // ── Action ──────────────────────────────────────────────────

    #[test]
    fn action_equality() {
        assert_eq!(Action::Continue, Action::Continue);
        assert_ne!(Action::Continue, Action::Quit);
    }

    // ── drive ───────────────────────────────────────────────────

    #[test]
    fn quit_stops_without_another_frame() {
        let mut app = Recorder::default();
        let (result, out) = drive(&mut app, &mut Script::keys(b"jjq"));
        result.unwrap();
        assert_eq!(app.keys, b"jjq");
        assert_eq!(app.frames.get(), 3);
        assert_eq!(out, b"<frame><frame><frame>");
    }

    #[test]
    fn quit_as_first_key_renders_once() {
        let mut app = Recorder::default();
        let (result, _) = drive(&mut app, &mut Script::keys(b"q"));
        result.unwrap();
        assert_eq!(app.frames.get(), 1);
    }

    #[test]
    fn timeouts_rerender_unconditionally() {
        let mut app = Recorder::default();
        let mut keys = Script(VecDeque::from([None, None, Some(b'q')]));
        let (result, _) = drive(&mut app, &mut keys);
        result.unwrap();
        assert_eq!(app.frames.get(), 3);
        assert_eq!(app.keys, b"q");
    }

    #[test]
    fn input_failure_is_fatal() {
        let mut app = Recorder::default();
        let (result, _) = drive(&mut app, &mut Script::keys(b"jj"));
        assert!(matches!(result, Err(TermError::InputUnavailable(_))));
        assert_eq!(app.keys, b"jj");
    }

    #[test]
    fn resize_is_applied_before_render() {
        struct SizedFrames {
            size: Size,
        }
        impl App for SizedFrames {
            fn handle_key(&mut self, key: u8) -> Action {
                if key == b'q' { Action::Quit } else { Action::Continue }
            }
            fn on_resize(&mut self, size: Size) {
                self.size = size;
            }
            fn render(&self, out: &mut OutputBuffer) -> Result<usize, TermError> {
                write!(out, "{}x{};", self.size.cols, self.size.rows)?;
                Ok(out.len())
            }
        }

        let mut app = SizedFrames {
            size: Size { cols: 80, rows: 24 },
        };
        let mut pending = VecDeque::from([None, Some(Size { cols: 100, rows: 40 })]);
        let mut out = Vec::new();
        let mut frame = OutputBuffer::new();
        EventLoop::drive(&mut app, &mut Script::keys(b"jq"), &mut out, &mut frame, || {
            pending.pop_front().flatten()
        })
        .unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "80x24;100x40;");
        assert_eq!(app.size, Size { cols: 100, rows: 40 });
    }

    #[test]
    fn resize_reaches_on_resize() {
        let mut app = Recorder::default();
        let mut fired = false;
        let mut out = Vec::new();
        let mut frame = OutputBuffer::new();
        EventLoop::drive(&mut app, &mut Script::keys(b"q"), &mut out, &mut frame, || {
            if fired {
                None
            } else {
                fired = true;
                Some(Size { cols: 10, rows: 5 })
            }
        })
        .unwrap();
        assert_eq!(app.sizes, vec![Size { cols: 10, rows: 5 }]);
    }

    #[test]
    fn write_failure_is_reported() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::from(io::ErrorKind::BrokenPipe))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        let mut app = Recorder::default();
        let mut frame = OutputBuffer::new();
        let result =
            EventLoop::drive(&mut app, &mut Script::keys(b"q"), &mut Broken, &mut frame, || None);
        assert!(matches!(result, Err(TermError::Io(_))));
        assert!(app.keys.is_empty());
    }

    // ── SIGWINCH flag ──────────────────────────────────────────

    #[test]
    fn sigwinch_flag_swap() {
        SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
        let was = SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed);
        assert!(was);
        assert!(!SIGWINCH_RECEIVED.load(Ordering::Relaxed));
    }

    // ── EventLoop construction ─────────────────────────────────

    #[test]
    fn event_loop_new_has_nonzero_size() {
        let event_loop = EventLoop::new().unwrap();
        let size = event_loop.size();
        assert!(size.cols > 0);
        assert!(size.rows > 0);
    }
}
