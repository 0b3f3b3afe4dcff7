// SPDX-License-Identifier: MIT
//
// fv-term — Terminal layer for fv.
//
// Everything the viewer needs from the terminal and nothing else: raw mode
// and the alternate screen behind an RAII guard, the handful of ANSI
// sequences a pager uses, a growable buffer so each frame goes out in one
// write, a polling one-byte key source, and the single-threaded loop that
// ties them together.
//
// No crossterm: direct termios and hand-written escape sequences. Every byte
// sent to the terminal is accounted for.

pub mod ansi;
pub mod error;
pub mod event_loop;
pub mod output;
pub mod reader;
pub mod terminal;

pub use error::TermError;
