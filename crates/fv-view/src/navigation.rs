//! Key interpretation — turns raw key bytes into viewport changes.
//!
//! Keys are single bytes. With no prompt active they are commands:
//!
//! | key       | effect                                   |
//! |-----------|------------------------------------------|
//! | `j` / `k` | scroll down / up one line                |
//! | `l` / `h` | scroll right / left one column           |
//! | `g` / `G` | jump to top / bottom                     |
//! | `q`       | quit                                     |
//! | `0`–`9`   | start a numeric prompt                   |
//! | `/`       | start a search prompt                    |
//! | ESC       | cancel whatever prompt is active         |
//!
//! A numeric prompt collects digits and is finished by a motion key (the
//! count becomes the repeat) or Enter (the count becomes a 1-based line
//! number). A search prompt collects any byte until Enter, which discards it.

use fv_term::event_loop::Action;
use tracing::{debug, trace};

use crate::error::ViewError;
use crate::lines::LineStore;
use crate::viewport::{PromptMode, ViewportState};

/// Escape.
pub const ESC: u8 = 0x1b;

/// Scroll direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// The direction bound to a motion key, if any.
    #[must_use]
    pub const fn from_key(key: u8) -> Option<Self> {
        match key {
            b'k' => Some(Self::Up),
            b'j' => Some(Self::Down),
            b'h' => Some(Self::Left),
            b'l' => Some(Self::Right),
            _ => None,
        }
    }
}

const fn is_enter(key: u8) -> bool {
    key == b'\r' || key == b'\n'
}

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

/// Move the viewport `n` steps in `direction`, clamped to the scroll limits.
///
/// Vertical moves are no-ops when the whole file fits on screen; horizontal
/// moves are no-ops when no line is wider than the content area.
pub fn scroll(state: &mut ViewportState, store: &LineStore, n: usize, direction: Direction) {
    match direction {
        Direction::Up | Direction::Down if !state.scrolls_vertically(store) => {}
        Direction::Left | Direction::Right if !state.scrolls_horizontally(store) => {}
        Direction::Up => {
            let offset = state.vertical_offset().saturating_sub(n);
            state.set_vertical_offset(store, offset);
        }
        Direction::Down => {
            let offset = state.vertical_offset().saturating_add(n);
            state.set_vertical_offset(store, offset);
        }
        Direction::Left => {
            let offset = state.horizontal_offset().saturating_sub(n);
            state.set_horizontal_offset(store, offset);
        }
        Direction::Right => {
            let offset = state.horizontal_offset().saturating_add(n);
            state.set_horizontal_offset(store, offset);
        }
    }
}

/// Scroll so that 1-based line `line` is the first visible line, or as
/// close as the bottom limit allows. Line 0 is treated as line 1.
pub fn jump_to_line(state: &mut ViewportState, store: &LineStore, line: usize) {
    state.set_vertical_offset(store, line.saturating_sub(1));
}

/// Parse prompt text as a decimal count.
///
/// Values too large for `usize` saturate; the scroll limits clamp them
/// anyway.
///
/// # Errors
///
/// Returns [`ViewError::InvalidNumericPrompt`] if `text` is empty or
/// contains anything but ASCII digits.
pub fn parse_count(text: &[u8]) -> Result<usize, ViewError> {
    if text.is_empty() || !text.iter().all(u8::is_ascii_digit) {
        return Err(ViewError::InvalidNumericPrompt);
    }
    Ok(text.iter().fold(0usize, |acc, d| {
        acc.saturating_mul(10).saturating_add(usize::from(d - b'0'))
    }))
}

// ---------------------------------------------------------------------------
// Key dispatch
// ---------------------------------------------------------------------------

/// Interpret one key byte against the current prompt mode.
pub fn handle_key(state: &mut ViewportState, store: &LineStore, key: u8) -> Action {
    if key == ESC {
        state.prompt_mut().clear();
        return Action::Continue;
    }

    match state.prompt().mode() {
        PromptMode::Inactive => command_key(state, store, key),
        PromptMode::Numeric => numeric_key(state, store, key),
        PromptMode::Search => {
            search_key(state, key);
            Action::Continue
        }
    }
}

fn command_key(state: &mut ViewportState, store: &LineStore, key: u8) -> Action {
    if let Some(direction) = Direction::from_key(key) {
        scroll(state, store, 1, direction);
        return Action::Continue;
    }

    match key {
        b'q' => return Action::Quit,
        b'g' => state.set_vertical_offset(store, 0),
        b'G' => state.set_vertical_offset(store, state.max_vertical_offset(store)),
        b'0'..=b'9' => {
            state.prompt_mut().begin(PromptMode::Numeric, key);
        }
        b'/' => {
            state.prompt_mut().begin(PromptMode::Search, key);
        }
        _ => {}
    }
    Action::Continue
}

fn numeric_key(state: &mut ViewportState, store: &LineStore, key: u8) -> Action {
    if key.is_ascii_digit() {
        state.prompt_mut().push(key);
        return Action::Continue;
    }
    if key == b'q' {
        state.prompt_mut().clear();
        return Action::Quit;
    }

    let direction = Direction::from_key(key);
    if direction.is_none() && !is_enter(key) {
        state.prompt_mut().clear();
        return Action::Continue;
    }

    let count = parse_count(state.prompt().text());
    state.prompt_mut().clear();
    let n = match count {
        Ok(n) => n,
        Err(e) => {
            debug!(error = %e, "numeric prompt dropped");
            return Action::Continue;
        }
    };

    trace!(count = n, key, "numeric command");
    match direction {
        Some(direction) => scroll(state, store, n, direction),
        None => jump_to_line(state, store, n),
    }
    Action::Continue
}

fn search_key(state: &mut ViewportState, key: u8) {
    if is_enter(key) {
        // Searching is not implemented; the query is discarded.
        trace!(len = state.prompt().text().len(), "search prompt submitted");
        state.prompt_mut().clear();
    } else {
        state.prompt_mut().push(key);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
