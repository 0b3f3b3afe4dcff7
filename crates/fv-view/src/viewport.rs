//! Viewport state — where the viewer is looking.
//!
//! [`ViewportState`] is the single mutable object of the viewer. It holds the
//! terminal dimensions, the scroll offsets, the gutter toggle, and the
//! [`Prompt`] being typed on the bottom line. The navigation engine mutates
//! it; the renderer only reads it.
//!
//! # Layout
//!
//! ```text
//! ┌──────┬─────────────────────────┐
//! │gutter│ content                 │ ← usable_rows = rows - RESERVED_ROWS
//! ├──────┴─────────────────────────┤
//! │ (spacer)                       │
//! │ File: notes.txt [1/240]        │ ← status bar, inverse video
//! │ 12                             │ ← prompt line
//! └────────────────────────────────┘
//! ```
//!
//! Both the renderer and the offset ceilings derive from the same
//! [`RESERVED_ROWS`], so the last line of the file is exactly the last
//! content row when scrolled to the bottom.

use fv_term::terminal::Size;

use crate::lines::LineStore;

/// Rows not available for file content: spacer, status bar, prompt line.
pub const RESERVED_ROWS: usize = 3;

/// Columns the gutter adds around the line number: `" "` before, `" | "` after.
pub const GUTTER_DECORATION: usize = 4;

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

/// What the bottom-line prompt is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptMode {
    /// No prompt. Keys are commands.
    #[default]
    Inactive,
    /// A repeat count or line number.
    Numeric,
    /// Literal search text after `/`.
    Search,
}

/// The bottom-line input buffer.
///
/// The mode and the text change together: the prompt is either inactive and
/// empty, or active with at least its first byte. The text never grows past
/// the capacity given at construction (the terminal width).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Prompt {
    mode: PromptMode,
    text: Vec<u8>,
    capacity: usize,
}

impl Prompt {
    /// An inactive prompt that will hold at most `capacity` bytes.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            mode: PromptMode::Inactive,
            text: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Current mode.
    #[inline]
    #[must_use]
    pub const fn mode(&self) -> PromptMode {
        self.mode
    }

    /// Accumulated bytes, including the leading `/` of a search.
    #[inline]
    #[must_use]
    pub fn text(&self) -> &[u8] {
        &self.text
    }

    /// Whether nothing has been typed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Maximum number of bytes the prompt holds.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Activate the prompt in `mode` with `first` as its first byte.
    ///
    /// Returns `false` (and stays inactive) if the capacity is zero.
    pub fn begin(&mut self, mode: PromptMode, first: u8) -> bool {
        self.clear();
        if mode == PromptMode::Inactive || self.capacity == 0 {
            return false;
        }
        self.mode = mode;
        self.text.push(first);
        true
    }

    /// Append a byte to an active prompt. Returns `false` if the prompt is
    /// inactive or full; the byte is dropped.
    pub fn push(&mut self, byte: u8) -> bool {
        if self.mode == PromptMode::Inactive || self.text.len() >= self.capacity {
            return false;
        }
        self.text.push(byte);
        true
    }

    /// Back to inactive and empty.
    pub fn clear(&mut self) {
        self.mode = PromptMode::Inactive;
        self.text.clear();
    }

    /// Clear and change the capacity (after a resize).
    pub fn reset_capacity(&mut self, capacity: usize) {
        self.clear();
        self.capacity = capacity;
    }
}

// ---------------------------------------------------------------------------
// ViewportState
// ---------------------------------------------------------------------------

/// Navigation state of the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewportState {
    terminal_rows: u16,
    terminal_cols: u16,
    vertical_offset: usize,
    horizontal_offset: usize,
    gutter_enabled: bool,
    prompt: Prompt,
}

impl ViewportState {
    /// Fresh state at the top-left of the file with no prompt.
    #[must_use]
    pub fn new(size: Size, gutter_enabled: bool) -> Self {
        Self {
            terminal_rows: size.rows,
            terminal_cols: size.cols,
            vertical_offset: 0,
            horizontal_offset: 0,
            gutter_enabled,
            prompt: Prompt::new(usize::from(size.cols)),
        }
    }

    // -- Accessors ----------------------------------------------------------

    /// Terminal height in rows.
    #[inline]
    #[must_use]
    pub const fn terminal_rows(&self) -> u16 {
        self.terminal_rows
    }

    /// Terminal width in columns.
    #[inline]
    #[must_use]
    pub const fn terminal_cols(&self) -> u16 {
        self.terminal_cols
    }

    /// Index of the first visible line.
    #[inline]
    #[must_use]
    pub const fn vertical_offset(&self) -> usize {
        self.vertical_offset
    }

    /// Index of the first visible column.
    #[inline]
    #[must_use]
    pub const fn horizontal_offset(&self) -> usize {
        self.horizontal_offset
    }

    /// Whether the line-number gutter is drawn.
    #[inline]
    #[must_use]
    pub const fn gutter_enabled(&self) -> bool {
        self.gutter_enabled
    }

    /// The bottom-line prompt.
    #[inline]
    #[must_use]
    pub const fn prompt(&self) -> &Prompt {
        &self.prompt
    }

    pub(crate) const fn prompt_mut(&mut self) -> &mut Prompt {
        &mut self.prompt
    }

    // -- Layout -------------------------------------------------------------

    /// Rows available for file content.
    #[inline]
    #[must_use]
    pub fn usable_rows(&self) -> usize {
        usize::from(self.terminal_rows).saturating_sub(RESERVED_ROWS)
    }

    /// Width of the gutter for `store`, 0 when the gutter is off.
    #[inline]
    #[must_use]
    pub const fn gutter_width(&self, store: &LineStore) -> usize {
        if self.gutter_enabled {
            store.line_number_digit_width() + GUTTER_DECORATION
        } else {
            0
        }
    }

    /// Columns available for file content next to the gutter.
    #[inline]
    #[must_use]
    pub fn usable_cols(&self, store: &LineStore) -> usize {
        usize::from(self.terminal_cols).saturating_sub(self.gutter_width(store))
    }

    /// Largest allowed vertical offset: the last line sits on the last
    /// content row.
    #[inline]
    #[must_use]
    pub fn max_vertical_offset(&self, store: &LineStore) -> usize {
        store.line_count().saturating_sub(self.usable_rows())
    }

    /// Whether the file is taller than the content area.
    #[inline]
    #[must_use]
    pub fn scrolls_vertically(&self, store: &LineStore) -> bool {
        store.line_count() > self.usable_rows()
    }

    /// Whether some line is wider than the content area.
    #[inline]
    #[must_use]
    pub fn scrolls_horizontally(&self, store: &LineStore) -> bool {
        store.max_display_length() > self.usable_cols(store)
    }

    // -- Mutation -----------------------------------------------------------

    /// Set the vertical offset, clamped to `[0, max_vertical_offset]`.
    pub fn set_vertical_offset(&mut self, store: &LineStore, offset: usize) {
        self.vertical_offset = offset.min(self.max_vertical_offset(store));
    }

    /// Set the horizontal offset, clamped to `[0, max_display_length]`, or
    /// to 0 when nothing overflows.
    pub fn set_horizontal_offset(&mut self, store: &LineStore, offset: usize) {
        self.horizontal_offset = if self.scrolls_horizontally(store) {
            offset.min(store.max_display_length())
        } else {
            0
        };
    }

    /// Re-apply both offset ceilings (after the layout changed).
    pub fn clamp(&mut self, store: &LineStore) {
        self.set_vertical_offset(store, self.vertical_offset);
        self.set_horizontal_offset(store, self.horizontal_offset);
    }

    /// Adopt a new terminal size: the prompt is dropped (its capacity follows
    /// the new width) and both offsets are re-clamped.
    pub fn resize(&mut self, store: &LineStore, size: Size) {
        self.terminal_rows = size.rows;
        self.terminal_cols = size.cols;
        self.prompt.reset_capacity(usize::from(size.cols));
        self.clamp(store);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
