//! The viewer application.
//!
//! [`Viewer`] owns the loaded file and the viewport and plugs them into the
//! terminal event loop: keys go to the navigation engine, resizes to
//! [`ViewportState::resize`], and every frame comes from [`render`].

use fv_term::TermError;
use fv_term::event_loop::{Action, App};
use fv_term::output::OutputBuffer;
use fv_term::terminal::Size;

use crate::lines::LineStore;
use crate::navigation;
use crate::options::ViewerOptions;
use crate::render::render;
use crate::viewport::ViewportState;

/// A file being viewed.
#[derive(Debug)]
pub struct Viewer {
    store: LineStore,
    state: ViewportState,
    filename: String,
}

impl Viewer {
    /// View `store` in a terminal of `size`. `filename` is what the status
    /// bar shows.
    #[must_use]
    pub fn new(
        store: LineStore,
        filename: impl Into<String>,
        size: Size,
        options: ViewerOptions,
    ) -> Self {
        Self {
            state: ViewportState::new(size, options.line_numbers),
            store,
            filename: filename.into(),
        }
    }

    /// Scroll so that 1-based `line` is at the top (clamped).
    pub fn jump_to_line(&mut self, line: usize) {
        navigation::jump_to_line(&mut self.state, &self.store, line);
    }

    /// The loaded file.
    #[inline]
    #[must_use]
    pub const fn store(&self) -> &LineStore {
        &self.store
    }

    /// The current viewport.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> &ViewportState {
        &self.state
    }

    /// The name shown in the status bar.
    #[inline]
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }
}

impl App for Viewer {
    fn handle_key(&mut self, key: u8) -> Action {
        navigation::handle_key(&mut self.state, &self.store, key)
    }

    fn on_resize(&mut self, size: Size) {
        self.state.resize(&self.store, size);
    }

    fn render(&self, out: &mut OutputBuffer) -> Result<usize, TermError> {
        render(out, &self.store, &self.state, &self.filename)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
