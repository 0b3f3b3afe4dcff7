//! Viewer options.
//!
//! There is no configuration file: options come from the command line and
//! are fixed for the lifetime of the viewer.

/// Default tab stop width, in columns.
pub const DEFAULT_TAB_WIDTH: u8 = 4;

/// Display options chosen at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewerOptions {
    /// Draw the line-number gutter.
    pub line_numbers: bool,

    /// Tab stop width used when loading the file (minimum 1).
    pub tab_width: u8,
}

impl ViewerOptions {
    /// Options with the given gutter setting and default tab width.
    #[must_use]
    pub const fn new(line_numbers: bool) -> Self {
        Self {
            line_numbers,
            tab_width: DEFAULT_TAB_WIDTH,
        }
    }

    /// Replace the tab width, clamped to at least 1.
    #[must_use]
    pub fn with_tab_width(mut self, width: u8) -> Self {
        self.tab_width = width.max(1);
        self
    }
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_shows_line_numbers() {
        let opts = ViewerOptions::default();
        assert!(opts.line_numbers);
        assert_eq!(opts.tab_width, DEFAULT_TAB_WIDTH);
    }

    #[test]
    fn tab_width_is_at_least_one() {
        assert_eq!(ViewerOptions::new(false).with_tab_width(0).tab_width, 1);
        assert_eq!(ViewerOptions::new(false).with_tab_width(8).tab_width, 8);
    }
}
