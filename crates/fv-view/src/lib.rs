//! # fv-view — Viewer core for fv
//!
//! Everything between the file on disk and the bytes of a frame:
//!
//! - **[`lines`]** — `LineStore`, the file split into normalised lines
//! - **[`viewport`]** — `ViewportState`, offsets, layout and the prompt
//! - **[`navigation`]** — key bytes to scrolls, jumps and prompt edits
//! - **[`render`]** — one full frame into an `OutputBuffer`
//! - **[`viewer`]** — `Viewer`, the event-loop application tying them together
//! - **[`options`]** — startup options
//!
//! The terminal itself (raw mode, key polling, the loop) lives in `fv-term`.

pub mod error;
pub mod lines;
pub mod navigation;
pub mod options;
pub mod render;
pub mod viewer;
pub mod viewport;

pub use error::ViewError;
pub use options::ViewerOptions;
pub use viewer::Viewer;
