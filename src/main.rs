// SPDX-License-Identifier: MIT
//
// fv — a small terminal file viewer.
//
// This is the binary that wires the two crates together:
//
//   fv-term → raw mode, key polling, frame output, the event loop
//   fv-view → line store, viewport, navigation, frame rendering
//
// The file is loaded completely before the terminal is touched, so a bad
// path fails with a plain message and the shell is never disturbed. After
// that, `Viewer` (fv-view's implementation of fv-term's `App`) runs until
// `q`.
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ gutter + content             │  ← rows - 3
//   │ (spacer)                     │
//   ├──────────────────────────────┤
//   │ status line (INVERSE)        │  ← 1 row
//   ├──────────────────────────────┤
//   │ prompt line                  │  ← 1 row
//   └──────────────────────────────┘

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result as AnyhowResult, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use fv_term::event_loop::EventLoop;
use fv_term::terminal;
use fv_view::lines::LineStore;
use fv_view::options::DEFAULT_TAB_WIDTH;
use fv_view::{Viewer, ViewerOptions};

/// Environment variable holding the log filter (`EnvFilter` syntax).
const LOG_ENV: &str = "FV_LOG";

/// Filter used when `FV_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "info";

// ─── Command line ───────────────────────────────────────────────────────────

/// A small terminal file viewer
#[derive(Parser, Debug)]
#[command(name = "fv")]
#[command(about = "A small terminal file viewer", long_about = None)]
#[command(version)]
struct Args {
    /// File to view. `file.txt:120` opens it scrolled to line 120.
    #[arg(value_name = "FILE[:LINE]")]
    file: String,

    /// Hide the line-number gutter
    #[arg(short = 'n', long)]
    no_line_numbers: bool,

    /// Tab stop width used when expanding tabs
    #[arg(
        long,
        value_name = "N",
        default_value_t = DEFAULT_TAB_WIDTH,
        value_parser = clap::value_parser!(u8).range(1..)
    )]
    tab_width: u8,

    /// Write diagnostics to this file (filter with FV_LOG, default "info")
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

impl Args {
    fn options(&self) -> ViewerOptions {
        ViewerOptions::new(!self.no_line_numbers).with_tab_width(self.tab_width)
    }
}

/// A file path with an optional 1-based line to open at.
#[derive(Debug, PartialEq, Eq)]
struct FileLocation {
    path: PathBuf,
    line: Option<usize>,
}

/// Split `file:LINE` into path and line.
///
/// If the whole argument names an existing file it is used as-is, so files
/// with a colon in their name still open.
fn parse_file_location(input: &str) -> FileLocation {
    let full_path = PathBuf::from(input);
    if full_path.is_file() {
        return FileLocation {
            path: full_path,
            line: None,
        };
    }

    if let Some((path, line)) = input.rsplit_once(':') {
        let digits_only = !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit());
        if !path.is_empty() && digits_only {
            if let Ok(line) = line.parse() {
                return FileLocation {
                    path: PathBuf::from(path),
                    line: Some(line),
                };
            }
        }
    }

    FileLocation {
        path: full_path,
        line: None,
    }
}

// ─── Logging ────────────────────────────────────────────────────────────────

/// Send `tracing` output to `path`. Nothing is ever logged to the terminal.
fn init_logging(path: &Path) -> AnyhowResult<()> {
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(filter)
        .try_init()
        .context("cannot install log subscriber")
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() -> AnyhowResult<()> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let location = parse_file_location(&args.file);
    let options = args.options();
    let store = LineStore::from_file(&location.path, options.tab_width)?;
    info!(
        path = %location.path.display(),
        lines = store.line_count(),
        longest = store.max_display_length(),
        "viewing file"
    );

    if !terminal::is_tty() {
        bail!("stdin and stdout must be a terminal");
    }

    let mut event_loop = EventLoop::new().context("failed to initialize terminal")?;
    let mut viewer = Viewer::new(
        store,
        location.path.display().to_string(),
        event_loop.size(),
        options,
    );
    if let Some(line) = location.line {
        viewer.jump_to_line(line);
    }

    event_loop.run(&mut viewer).context("viewer stopped")?;
    info!("viewer closed");
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────────────
