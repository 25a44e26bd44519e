// src/ui/terminal.rs

//! Terminal sink: streamed run output goes straight to stdout.

use std::io::{self, Write};

use tracing::debug;

use crate::ui::Sink;

/// Clear screen + cursor home.
const RESET_SEQ: &[u8] = b"\x1b[2J\x1b[H";

/// Writes run output to stdout; `reset` clears the screen so each run
/// starts on an empty display.
///
/// Write errors are logged and swallowed — if the terminal goes away there
/// is nobody left to show an error to, and run supervision should carry on
/// regardless.
#[derive(Debug)]
pub struct TerminalSink {
    out: io::Stdout,
}

impl TerminalSink {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }

    fn emit(&mut self, bytes: &[u8]) {
        let mut handle = self.out.lock();
        if let Err(err) = handle.write_all(bytes).and_then(|()| handle.flush()) {
            debug!(%err, "stdout write failed; dropping output");
        }
    }
}

impl Default for TerminalSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for TerminalSink {
    fn reset(&mut self) {
        self.emit(RESET_SEQ);
    }

    fn write(&mut self, bytes: &[u8]) {
        self.emit(bytes);
    }
}
