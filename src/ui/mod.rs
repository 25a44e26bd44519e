// src/ui/mod.rs

//! Output sink and command source seams.
//!
//! The supervisor core doesn't care where output goes or where the command
//! line comes from; production wires in a terminal and a control file,
//! tests wire in the in-memory doubles from [`mock`].

use crate::errors::Result;

pub mod control;
pub mod mock;
pub mod terminal;

/// Where streamed run output is displayed.
///
/// Callers hold the supervisor lock and have already done the generation
/// check before any of these is invoked, so implementations can stay dumb.
pub trait Sink: Send {
    /// Clear displayed content and return the cursor to the start.
    fn reset(&mut self);

    /// Append raw output bytes.
    fn write(&mut self, bytes: &[u8]);

    /// One-line status/error notice, e.g. `(exit status: 1)`.
    fn notice(&mut self, text: &str) {
        self.write(text.as_bytes());
        self.write(b"\n");
    }
}

/// Source of the user-editable command line.
///
/// Read fresh at the start of every run; a read failure is structural and
/// fatal to the whole program.
pub trait CommandSource: Send + Sync {
    fn read_command_line(&self) -> Result<String>;
}

pub use control::ControlFile;
pub use terminal::TerminalSink;
