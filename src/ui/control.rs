// src/ui/control.rs

//! Control-file command source.
//!
//! The command to run lives on the first line of a small text file, after a
//! `%` delimiter:
//!
//! ```text
//! % cargo test
//! ```
//!
//! The file is re-read before every run, so editing it changes what runs on
//! the next trigger. Since it normally sits inside the watched root, saving
//! it is itself a trigger.

use std::fs;
use std::path::PathBuf;

use crate::errors::{Result, WatchrunError};
use crate::ui::CommandSource;

#[derive(Debug, Clone)]
pub struct ControlFile {
    path: PathBuf,
}

impl ControlFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Seed (or replace) the control file with `% <command>`.
    pub fn write_command(&self, command: &str) -> Result<()> {
        fs::write(&self.path, format!("% {command}\n")).map_err(|err| {
            WatchrunError::ControlFile(format!(
                "write {}: {err}",
                self.path.display()
            ))
        })
    }
}

impl CommandSource for ControlFile {
    fn read_command_line(&self) -> Result<String> {
        let text = fs::read_to_string(&self.path).map_err(|err| {
            WatchrunError::ControlFile(format!(
                "read {}: {err}",
                self.path.display()
            ))
        })?;
        Ok(parse_command_line(&text))
    }
}

/// Extract the command from the control line: everything on the first line
/// after the first `%`, trimmed. Empty if there is no delimiter.
fn parse_command_line(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or("");
    match first_line.split_once('%') {
        Some((_, after)) => after.trim().to_string(),
        None => String::new(),
    }
}
