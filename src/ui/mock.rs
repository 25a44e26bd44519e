// src/ui/mock.rs

//! In-memory doubles for the sink and command source.
//!
//! Shipped outside `#[cfg(test)]` so both unit tests and the integration
//! tests under `tests/` can share them.

use std::sync::{Arc, Mutex};

use crate::errors::{Result, WatchrunError};
use crate::ui::{CommandSource, Sink};

#[derive(Debug, Default)]
struct MemorySinkInner {
    buf: Vec<u8>,
    resets: usize,
}

/// A [`Sink`] that accumulates bytes for assertions.
///
/// Clones share the same buffer, so a test can keep one handle while the
/// supervisor owns another.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<MemorySinkInner>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes written since the last reset.
    pub fn contents(&self) -> Vec<u8> {
        self.inner.lock().unwrap().buf.clone()
    }

    /// Contents as (lossy) UTF-8, for readable assertions.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }

    /// How many times the display was reset.
    pub fn resets(&self) -> usize {
        self.inner.lock().unwrap().resets
    }
}

impl Sink for MemorySink {
    fn reset(&mut self) {
        let mut inner = self.inner.lock().unwrap();
        inner.buf.clear();
        inner.resets += 1;
    }

    fn write(&mut self, bytes: &[u8]) {
        self.inner.lock().unwrap().buf.extend_from_slice(bytes);
    }
}

/// A [`CommandSource`] returning a command set by the test, with a switch
/// to simulate the control file becoming unreadable.
#[derive(Debug, Clone, Default)]
pub struct FixedCommands {
    line: Arc<Mutex<Option<String>>>,
}

impl FixedCommands {
    pub fn new(line: impl Into<String>) -> Self {
        Self {
            line: Arc::new(Mutex::new(Some(line.into()))),
        }
    }

    /// Change the command returned for subsequent runs.
    pub fn set(&self, line: impl Into<String>) {
        *self.line.lock().unwrap() = Some(line.into());
    }

    /// Make every future read fail, as if the control file vanished.
    pub fn break_source(&self) {
        *self.line.lock().unwrap() = None;
    }
}

impl CommandSource for FixedCommands {
    fn read_command_line(&self) -> Result<String> {
        self.line
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| WatchrunError::ControlFile("command source broken".into()))
    }
}
