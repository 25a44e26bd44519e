// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`shell`] locates the `rc` interpreter.
//! - [`runner`] executes one generation of the command with
//!   `tokio::process::Command`, streaming merged output through the
//!   supervisor's generation guard.
//! - [`terminate`] implements the escalating stop protocol behind the
//!   [`SignalTarget`](terminate::SignalTarget) capability trait.

pub(crate) mod runner;
pub mod shell;
pub mod terminate;

pub use terminate::{SignalTarget, StopSignal};
