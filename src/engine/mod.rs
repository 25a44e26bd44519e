// src/engine/mod.rs

//! Run supervision engine.
//!
//! This module ties together:
//! - the trigger queue (coalescing "something changed" signals into runs)
//! - the run supervisor (generation-tagged lifecycle of the single current
//!   run, cancellation of superseded runs, guarded sink access)
//!
//! Process spawning and termination live in [`crate::exec`]; the engine only
//! ever sees opaque signal targets.

/// Monotonically increasing id for one logical run attempt.
///
/// Assigned once per consumed trigger and never reused; any externally
/// visible effect of a run is discarded unless its generation still equals
/// the supervisor's current one.
pub type Generation = u64;

/// Events flowing into the main loop from the watcher, stdin, and Ctrl-C.
#[derive(Debug, Clone)]
pub enum SupervisorEvent {
    /// Something under the watched root changed; coalesced into the
    /// trigger queue.
    Changed,
    /// Terminate the current run, keep watching.
    Kill,
    /// Send the current run's process group a diagnostic-dump signal.
    Quit,
    /// Dismissal: exit the program cleanly.
    Del,
    /// The notification source itself broke; fatal.
    WatchFailed(String),
}

pub mod queue;
pub mod supervisor;

pub use queue::{TriggerHandle, TriggerQueue};
pub use supervisor::RunSupervisor;
