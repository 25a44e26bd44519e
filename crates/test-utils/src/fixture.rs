//! Ready-wired supervisor fixtures.

use std::path::PathBuf;
use std::sync::Arc;

use watchrun::engine::RunSupervisor;
use watchrun::ui::mock::{FixedCommands, MemorySink};

/// A supervisor wired to in-memory doubles and a plain `sh` interpreter,
/// plus the handles tests use to steer and observe it.
pub struct SupervisorFixture {
    pub supervisor: Arc<RunSupervisor>,
    pub sink: MemorySink,
    pub commands: FixedCommands,
}

/// Build a supervisor whose runs execute `command` under `/bin/sh`.
///
/// Using `sh` instead of the production `rc` keeps the tests independent of
/// a plan9port installation; the runner only ever passes `-c <line>`, which
/// both shells accept.
pub fn supervisor_with_command(command: &str) -> SupervisorFixture {
    let sink = MemorySink::new();
    let commands = FixedCommands::new(command);
    let supervisor = RunSupervisor::new(
        Box::new(sink.clone()),
        Box::new(commands.clone()),
        Some(PathBuf::from("/bin/sh")),
    );
    SupervisorFixture {
        supervisor,
        sink,
        commands,
    }
}
