// src/engine/supervisor.rs

//! The run supervisor: owns the generation counter and the single active
//! run, and is the only place allowed to touch the output sink.

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::terminate::{self, SignalTarget};
use crate::exec::{runner, shell};
use crate::ui::{CommandSource, Sink};

use super::Generation;

/// The current run, as far as the supervisor is concerned: just enough to
/// terminate it when it is superseded, killed, or asked to dump state.
struct ActiveRun {
    generation: Generation,
    target: Arc<dyn SignalTarget>,
}

/// Everything guarded by the supervisor lock.
///
/// The sink lives inside the lock so that a generation check and the write
/// it guards are one atomic step; otherwise a stale runner could interleave
/// output with a fresh run's.
struct State {
    generation: Generation,
    active: Option<ActiveRun>,
    kill_requested: bool,
    sink: Box<dyn Sink>,
}

/// Supervises repeated execution of the control-file command.
///
/// One instance per watched directory. All mutation of shared run state
/// goes through [`State`] under a single mutex; runners spawned by
/// [`on_trigger`](Self::on_trigger) only reach the sink and the active-run
/// slot through the generation-guarded methods below.
pub struct RunSupervisor {
    state: Mutex<State>,
    commands: Box<dyn CommandSource>,
    shell_override: Option<PathBuf>,
}

/// Outcome of offering a freshly spawned process to the supervisor.
pub(crate) enum Admission {
    /// The run is still current; its signal target is now the active run.
    Published,
    /// Superseded or killed between spawn and publication. The caller must
    /// terminate the process itself; nothing was made visible.
    Stale,
}

impl RunSupervisor {
    pub fn new(
        sink: Box<dyn Sink>,
        commands: Box<dyn CommandSource>,
        shell_override: Option<PathBuf>,
    ) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                generation: 0,
                active: None,
                kill_requested: false,
                sink,
            }),
            commands,
            shell_override,
        })
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("supervisor state lock poisoned")
    }

    /// Consume one trigger: supersede the previous run, reset the display,
    /// re-read the command line, and launch a new runner for the next
    /// generation.
    ///
    /// Termination of the previous run is fire-and-forget; this returns as
    /// soon as the new runner task is spawned. A control-file read failure
    /// is fatal and propagates.
    pub fn on_trigger(self: &Arc<Self>) -> Result<()> {
        let (generation, previous) = {
            let mut st = self.state();
            st.generation += 1;
            st.kill_requested = false;
            (st.generation, st.active.take())
        };

        if let Some(prev) = previous {
            debug!(
                superseded = prev.generation,
                generation, "terminating superseded run"
            );
            terminate::terminate(prev.target);
        }

        self.state().sink.reset();

        // Fresh read every run, so edits to the control line take effect
        // on the next trigger.
        let line = self.commands.read_command_line()?;
        info!(generation, command = %line, "starting run");

        let sup = Arc::clone(self);
        tokio::spawn(async move {
            runner::run(sup, generation, line).await;
        });
        Ok(())
    }

    /// User asked to stop the current run (the window stays, the watcher
    /// keeps going). Also blocks a run that is mid-spawn from publishing.
    pub fn on_kill(&self) {
        let target = {
            let mut st = self.state();
            st.kill_requested = true;
            st.active.as_ref().map(|run| Arc::clone(&run.target))
        };
        match target {
            Some(target) => terminate::terminate(target),
            None => debug!("kill requested with no active run"),
        }
    }

    /// Send the current run's process group a diagnostic-dump signal
    /// (SIGQUIT). Single signal, no escalation, result ignored.
    pub fn on_quit(&self) {
        let target = {
            let st = self.state();
            st.active.as_ref().map(|run| Arc::clone(&run.target))
        };
        match target {
            Some(target) => terminate::quit(target.as_ref()),
            None => debug!("quit requested with no active run"),
        }
    }

    /// Current generation. Mostly useful for tests and logging.
    pub fn current_generation(&self) -> Generation {
        self.state().generation
    }

    /// Resolve the shell interpreter for a new run.
    pub(crate) fn shell(&self) -> PathBuf {
        shell::resolve(self.shell_override.as_deref())
    }

    /// Publish a spawned process as the active run, unless the generation
    /// was superseded or a kill arrived while spawning.
    pub(crate) fn admit(
        &self,
        generation: Generation,
        target: Arc<dyn SignalTarget>,
    ) -> Admission {
        let mut st = self.state();
        if st.generation != generation || st.kill_requested {
            return Admission::Stale;
        }
        st.active = Some(ActiveRun { generation, target });
        Admission::Published
    }

    /// Report a spawn failure inline in the sink, unless the run already
    /// lost its race (superseded or killed runs report nothing).
    pub(crate) fn spawn_failed(&self, generation: Generation, err: &io::Error) {
        let mut st = self.state();
        if st.generation != generation || st.kill_requested {
            return;
        }
        st.sink.notice(&format!("(exec: {err})"));
    }

    /// Run `f` against the sink iff `generation` is still current.
    ///
    /// Returns whether `f` ran. This is the guard every runner-side write
    /// goes through; a superseded run's output is dropped here.
    pub(crate) fn with_sink<F>(&self, generation: Generation, f: F) -> bool
    where
        F: FnOnce(&mut dyn Sink),
    {
        let mut st = self.state();
        if st.generation != generation {
            return false;
        }
        f(st.sink.as_mut());
        true
    }
}

impl std::fmt::Debug for RunSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let st = self.state();
        f.debug_struct("RunSupervisor")
            .field("generation", &st.generation)
            .field("active", &st.active.as_ref().map(|r| r.generation))
            .field("kill_requested", &st.kill_requested)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::terminate::mock::FakeTarget;
    use crate::ui::mock::{FixedCommands, MemorySink};

    fn test_supervisor() -> (Arc<RunSupervisor>, MemorySink) {
        let sink = MemorySink::new();
        let sup = RunSupervisor::new(
            Box::new(sink.clone()),
            Box::new(FixedCommands::new("")),
            Some(PathBuf::from("/bin/sh")),
        );
        (sup, sink)
    }

    #[tokio::test]
    async fn generations_strictly_increase() {
        let (sup, _sink) = test_supervisor();
        let mut last = sup.current_generation();
        for _ in 0..5 {
            sup.on_trigger().expect("trigger");
            let generation = sup.current_generation();
            assert!(generation > last);
            last = generation;
        }
    }

    #[tokio::test]
    async fn stale_generation_cannot_write() {
        let (sup, sink) = test_supervisor();
        sup.on_trigger().expect("trigger");
        let stale = sup.current_generation();
        sup.on_trigger().expect("trigger");

        assert!(!sup.with_sink(stale, |s| s.write(b"stale")));
        assert!(sup.with_sink(stale + 1, |s| s.write(b"fresh")));
        assert_eq!(sink.contents(), b"fresh");
    }

    #[tokio::test]
    async fn kill_blocks_publication_until_next_trigger() {
        let (sup, _sink) = test_supervisor();
        sup.on_trigger().expect("trigger");
        let generation = sup.current_generation();

        sup.on_kill();
        let target = Arc::new(FakeTarget::new());
        assert!(matches!(
            sup.admit(generation, target.clone()),
            Admission::Stale
        ));

        // A new trigger clears the kill flag for the next generation.
        sup.on_trigger().expect("trigger");
        assert!(matches!(
            sup.admit(sup.current_generation(), target),
            Admission::Published
        ));
    }

    #[tokio::test]
    async fn spawn_failure_notice_is_suppressed_for_stale_runs() {
        let (sup, sink) = test_supervisor();
        sup.on_trigger().expect("trigger");
        let stale = sup.current_generation();
        sup.on_trigger().expect("trigger");

        let err = io::Error::new(io::ErrorKind::NotFound, "no rc");
        sup.spawn_failed(stale, &err);
        assert_eq!(sink.contents(), b"");

        sup.spawn_failed(stale + 1, &err);
        assert!(sink.contents().starts_with(b"(exec: "));
    }
}
