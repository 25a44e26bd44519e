// src/exec/terminate.rs

//! Escalating process termination.
//!
//! Stopping a run is never a single kill: the process first gets a chance
//! to die politely. On signal-capable platforms the escalation is
//! SIGINT → SIGTERM → SIGKILL with a fixed 100ms pause between stages; the
//! portable plan is interrupt → kill with the same pause. Escalation runs
//! on a detached task, so callers (the supervisor reacting to a trigger or
//! a user Kill) never wait for it.
//!
//! The platform difference is behind the [`SignalTarget`] capability trait
//! rather than scattered `cfg` blocks; tests drive the escalation with a
//! fake target and paused time.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

/// Pause between escalation stages.
pub const STAGE_DELAY: Duration = Duration::from_millis(100);

/// Abstract stop request, strongest last. `Quit` sits outside the
/// escalation ladder: it asks the process to dump diagnostic state and
/// exit, and is only ever sent once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopSignal {
    Interrupt,
    Terminate,
    Kill,
    Quit,
}

/// Something that can receive stop signals: in production a process group,
/// in tests a recorder.
///
/// `signal` on an already-exited target must be a harmless no-op or an
/// error; either stops the escalation.
pub trait SignalTarget: Send + Sync {
    fn signal(&self, sig: StopSignal) -> io::Result<()>;

    /// Whether the target still exists. Checked before each escalation
    /// stage after the first, so a process that exits early is left alone.
    fn is_alive(&self) -> bool;
}

const SIGNAL_STAGES: &[StopSignal] =
    &[StopSignal::Interrupt, StopSignal::Terminate, StopSignal::Kill];
const PORTABLE_STAGES: &[StopSignal] = &[StopSignal::Interrupt, StopSignal::Kill];

/// Escalation plan for this platform, selected once at startup.
pub fn stages() -> &'static [StopSignal] {
    if cfg!(unix) {
        SIGNAL_STAGES
    } else {
        PORTABLE_STAGES
    }
}

/// Terminate a target with the platform escalation plan, fire-and-forget.
///
/// Returns immediately; the stages run on a detached task. Safe to call for
/// a target whose process already exited.
pub fn terminate(target: Arc<dyn SignalTarget>) {
    let plan = stages();
    tokio::spawn(async move {
        escalate(target.as_ref(), plan).await;
    });
}

/// Send one diagnostic-dump request. No escalation, result ignored.
pub fn quit(target: &dyn SignalTarget) {
    if let Err(err) = target.signal(StopSignal::Quit) {
        debug!(%err, "quit signal not delivered (process likely exited)");
    }
}

/// Walk the stages with [`STAGE_DELAY`] between them, stopping as soon as
/// the target is gone or a send fails.
pub(crate) async fn escalate(target: &dyn SignalTarget, plan: &[StopSignal]) {
    for (stage, sig) in plan.iter().enumerate() {
        if stage > 0 {
            tokio::time::sleep(STAGE_DELAY).await;
            if !target.is_alive() {
                trace!(stage, "target exited before stage; escalation done");
                return;
            }
        }
        if let Err(err) = target.signal(*sig) {
            debug!(?sig, %err, "signal not delivered; treating target as exited");
            return;
        }
        trace!(?sig, "sent stop signal");
    }
}

#[cfg(unix)]
pub use unix::ProcessGroup;

#[cfg(unix)]
mod unix {
    use super::{SignalTarget, StopSignal};
    use std::io;

    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    /// Production target: a spawned run's process group.
    ///
    /// Runs are spawned as group leaders, so signalling the group reaches
    /// the whole shell pipeline, not just `rc` itself. Holding only the
    /// pgid (never the child) keeps the child single-owned by its runner,
    /// which still has to `wait` it.
    #[derive(Debug, Clone, Copy)]
    pub struct ProcessGroup {
        pgid: i32,
    }

    impl ProcessGroup {
        pub fn new(pgid: u32) -> Self {
            Self { pgid: pgid as i32 }
        }
    }

    impl SignalTarget for ProcessGroup {
        fn signal(&self, sig: StopSignal) -> io::Result<()> {
            let sig = match sig {
                StopSignal::Interrupt => Signal::SIGINT,
                StopSignal::Terminate => Signal::SIGTERM,
                StopSignal::Kill => Signal::SIGKILL,
                StopSignal::Quit => Signal::SIGQUIT,
            };
            killpg(Pid::from_raw(self.pgid), sig).map_err(io::Error::from)
        }

        fn is_alive(&self) -> bool {
            // Signal 0: existence probe only.
            killpg(Pid::from_raw(self.pgid), None).is_ok()
        }
    }
}

pub mod mock {
    //! Recording target for escalation tests.

    use super::{SignalTarget, StopSignal};
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    /// A [`SignalTarget`] that records every signal and whose liveness is
    /// controlled by the test.
    #[derive(Debug, Default)]
    pub struct FakeTarget {
        alive: AtomicBool,
        sent: Mutex<Vec<StopSignal>>,
    }

    impl FakeTarget {
        pub fn new() -> Self {
            Self {
                alive: AtomicBool::new(true),
                sent: Mutex::new(Vec::new()),
            }
        }

        /// A target whose process has already exited.
        pub fn exited() -> Arc<Self> {
            let t = Self::new();
            t.alive.store(false, Ordering::SeqCst);
            Arc::new(t)
        }

        /// Simulate the process exiting.
        pub fn mark_exited(&self) {
            self.alive.store(false, Ordering::SeqCst);
        }

        pub fn sent(&self) -> Vec<StopSignal> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl SignalTarget for FakeTarget {
        fn signal(&self, sig: StopSignal) -> io::Result<()> {
            if !self.alive.load(Ordering::SeqCst) {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    "no such process",
                ));
            }
            self.sent.lock().unwrap().push(sig);
            Ok(())
        }

        fn is_alive(&self) -> bool {
            self.alive.load(Ordering::SeqCst)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::FakeTarget;
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn full_escalation_when_target_ignores_everything() {
        let target = FakeTarget::new();
        escalate(&target, &[StopSignal::Interrupt, StopSignal::Terminate, StopSignal::Kill])
            .await;
        assert_eq!(
            target.sent(),
            vec![StopSignal::Interrupt, StopSignal::Terminate, StopSignal::Kill]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn escalation_stops_once_target_exits() {
        let target = std::sync::Arc::new(FakeTarget::new());

        let t = target.clone();
        let walk = tokio::spawn(async move {
            escalate(
                t.as_ref(),
                &[StopSignal::Interrupt, StopSignal::Terminate, StopSignal::Kill],
            )
            .await;
        });

        // Die in response to the second signal, before the third stage.
        tokio::time::sleep(STAGE_DELAY + Duration::from_millis(10)).await;
        target.mark_exited();
        walk.await.unwrap();

        assert_eq!(
            target.sent(),
            vec![StopSignal::Interrupt, StopSignal::Terminate]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn terminating_an_exited_target_sends_nothing() {
        let target = FakeTarget::exited();
        escalate(target.as_ref(), stages()).await;
        escalate(target.as_ref(), stages()).await;
        assert!(target.sent().is_empty());
    }
}
