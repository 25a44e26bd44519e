// src/exec/runner.rs

//! One run of the command: spawn, stream, report.

use std::io;
use std::process::Stdio;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::engine::Generation;
use crate::engine::supervisor::{Admission, RunSupervisor};
use crate::exec::terminate::{self, SignalTarget, StopSignal};

/// Execute one generation of the control-file command.
///
/// The command runs under the resolved shell as `<shell> -c <line>`, in its
/// own process group, with stdout and stderr merged into a single byte
/// stream that is forwarded to the sink chunk by chunk. Every externally
/// visible step re-checks the generation against the supervisor; once the
/// run is superseded, nothing it does is shown, only its termination
/// proceeds.
pub(crate) async fn run(sup: Arc<RunSupervisor>, generation: Generation, line: String) {
    let shell = sup.shell();
    let mut cmd = Command::new(&shell);
    cmd.arg("-c")
        .arg(&line)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(err) => {
            debug!(generation, shell = %shell.display(), %err, "spawn failed");
            sup.spawn_failed(generation, &err);
            return;
        }
    };

    let target = signal_target(&child);
    if let Admission::Stale = sup.admit(generation, Arc::clone(&target)) {
        // Lost the race with a newer trigger or a kill before this process
        // was ever published. Terminate it rather than let it run
        // unobserved, and reap it off to the side.
        debug!(generation, "superseded before publication; abandoning run");
        terminate::terminate(target);
        tokio::spawn(async move {
            let _ = child.wait().await;
        });
        return;
    }

    let (tx, mut rx) = mpsc::channel::<Vec<u8>>(64);
    if let Some(stdout) = child.stdout.take() {
        pump(stdout, tx.clone());
    }
    if let Some(stderr) = child.stderr.take() {
        pump(stderr, tx.clone());
    }
    drop(tx);

    // Whether the last byte shown for this run ended a line. Only updated
    // when a chunk actually reaches the sink.
    let mut at_line_start = true;
    while let Some(chunk) = rx.recv().await {
        let shown = sup.with_sink(generation, |sink| {
            sink.write(&chunk);
            at_line_start = chunk.last() == Some(&b'\n');
        });
        if !shown {
            trace!(generation, len = chunk.len(), "dropped stale output chunk");
        }
    }

    let status = child.wait().await;
    sup.with_sink(generation, |sink| {
        if !at_line_start {
            // Output stopped mid-line: make that visible instead of leaving
            // the display dangling.
            sink.write(b"\\\n");
        }
        match &status {
            Ok(st) if st.success() => {}
            Ok(st) => sink.notice(&format!("({st})")),
            Err(err) => sink.notice(&format!("({err})")),
        }
    });
    debug!(generation, status = ?status, "run finished");
}

/// Forward raw bytes from one process stream into the merged channel.
///
/// Read errors end the stream silently; anything worth reporting shows up
/// in the process's wait status instead.
fn pump<R>(mut reader: R, tx: mpsc::Sender<Vec<u8>>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = [0u8; 4096];
        loop {
            match reader.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if tx.send(buf[..n].to_vec()).await.is_err() {
                        break;
                    }
                }
            }
        }
    });
}

#[cfg(unix)]
fn signal_target(child: &Child) -> Arc<dyn SignalTarget> {
    match child.id() {
        Some(pid) => Arc::new(terminate::ProcessGroup::new(pid)),
        None => Arc::new(Unsignalable),
    }
}

#[cfg(not(unix))]
fn signal_target(_child: &Child) -> Arc<dyn SignalTarget> {
    Arc::new(Unsignalable)
}

/// Target for a process we cannot signal (no pid, or a platform without
/// process-group signals). `kill_on_drop` is the only recourse there.
struct Unsignalable;

impl SignalTarget for Unsignalable {
    fn signal(&self, _sig: StopSignal) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "process cannot be signalled",
        ))
    }

    fn is_alive(&self) -> bool {
        false
    }
}
