// src/lib.rs

pub mod cli;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod ui;
pub mod watch;

use std::path::PathBuf;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::engine::{RunSupervisor, SupervisorEvent, TriggerQueue};
use crate::errors::{Result, WatchrunError};
use crate::ui::{ControlFile, TerminalSink};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - the control file (seeded from trailing CLI args, if any)
/// - the run supervisor with a terminal sink
/// - the file watcher and the stdin action reader
/// - Ctrl-C handling
///
/// and then drives the single trigger-consuming loop. Returning `Err` means
/// a structural failure (unreadable control file, broken watcher); per-run
/// failures never reach this level.
pub async fn run(args: CliArgs) -> Result<()> {
    let root = PathBuf::from(&args.root)
        .canonicalize()
        .with_context(|| format!("resolving watch root {:?}", args.root))?;

    let control_path = {
        let p = PathBuf::from(&args.control);
        if p.is_absolute() { p } else { root.join(p) }
    };
    let control = ControlFile::new(control_path);
    if !args.command.is_empty() {
        control.write_command(&args.command.join(" "))?;
    }

    let supervisor = RunSupervisor::new(
        Box::new(TerminalSink::new()),
        Box::new(control),
        args.shell.map(PathBuf::from),
    );

    let (event_tx, mut event_rx) = mpsc::channel::<SupervisorEvent>(64);

    let _watcher_handle = watch::spawn_watcher(root.clone(), event_tx.clone())?;
    spawn_action_reader(event_tx.clone());

    // Ctrl-C → clean dismissal.
    {
        let tx = event_tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = tx.send(SupervisorEvent::Del).await;
            }
        });
    }

    // Run once at startup; further triggers come from the watcher.
    let mut queue = TriggerQueue::new();
    queue.notify();

    info!(root = ?root, "watchrun started");

    // The only trigger-consuming context: generation assignment stays
    // strictly sequential because both arms run on this one loop.
    loop {
        tokio::select! {
            _ = queue.next() => supervisor.on_trigger()?,
            event = event_rx.recv() => match event {
                None => {
                    info!("event sources closed; exiting");
                    break;
                }
                Some(SupervisorEvent::Changed) => queue.notify(),
                Some(SupervisorEvent::Kill) => supervisor.on_kill(),
                Some(SupervisorEvent::Quit) => supervisor.on_quit(),
                Some(SupervisorEvent::Del) => {
                    info!("dismissed; exiting");
                    break;
                }
                Some(SupervisorEvent::WatchFailed(msg)) => {
                    return Err(WatchrunError::WatchError(msg));
                }
            },
        }
    }
    Ok(())
}

/// Read user actions from stdin: `kill`, `quit`, `del` (case-insensitive).
///
/// Anything else is logged and dropped — there is no richer display layer
/// to forward it to.
fn spawn_action_reader(event_tx: mpsc::Sender<SupervisorEvent>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let action = match line.trim().to_lowercase().as_str() {
                "kill" => SupervisorEvent::Kill,
                "quit" => SupervisorEvent::Quit,
                "del" => SupervisorEvent::Del,
                "" => continue,
                other => {
                    debug!(input = other, "ignoring unrecognized action");
                    continue;
                }
            };
            if event_tx.send(action).await.is_err() {
                break;
            }
        }
        debug!("stdin action reader finished");
    });
}
