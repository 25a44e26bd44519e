// src/watch/watcher.rs

use std::path::PathBuf;

use anyhow::Result;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::engine::SupervisorEvent;

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive
/// for as long as needed. Dropping this handle stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a filesystem watcher observing `root` recursively, forwarding
/// `SupervisorEvent::Changed` into the supervisor loop for every content
/// change. The loop coalesces; this side stays dumb and sends everything.
///
/// A broken watcher callback surfaces as `SupervisorEvent::WatchFailed`,
/// which the loop treats as fatal — once the notification source is gone
/// there is no recovery path.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    event_tx: mpsc::Sender<SupervisorEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();
    // Canonicalize once so we have a stable base path.
    let root = root.canonicalize().unwrap_or_else(|_| root.clone());

    // Channel from the blocking notify callback into the async world.
    let (notify_tx, mut notify_rx) =
        tokio::sync::mpsc::unbounded_channel::<notify::Result<Event>>();

    // Closure called synchronously by notify whenever an event arrives.
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            if let Err(err) = notify_tx.send(res) {
                // We can't log via tracing here easily, so fall back to stderr.
                eprintln!("watchrun: failed to forward notify event: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;

    info!("file watcher started on {:?}", root);

    // Async task that consumes notify events and forwards change triggers.
    tokio::spawn(async move {
        while let Some(res) = notify_rx.recv().await {
            let event = match res {
                Ok(event) => event,
                Err(err) => {
                    let _ = event_tx
                        .send(SupervisorEvent::WatchFailed(err.to_string()))
                        .await;
                    break;
                }
            };

            debug!(?event, "received notify event");
            if is_content_change(&event.kind)
                && event_tx.send(SupervisorEvent::Changed).await.is_err()
            {
                break;
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}

/// Only creations, modifications, and removals count as "something
/// changed"; access events and the catch-all metadata noise do not warrant
/// a rerun.
fn is_content_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}
