// tests/end_to_end.rs

//! Full-flow scenarios: control file on disk, real processes, and the
//! notify watcher feeding the event channel.

#![cfg(unix)]

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;
use watchrun::engine::{RunSupervisor, SupervisorEvent};
use watchrun::ui::ControlFile;
use watchrun::ui::mock::MemorySink;
use watchrun_test_utils::{init_tracing, wait_until, with_timeout};

fn control_file_supervisor(
    dir: &tempfile::TempDir,
    command: &str,
) -> (std::sync::Arc<RunSupervisor>, MemorySink, ControlFile) {
    let control = ControlFile::new(dir.path().join("Watchfile"));
    control.write_command(command).expect("seed control file");
    let sink = MemorySink::new();
    let supervisor = RunSupervisor::new(
        Box::new(sink.clone()),
        Box::new(control.clone()),
        Some(PathBuf::from("/bin/sh")),
    );
    (supervisor, sink, control)
}

#[tokio::test]
async fn echo_hello_end_to_end() {
    init_tracing();
    let dir = tempfile::tempdir().expect("tempdir");
    let (supervisor, sink, _control) = control_file_supervisor(&dir, "echo hello");

    supervisor.on_trigger().expect("trigger");

    let probe = sink.clone();
    wait_until("hello output", || probe.text() == "hello\n").await;
    // Clean exit: no continuation marker, no error notice.
    assert_eq!(sink.text(), "hello\n");
}

#[tokio::test]
async fn edited_control_line_takes_effect_on_next_trigger() {
    init_tracing();
    let dir = tempfile::tempdir().expect("tempdir");
    let (supervisor, sink, control) = control_file_supervisor(&dir, "echo before");

    supervisor.on_trigger().expect("trigger");
    let probe = sink.clone();
    wait_until("first output", || probe.text() == "before\n").await;

    control.write_command("echo after").expect("edit control file");
    supervisor.on_trigger().expect("trigger");
    let probe = sink.clone();
    wait_until("second output", || probe.text() == "after\n").await;

    assert_eq!(sink.resets(), 2);
}

#[tokio::test]
async fn missing_control_file_is_fatal() {
    init_tracing();
    let dir = tempfile::tempdir().expect("tempdir");
    let control = ControlFile::new(dir.path().join("Watchfile"));
    let sink = MemorySink::new();
    let supervisor = RunSupervisor::new(
        Box::new(sink.clone()),
        Box::new(control),
        Some(PathBuf::from("/bin/sh")),
    );
    assert!(supervisor.on_trigger().is_err());
}

#[tokio::test]
async fn watcher_reports_changes_as_events() {
    init_tracing();
    let dir = tempfile::tempdir().expect("tempdir");
    let (event_tx, mut event_rx) = mpsc::channel::<SupervisorEvent>(16);
    let _handle =
        watchrun::watch::spawn_watcher(dir.path().to_path_buf(), event_tx).expect("watcher");

    // Give the watcher a moment to arm before generating the change.
    tokio::time::sleep(Duration::from_millis(200)).await;
    std::fs::write(dir.path().join("touched.txt"), "x").expect("write file");

    let event = with_timeout(async {
        loop {
            match event_rx.recv().await {
                Some(SupervisorEvent::Changed) => break SupervisorEvent::Changed,
                Some(_) => continue,
                None => panic!("watcher channel closed"),
            }
        }
    })
    .await;
    assert!(matches!(event, SupervisorEvent::Changed));
}
