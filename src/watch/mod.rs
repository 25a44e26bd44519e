// src/watch/mod.rs

//! Filesystem change notifications.

pub mod watcher;

pub use watcher::{WatcherHandle, spawn_watcher};
