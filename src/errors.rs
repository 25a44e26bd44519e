// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! Only *structural* failures surface here (unreadable control file, broken
//! file watcher). Per-run failures — a command that cannot be spawned or
//! exits non-zero — are not errors at this level; they are reported inline
//! in the output sink, like a terminal session would show them.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchrunError {
    #[error("Control file error: {0}")]
    ControlFile(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("File watch error: {0}")]
    WatchError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, WatchrunError>;
