// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `watchrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "watchrun",
    version,
    about = "Re-run a shell command each time a file under a directory changes.",
    long_about = None
)]
pub struct CliArgs {
    /// Directory to watch recursively.
    #[arg(value_name = "DIR", default_value = ".")]
    pub root: String,

    /// Path to the control file holding the editable "% command" line.
    ///
    /// Read fresh before every run; relative paths are resolved against DIR.
    #[arg(long, value_name = "PATH", default_value = "Watchfile")]
    pub control: String,

    /// Explicit shell interpreter path, overriding the rc lookup
    /// ($PLAN9/bin/rc, then a sibling of `9` on $PATH, then
    /// /usr/local/plan9/bin/rc).
    #[arg(long, value_name = "PATH")]
    pub shell: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `WATCHRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Initial command; written to the control file as "% command" at
    /// startup. If omitted, the control file must already exist.
    #[arg(value_name = "COMMAND", trailing_var_arg = true)]
    pub command: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
