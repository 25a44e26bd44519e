// src/exec/shell.rs

//! Locating the shell interpreter.
//!
//! Commands run under plan9port's `rc`, found by, in order:
//! 1. an explicit override (`--shell`)
//! 2. `$PLAN9/bin/rc`
//! 3. `rc` next to a `9` launcher on `$PATH` — we deliberately do not
//!    invoke `9` itself, since it rewrites `$PATH`, and a stray `rc`
//!    elsewhere on `$PATH` may not be the plan9 one
//! 4. `/usr/local/plan9/bin/rc`

use std::env;
use std::path::{Path, PathBuf};

const FALLBACK_RC: &str = "/usr/local/plan9/bin/rc";

/// Resolve the interpreter used for `-c` invocations.
///
/// Resolution happens per run, so environment changes are picked up.
pub fn resolve(override_path: Option<&Path>) -> PathBuf {
    if let Some(path) = override_path {
        return path.to_path_buf();
    }
    if let Ok(dir) = env::var("PLAN9") {
        if !dir.is_empty() {
            return Path::new(&dir).join("bin/rc");
        }
    }
    if let Some(nine) = find_in_path("9") {
        if let Some(dir) = nine.parent() {
            return dir.join("rc");
        }
    }
    PathBuf::from(FALLBACK_RC)
}

/// Minimal `$PATH` lookup for an executable file.
fn find_in_path(name: &str) -> Option<PathBuf> {
    let path = env::var_os("PATH")?;
    for dir in env::split_paths(&path) {
        if dir.as_os_str().is_empty() {
            continue;
        }
        let candidate = dir.join(name);
        if is_executable(&candidate) {
            return Some(candidate);
        }
    }
    None
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
