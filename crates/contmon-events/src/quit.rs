//! Quit broadcast: ask each root's monitor daemon to terminate.
//!
//! Connect-only; quit mode never spawns a daemon, and an absent daemon
//! is a connect failure for that path. Each path is attempted
//! independently and its handle closes immediately after the write.

use std::path::{Path, PathBuf};

use contmon_common::constants::QUIT_DIRECTIVE;
use contmon_common::error::{MonitorError, Result};

use crate::connector;

/// Sends the quit directive to every configured root.
///
/// # Errors
///
/// Returns [`MonitorError::QuitBroadcast`] with failure counts if any
/// path could not be signaled; every path is still attempted.
pub fn broadcast_quit(roots: &[PathBuf]) -> Result<()> {
    let mut failed = 0_usize;
    for root in roots {
        if let Err(err) = send_quit(root) {
            tracing::warn!(root = %root.display(), error = %err, "quit directive failed");
            eprintln!("unable to signal event source at {}: {err}", root.display());
            failed += 1;
        } else {
            tracing::info!(root = %root.display(), "quit directive delivered");
        }
    }

    if failed > 0 {
        return Err(MonitorError::QuitBroadcast {
            failed,
            total: roots.len(),
        });
    }
    Ok(())
}

/// Connects to one root and writes the directive; the handle closes on
/// return.
fn send_quit(root: &Path) -> Result<()> {
    let mut source = connector::connect(root)?;
    source
        .send_directive(QUIT_DIRECTIVE)
        .map_err(|err| MonitorError::Io {
            path: root.to_path_buf(),
            source: err,
        })
}
