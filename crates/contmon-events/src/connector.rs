//! Event-source connection management.
//!
//! Each storage root owns one event stream, served over a unix socket by
//! a background daemon. The connector knows how to probe for a live
//! daemon, spawn one on demand (best effort), and open the connected,
//! pollable handle the wait loop multiplexes over.

use std::io::{Read, Write};
use std::os::fd::{AsFd, BorrowedFd};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use contmon_common::constants::{MONITORD_BIN, MONITOR_SOCKET_NAME};
use contmon_common::error::{MonitorError, Result};

use crate::record::RECORD_SIZE;

/// A connected event source, bound to one storage root.
///
/// Either fully connected and pollable or never constructed; the
/// underlying socket closes on drop, so a partially built handle set
/// releases every already-open source when the owning `Vec` unwinds.
#[derive(Debug)]
pub struct EventSource {
    stream: UnixStream,
    root: PathBuf,
}

impl EventSource {
    /// Returns the storage root this source belongs to.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reads exactly one raw record from the stream.
    ///
    /// Called only after the source reported readable, so the read is
    /// expected to complete without blocking.
    ///
    /// # Errors
    ///
    /// Returns the underlying read error on a short or failed read.
    pub fn read_record(&self) -> std::io::Result<[u8; RECORD_SIZE]> {
        let mut raw = [0_u8; RECORD_SIZE];
        (&self.stream).read_exact(&mut raw)?;
        Ok(raw)
    }

    /// Writes a short directive payload to the daemon.
    ///
    /// # Errors
    ///
    /// Returns the underlying write error.
    pub fn send_directive(&mut self, payload: &[u8]) -> std::io::Result<()> {
        self.stream.write_all(payload)
    }
}

impl AsFd for EventSource {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.stream.as_fd()
    }
}

/// Returns the event-source socket path inside a storage root.
#[must_use]
pub fn socket_path(root: &Path) -> PathBuf {
    root.join(MONITOR_SOCKET_NAME)
}

/// Returns whether the root's event source accepts connections right now.
#[must_use]
pub fn is_source_live(root: &Path) -> bool {
    let socket = socket_path(root);
    if !socket.exists() {
        return false;
    }
    match UnixStream::connect(&socket) {
        Ok(_) => true,
        Err(err) => {
            tracing::debug!(socket = %socket.display(), error = %err, "socket present but not connectable");
            false
        }
    }
}

/// Opens a connection to the root's event stream.
///
/// # Errors
///
/// Returns [`MonitorError::Connect`] naming the root if the daemon is
/// unreachable or the path is invalid.
pub fn connect(root: &Path) -> Result<EventSource> {
    let socket = socket_path(root);
    let stream = UnixStream::connect(&socket).map_err(|source| MonitorError::Connect {
        path: root.to_path_buf(),
        source,
    })?;
    tracing::debug!(root = %root.display(), "event source connected");
    Ok(EventSource {
        stream,
        root: root.to_path_buf(),
    })
}

/// Locates the monitor daemon binary: next to the current executable
/// first, then on `PATH`.
fn locate_monitord() -> Option<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join(MONITORD_BIN);
            if sibling.exists() {
                return Some(sibling);
            }
        }
    }
    which::which(MONITORD_BIN).ok()
}

/// Best-effort: starts the root's monitor daemon if it is not running.
///
/// Spawn failures only log a warning; the subsequent [`connect`] is the
/// arbiter of whether the source is usable.
pub fn ensure_daemon(root: &Path) {
    if is_source_live(root) {
        tracing::debug!(root = %root.display(), "daemon already serving");
        return;
    }

    let Some(bin) = locate_monitord() else {
        tracing::warn!(root = %root.display(), bin = MONITORD_BIN, "monitor daemon binary not found");
        return;
    };

    match Command::new(&bin)
        .arg(root)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(_child) => {
            tracing::info!(root = %root.display(), bin = %bin.display(), "spawned monitor daemon");
            wait_for_source(root);
        }
        Err(err) => {
            tracing::warn!(root = %root.display(), error = %err, "failed to spawn monitor daemon");
        }
    }
}

/// Waits briefly for a freshly spawned daemon's socket, with backoff.
fn wait_for_source(root: &Path) {
    let mut delay = Duration::from_millis(50);
    for attempt in 0..6 {
        if is_source_live(root) {
            tracing::debug!(root = %root.display(), attempt, "daemon socket ready");
            return;
        }
        std::thread::sleep(delay);
        delay = std::cmp::min(delay * 2, Duration::from_secs(1));
    }
    tracing::warn!(root = %root.display(), "daemon socket not ready, connect will decide");
}

/// Opens every configured root, spawning daemons on demand, in input
/// order.
///
/// The returned set is index-aligned with `roots`. On the first connect
/// failure the partially built set drops, closing every already-open
/// handle before the error propagates.
///
/// # Errors
///
/// Returns the first [`MonitorError::Connect`] encountered.
pub fn open_all(roots: &[PathBuf]) -> Result<Vec<EventSource>> {
    let mut sources = Vec::with_capacity(roots.len());
    for root in roots {
        ensure_daemon(root);
        sources.push(connect(root)?);
    }
    Ok(sources)
}
