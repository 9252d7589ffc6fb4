//! Multiplexed wait loop and event rendering.
//!
//! A single blocking poll(2) over the whole handle set is the only
//! suspension point: the loop wakes when any source has a record ready,
//! reads exactly one fixed-size record per ready source, and renders
//! matching events. A failed or short read on any source is fatal for
//! the entire loop: the fixed-size framing has no recovery point.

use std::io::Write;
use std::os::fd::AsFd;

use nix::errno::Errno;
use nix::poll::{PollFd, PollFlags, PollTimeout, poll};

use contmon_common::config::MonitorConfig;
use contmon_common::error::{MonitorError, Result};
use contmon_common::types::ContainerState;

use crate::connector::{self, EventSource};
use crate::filter::NameFilter;
use crate::record::{EventKind, EventRecord};

/// The monitor's wait loop: owns the fixed handle set, the compiled
/// filter, and the output sink for rendered lines.
#[derive(Debug)]
pub struct MonitorLoop<W: Write> {
    sources: Vec<EventSource>,
    filter: NameFilter,
    sink: W,
}

impl<W: Write> MonitorLoop<W> {
    /// Builds a loop over an already-connected handle set.
    ///
    /// The set is fixed from here on; no source is added or removed while
    /// the loop runs.
    #[must_use]
    pub fn new(sources: Vec<EventSource>, filter: NameFilter, sink: W) -> Self {
        Self {
            sources,
            filter,
            sink,
        }
    }

    /// Runs the loop until a fatal failure.
    ///
    /// There is no cancellation input: the only exits are a broken source
    /// stream or a failed wait, and process termination from outside.
    /// Every handle closes when the loop value drops, error or not.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Framing`] when any source's record read
    /// comes back short or failed, [`MonitorError::Wait`] when the poll
    /// itself fails, or [`MonitorError::Output`] when the sink rejects a
    /// rendered line.
    pub fn run(&mut self) -> Result<()> {
        tracing::info!(sources = self.sources.len(), "entering monitor loop");
        loop {
            for index in self.wait_ready()? {
                self.service(index)?;
            }
        }
    }

    /// Blocks until at least one source is readable; returns their
    /// indices. Retries on `EINTR`.
    fn wait_ready(&self) -> Result<Vec<usize>> {
        loop {
            let mut fds: Vec<PollFd<'_>> = self
                .sources
                .iter()
                .map(|source| PollFd::new(source.as_fd(), PollFlags::POLLIN))
                .collect();

            match poll(&mut fds, PollTimeout::NONE) {
                Ok(_) => {
                    return Ok(fds
                        .iter()
                        .enumerate()
                        .filter(|(_, fd)| fd.revents().is_some_and(|r| !r.is_empty()))
                        .map(|(index, _)| index)
                        .collect());
                }
                Err(Errno::EINTR) => {}
                Err(errno) => {
                    return Err(MonitorError::Wait {
                        source: errno.into(),
                    });
                }
            }
        }
    }

    /// Reads and dispatches one record from a ready source.
    fn service(&mut self, index: usize) -> Result<()> {
        let source = &self.sources[index];
        let raw = source.read_record().map_err(|err| {
            tracing::error!(root = %source.root().display(), error = %err, "record read failed");
            MonitorError::Framing {
                path: source.root().to_path_buf(),
                source: err,
            }
        })?;
        self.render(&EventRecord::decode(&raw))
    }

    /// Applies the name filter and renders one line per recognized kind.
    ///
    /// Each line is flushed individually; downstream consumers must see
    /// events as they happen, not in large batches.
    fn render(&mut self, record: &EventRecord) -> Result<()> {
        let subject = record.subject();
        if !self.filter.matches(&subject) {
            tracing::trace!(subject = %subject, "event dropped by name filter");
            return Ok(());
        }

        match record.kind() {
            EventKind::StateChange => {
                let label = ContainerState::from_code(record.value())
                    .map_or("UNKNOWN", ContainerState::label);
                writeln!(self.sink, "'{subject}' changed state to [{label}]")
            }
            EventKind::ExitCode => {
                let status = libc::WEXITSTATUS(record.value());
                writeln!(self.sink, "'{subject}' exited with status [{status}]")
            }
            EventKind::Other(tag) => {
                tracing::trace!(subject = %subject, tag, "ignoring unrecognized event kind");
                return Ok(());
            }
        }
        .and_then(|()| self.sink.flush())
        .map_err(|source| MonitorError::Output { source })
    }
}

/// Monitor-mode entry point: compile the filter, connect every source,
/// run the loop.
///
/// The filter compiles before any handle opens; on any setup error the
/// already-open handles drop before the error reaches the caller.
///
/// # Errors
///
/// Returns pattern errors from compilation, [`MonitorError::Connect`]
/// from setup, and the loop's fatal errors from [`MonitorLoop::run`].
pub fn run_monitor<W: Write>(config: &MonitorConfig, sink: W) -> Result<()> {
    let filter = NameFilter::compile(&config.name_pattern)?;
    let sources = connector::open_all(&config.storage_roots)?;
    MonitorLoop::new(sources, filter, sink).run()
}
