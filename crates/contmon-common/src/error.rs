//! Unified error types for the contmon workspace.
//!
//! Every fatal condition in the event engine maps to one variant here; the
//! CLI converts the variant into a one-line diagnostic and a non-zero exit.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The anchored name pattern exceeds the compiler's length bound.
    #[error("name pattern too long ({len} bytes after anchoring, limit {limit})")]
    PatternTooLong {
        /// Length of the pattern after anchoring.
        len: usize,
        /// Maximum accepted length.
        limit: usize,
    },

    /// The name pattern was rejected by the regex compiler.
    #[error("invalid name pattern: {source}")]
    Pattern {
        /// Underlying compilation error.
        #[from]
        source: regex::Error,
    },

    /// An event source could not be reached.
    #[error("unable to open event source at {path}: {source}")]
    Connect {
        /// Storage root whose source is unreachable.
        path: PathBuf,
        /// Underlying connection error.
        source: std::io::Error,
    },

    /// A record read came back short or failed outright.
    ///
    /// Fatal for the whole multiplexed loop: the fixed-size framing has no
    /// recovery point once one source's stream position is broken.
    #[error("event stream framing broken on {path}: {source}")]
    Framing {
        /// Storage root whose stream broke.
        path: PathBuf,
        /// Underlying read error.
        source: std::io::Error,
    },

    /// The multiplexed wait itself failed.
    #[error("multiplexed wait failed: {source}")]
    Wait {
        /// Underlying poll error.
        source: std::io::Error,
    },

    /// An I/O operation on a specific path failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Writing a rendered event line to the output sink failed.
    #[error("failed to write event output: {source}")]
    Output {
        /// Underlying write error.
        source: std::io::Error,
    },

    /// One or more paths could not be signaled during a quit broadcast.
    #[error("quit directive failed on {failed} of {total} paths")]
    QuitBroadcast {
        /// Number of paths that failed.
        failed: usize,
        /// Total number of configured paths.
        total: usize,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, MonitorError>;
