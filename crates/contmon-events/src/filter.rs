//! Container name filtering.
//!
//! The user pattern is anchored at both ends before compilation so a
//! pattern of `web` matches the container `web` and nothing else; partial
//! substring matches never pass.

use contmon_common::error::{MonitorError, Result};
use regex::Regex;

/// Maximum accepted length of the pattern after anchoring, in bytes.
pub const MAX_PATTERN_LEN: usize = 1024;

/// Compiled, anchored container name matcher.
///
/// Immutable once built; compiled before any event source is opened so a
/// bad pattern aborts the run without touching a daemon.
#[derive(Debug)]
pub struct NameFilter {
    regex: Regex,
}

impl NameFilter {
    /// Compiles a user pattern into an anchored matcher.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::PatternTooLong`] if the anchored pattern
    /// exceeds [`MAX_PATTERN_LEN`], or [`MonitorError::Pattern`] if the
    /// regex compiler rejects the syntax.
    pub fn compile(pattern: &str) -> Result<Self> {
        let anchored = format!("^(?:{pattern})$");
        if anchored.len() > MAX_PATTERN_LEN {
            return Err(MonitorError::PatternTooLong {
                len: anchored.len(),
                limit: MAX_PATTERN_LEN,
            });
        }

        let regex = Regex::new(&anchored)?;
        tracing::debug!(pattern, "name filter compiled");
        Ok(Self { regex })
    }

    /// Returns whether `name` matches the full anchored pattern.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}
