//! Monitor configuration model.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Resolved configuration for one monitor run.
///
/// Built from CLI arguments with defaults supplied by [`Default`]; the CLI
/// layer overrides fields the user set explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Container name pattern; anchored at both ends before compilation.
    pub name_pattern: String,
    /// Storage roots whose event sources are watched, in configured order.
    pub storage_roots: Vec<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            name_pattern: ".*".to_owned(),
            storage_roots: vec![crate::constants::default_storage_root().clone()],
        }
    }
}
