//! System-wide constants and default paths.

use std::path::PathBuf;
use std::sync::OnceLock;

/// Default container storage root on Linux with root access.
pub const SYSTEM_STORAGE_ROOT: &str = "/var/lib/contmon";

/// File name of the event-source socket inside a storage root.
pub const MONITOR_SOCKET_NAME: &str = "monitor.sock";

/// Binary name of the background daemon that owns a root's event stream.
pub const MONITORD_BIN: &str = "contmon-monitord";

/// Directive payload understood by the daemon's control endpoint.
pub const QUIT_DIRECTIVE: &[u8] = b"quit";

/// Returns the storage root, preferring `$CONTMON_ROOT` when set.
fn resolve_storage_root() -> PathBuf {
    if let Ok(root) = std::env::var("CONTMON_ROOT") {
        if !root.is_empty() {
            return PathBuf::from(root);
        }
    }
    PathBuf::from(SYSTEM_STORAGE_ROOT)
}

static STORAGE_ROOT: OnceLock<PathBuf> = OnceLock::new();

/// Returns the resolved default storage root for this session.
pub fn default_storage_root() -> &'static PathBuf {
    STORAGE_ROOT.get_or_init(resolve_storage_root)
}

/// Application name used in CLI output and logs.
pub const APP_NAME: &str = "contmon";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "cmon";
