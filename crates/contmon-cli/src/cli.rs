//! CLI argument surface and mode dispatch.

use std::path::PathBuf;

use clap::Parser;

use contmon_common::config::MonitorConfig;
use contmon_common::constants;

/// contmon — watch container lifecycle events as they happen.
#[derive(Parser, Debug)]
#[command(name = constants::BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Container name to watch. NAME may be a regular expression and is
    /// matched against the whole name.
    #[arg(short = 'n', long = "name", value_name = "NAME", default_value = ".*")]
    pub name: String,

    /// Container storage root to watch. May be given multiple times to
    /// watch several roots at once.
    #[arg(short = 'P', long = "path", value_name = "DIR")]
    pub path: Vec<PathBuf>,

    /// Tell each root's monitor daemon to quit instead of watching.
    #[arg(short = 'Q', long = "quit")]
    pub quit: bool,

    /// Default log filter when CONTMON_LOG is unset.
    #[arg(long, value_name = "FILTER", default_value = "warn")]
    pub log_level: String,
}

/// Entry path selected once at startup from the parsed flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Watch event sources and render matching events.
    Monitor,
    /// Broadcast the quit directive and exit.
    Quit,
}

impl Cli {
    /// Returns the entry path these arguments select.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        if self.quit { Mode::Quit } else { Mode::Monitor }
    }

    /// Resolves the arguments into a monitor configuration, filling in
    /// the default storage root when none was given.
    #[must_use]
    pub fn into_config(self) -> MonitorConfig {
        let defaults = MonitorConfig::default();
        MonitorConfig {
            name_pattern: self.name,
            storage_roots: if self.path.is_empty() {
                defaults.storage_roots
            } else {
                self.path
            },
        }
    }
}

/// Dispatches to the selected mode.
///
/// # Errors
///
/// Returns an error on any setup failure, fatal read failure, or
/// per-path quit failure; the process exits non-zero.
pub fn execute(args: Cli) -> anyhow::Result<()> {
    let mode = args.mode();
    let config = args.into_config();
    tracing::debug!(?mode, roots = config.storage_roots.len(), "dispatching");

    match mode {
        Mode::Quit => contmon_events::quit::broadcast_quit(&config.storage_roots)?,
        Mode::Monitor => {
            contmon_events::multiplex::run_monitor(&config, std::io::stdout().lock())?;
        }
    }
    Ok(())
}
