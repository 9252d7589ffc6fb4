//! # cmon — contmon CLI
//!
//! Watches container lifecycle events across one or more storage roots,
//! or tells each root's monitor daemon to quit.

mod cli;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("CONTMON_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    cli::execute(args)
}
