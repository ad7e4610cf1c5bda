//! `freemails` - personal IMAP triage
//!
//! Keeps a small configuration of allow/deny lists and lists every message
//! of a mailbox as freed or locked according to them.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;
mod output;
mod session;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use freemails_core::SettingsStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;
use session::Terminal;

fn main() -> ExitCode {
    // Logs go to stderr so the listing on stdout stays clean.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "freemails=warn,freemails_core=warn,freemails_imap=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    match run(&cli.args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<()> {
    let store = SettingsStore::from_env()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(session::execute(args, store, io::stdout().lock(), Terminal))
}
