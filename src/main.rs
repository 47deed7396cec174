//! Registers the JK2 ISAPI redirector with IIS.

// Without ADSI there is nothing to drive the installer outside of tests.
#![cfg_attr(not(windows), allow(dead_code))]

use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[cfg(windows)]
mod adsi;
mod console;
mod directory;
mod error;
mod filter;
mod flags;
mod getopt;
mod install;
#[cfg(test)]
mod memory;
mod registry;
mod security;
mod types;
mod vdir;

use error::InstallError;
use install::Outcome;

/// Environment variable holding the log filter, e.g. `debug`.
const LOG_ENV: &str = "ISAPI_INSTALL_LOG";

/// Builds the log filter from `value`, falling back to `info` when it is unset
/// or unparsable. The parse error is returned so it can be logged once tracing
/// is up.
fn log_filter(value: Option<&str>) -> (EnvFilter, Option<String>) {
    match value.map(EnvFilter::try_new) {
        Some(Ok(filter)) => (filter, None),
        Some(Err(e)) => (EnvFilter::new("info"), Some(e.to_string())),
        None => (EnvFilter::new("info"), None),
    }
}

fn init_tracing() -> Result<()> {
    let value = std::env::var(LOG_ENV).ok();
    let (filter, invalid) = log_filter(value.as_deref());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to enable tracing: {e}"))?;
    if let Some(e) = invalid {
        warn!("ignoring invalid {LOG_ENV} ({e}); logging at info");
    }
    Ok(())
}

fn program_name() -> String {
    std::env::args()
        .next()
        .map(PathBuf::from)
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_owned())
}

#[cfg(windows)]
fn install(args: &[String]) -> Result<Outcome, InstallError> {
    let exe = std::env::current_exe().map_err(|e| {
        InstallError::Precondition(format!("Unable to locate the running executable: {e}"))
    })?;
    let exe_dir = exe.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));

    let mut dir = adsi::AdsiDirectory::new().map_err(InstallError::host("CoInitializeEx"))?;
    let mut reg = registry::WindowsRegistry;
    install::run(args, &exe_dir, &mut dir, &mut reg)
}

#[cfg(not(windows))]
fn install(_args: &[String]) -> Result<Outcome, InstallError> {
    Err(InstallError::Precondition(
        "IIS and the Windows registry are only available on Windows.".to_owned(),
    ))
}

fn main() -> Result<()> {
    init_tracing()?;
    console::init_console_utf8();
    let program = program_name();
    let args: Vec<String> = std::env::args().skip(1).collect();

    if !args.iter().any(|a| a == "-h") {
        security::check_privileges();
    }

    match install(&args) {
        Ok(Outcome::Help) => println!("{}", console::usage(&program)),
        Ok(outcome) => debug!(?outcome, "done"),
        Err(e) => {
            eprintln!("{}", console::failure_report(&program, &e));
            std::process::exit(-1);
        }
    }
    Ok(())
}
