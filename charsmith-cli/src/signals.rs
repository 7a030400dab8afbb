//! Ctrl-C handling.

use std::io;

/// Message printed when the user aborts.
pub const CANCELLED: &str = "Character creation cancelled.";

/// On SIGINT, print [`CANCELLED`] and exit with status 1.
///
/// Saves are written to a temporary file and renamed, so exiting mid-save
/// leaves any existing character file intact.
///
/// # Errors
/// Fails if the signal handler or its thread cannot be set up.
#[cfg(unix)]
pub fn install() -> io::Result<()> {
    use signal_hook::consts::SIGINT;
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT])?;
    std::thread::Builder::new()
        .name("sigint".into())
        .spawn(move || {
            if signals.forever().next().is_some() {
                eprintln!("\n{CANCELLED}");
                std::process::exit(1);
            }
        })?;
    Ok(())
}

/// Default Ctrl-C behaviour is kept off Unix.
///
/// # Errors
/// Never fails.
#[cfg(not(unix))]
pub fn install() -> io::Result<()> {
    Ok(())
}
