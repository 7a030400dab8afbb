//! `charsmith` binary.

use std::process::ExitCode;

use clap::Parser;

use charsmith_cli::{Cli, PromptError, app, signals};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version are not failures.
            let code = if err.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
            let _ = err.print();
            return code;
        }
    };

    if let Err(err) = signals::install() {
        eprintln!("warning: Ctrl-C handler unavailable: {err}");
    }

    match app::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if matches!(err.downcast_ref::<PromptError>(), Some(PromptError::Interrupted)) {
                eprintln!("{}", signals::CANCELLED);
            } else {
                eprintln!("Error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}
