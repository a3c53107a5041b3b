use stitch_core::logging;

mod cli;

use crate::cli::{exit_code_for, Cli};

fn main() {
    // File logging when the state dir is usable, stderr otherwise.
    if let Err(err) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable: {:#}", err);
    }

    if let Err(err) = Cli::run_from_args() {
        eprintln!("stitch error: {:#}", err);
        std::process::exit(exit_code_for(&err));
    }
}
