use std::process::ExitCode;

use human_panic::setup_panic;
use log::error;

use imod_recon::cli::{get_log_file, get_matches, get_verbosity};
use imod_recon::logging::init_logger;
use imod_recon::runner::ProcessRunner;
use imod_recon::workflow::execute;

fn main() -> ExitCode {
    setup_panic!();

    let matches = get_matches();

    let log_file = match get_log_file(&matches) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Failed to determine the log file: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logger(get_verbosity(&matches), Some(&log_file)) {
        eprintln!("Failed to initialise logging: {e:#}");
        return ExitCode::FAILURE;
    }

    match execute(&matches, &mut ProcessRunner) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
