use std::{io::Write, process::ExitCode};

use crate::runner::CommandRunner;

/// Exit status for every terminal failure; the unsigned form of -1.
pub const FAILURE_EXIT_CODE: u8 = 255;

pub fn fatal<W: Write>(runner: &mut CommandRunner<W>, msg: &str) -> ExitCode {
    if let Err(err) = runner.abort(msg) {
        eprintln!("FATAL: {}", err);
    }
    ExitCode::from(FAILURE_EXIT_CODE)
}
