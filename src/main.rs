use std::process::ExitCode;

use colored::Colorize;

fn main() -> ExitCode {
    if let Err(e) = nbchain::run() {
        eprintln!("{} {:?}", "Error:".red(), e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
