use std::process::ExitCode;

fn main() -> ExitCode {
    cimspec_cli::run()
}
