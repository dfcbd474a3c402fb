use std::process::ExitCode;

fn main() -> ExitCode {
    fareseer_cli::run()
}
