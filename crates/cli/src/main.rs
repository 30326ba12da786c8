use std::process::ExitCode;

fn main() -> ExitCode {
    basket_cli::run()
}
