use std::process::ExitCode;

fn main() -> ExitCode {
    seekdb_cli::seekdb_cli(std::env::args().collect())
}
