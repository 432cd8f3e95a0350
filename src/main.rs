use clap::Parser;
use alphatrack::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
