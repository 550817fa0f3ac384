use clap::Parser;
use momentum_engine::cli::{run, Cli};
use momentum_engine::logging::init_logging;

fn main() -> std::process::ExitCode {
    init_logging();
    run(Cli::parse())
}
