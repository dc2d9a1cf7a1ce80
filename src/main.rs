use amermaid::cli::{self, Args};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse_args();

    env_logger::Builder::new()
        .filter_level(args.log_filter())
        .parse_env("AMERMAID_LOG")
        .init();

    cli::run(args)
}
