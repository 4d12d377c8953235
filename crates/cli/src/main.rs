use std::process::ExitCode;

use clap::Parser;

mod commands;
mod printer;

use commands::Command;
use vitrine_runtime::logging;

#[derive(Debug, Parser)]
#[command(
    name = "vitrine",
    version,
    about = "Browse a shared media directory with cached metadata",
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

fn main() -> ExitCode {
    logging::init().ok();

    let cli = Cli::parse();
    match cli.command {
        Command::Ls(args) => commands::ls::run(args),
        Command::Record(args) => commands::record::run(args),
        Command::Check(args) => commands::check::run(args),
    }
}
