use clap::Parser;
use xcproj_helper::commands::move_file::{
    self,
    args::{Cli, Command},
};
use xcproj_helper::config::Config;
use xcproj_helper::logging;

/// Command-line helper for editing Xcode projects.
fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("xcproj-helper: {e}");
            std::process::exit(1);
        }
    };

    let exit_code = match cli.command {
        Command::MoveFile(args) => move_file::run(args.into(), config),
    };
    std::process::exit(exit_code);
}
