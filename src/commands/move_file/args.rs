use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "xcproj-helper")]
#[command(about = "Edit Xcode projects from the command line", long_about = None)]
pub struct Cli {
    /// Also log per-phase details of each step
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Move a file between targets.
    #[command(name = "move_file")]
    MoveFile(MoveFileArgs),
}

#[derive(Args, Debug, Clone)]
pub struct MoveFileArgs {
    /// The .xcodeproj bundle (or the project.pbxproj inside it)
    pub project_file: PathBuf,

    /// File to move, as it exists on disk
    pub file_path: PathBuf,

    /// Target the file currently belongs to
    #[arg(long, required = true)]
    pub from_target: String,

    /// Target the file should belong to
    #[arg(long, required = true)]
    pub to_target: String,

    /// Group receiving the file; defaults to the --to-target name
    #[arg(long)]
    pub to_group: Option<String>,
}
