use std::path::PathBuf;

use thiserror::Error;

use crate::project::ProjectError;

/// Why a `move_file` run stopped.
#[derive(Debug, Error)]
pub enum MoveError {
    #[error("File '{}' not found.", .0.display())]
    FileNotFoundOnDisk(PathBuf),

    #[error("File '{}' not found in project.", .0.display())]
    FileNotFoundInProject(PathBuf),

    #[error("Native target '{0}' not found.")]
    TargetNotFound(String),

    #[error("From and to targets must be different.")]
    SameTarget,

    #[error("Group name '{0}' not found.")]
    GroupNotFound(String),

    #[error("Group name '{name}' is ambiguous ({count} groups match).")]
    GroupAmbiguous { name: String, count: usize },

    #[error(
        "File '{}' not found in any of '{target}' target's known build phases.",
        .file.display()
    )]
    MembershipNotFound { file: PathBuf, target: String },

    #[error("Unknown type of build phase: {0}")]
    UnknownPhaseType(String),

    #[error("Group '{0}' does not resolve to a directory on disk.")]
    GroupPathUnresolved(String),

    #[error("Destination directory '{}' does not exist.", .0.display())]
    DestinationDirectoryMissing(PathBuf),

    #[error("Destination '{}' already exists.", .0.display())]
    DestinationOccupied(PathBuf),

    #[error("Cannot move '{}': path is outside allowed scope.", .0.display())]
    OutsideAllowedScope(PathBuf),

    #[error("Cannot move '{}' to '{}': {source}", .from.display(), .to.display())]
    DiskMove {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Project(#[from] ProjectError),
}
