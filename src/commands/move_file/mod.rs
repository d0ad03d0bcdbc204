use tracing::info;

use crate::config::Config;
use crate::notifications::{self, MoveNotice, MoveStatus};
use crate::project::Project;

pub mod args;
pub mod error;
pub mod mover;

pub use error::MoveError;
pub use mover::{MoveOutcome, MoveRequest, TargetFileMover};

/// Runs one `move_file` request and returns the process exit code.
pub fn run(request: MoveRequest, config: Config) -> i32 {
    let result = move_and_save(&request, &config);

    if config.notify.macos_notify {
        notifications::notify(&notice(&request, &result));
    }

    match result {
        Ok(outcome) => {
            info!(
                "Moved '{}' to '{}'",
                request.file_path.display(),
                outcome.destination.display()
            );
            0
        }
        Err(e) => {
            eprintln!("xcproj-helper: {e}");
            1
        }
    }
}

/// Opens the project, moves the file and saves the project only when every
/// step succeeded.
pub fn move_and_save(request: &MoveRequest, config: &Config) -> Result<MoveOutcome, MoveError> {
    info!("Using project '{}'", request.project_path.display());
    let mut project = Project::open(&request.project_path)?;

    let outcome = TargetFileMover::new(&mut project, config).move_file(request)?;

    project.save(config.project.backup)?;
    Ok(outcome)
}

fn notice(request: &MoveRequest, result: &Result<MoveOutcome, MoveError>) -> MoveNotice {
    let status = match result {
        Ok(outcome) => MoveStatus::Moved {
            destination: outcome.destination.clone(),
        },
        Err(e) => MoveStatus::Failed {
            reason: e.to_string(),
        },
    };
    MoveNotice::new(&request.file_path, &request.from_target, &request.to_target, status)
}
