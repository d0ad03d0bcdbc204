//! Desktop notification sent when a `move_file` run finishes.

use std::env;
use std::path::{Path, PathBuf};

/// Result of one move, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveNotice {
    /// File name of the moved file, without its directory.
    pub file_name: String,
    pub from_target: String,
    pub to_target: String,
    pub status: MoveStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveStatus {
    Moved { destination: PathBuf },
    Failed { reason: String },
}

impl MoveNotice {
    pub fn new(file_path: &Path, from_target: &str, to_target: &str, status: MoveStatus) -> Self {
        let file_name = file_path
            .file_name()
            .unwrap_or(file_path.as_os_str())
            .to_string_lossy()
            .into_owned();
        Self {
            file_name,
            from_target: from_target.to_string(),
            to_target: to_target.to_string(),
            status,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, MoveStatus::Moved { .. })
    }

    pub fn title(&self) -> String {
        match self.status {
            MoveStatus::Moved { .. } => format!("Moved {}", self.file_name),
            MoveStatus::Failed { .. } => format!("Could not move {}", self.file_name),
        }
    }

    pub fn subtitle(&self) -> String {
        format!("{} -> {}", self.from_target, self.to_target)
    }

    /// New location on success, the error message on failure.
    pub fn body(&self) -> String {
        match &self.status {
            MoveStatus::Moved { destination } => destination.display().to_string(),
            MoveStatus::Failed { reason } => reason.clone(),
        }
    }
}

/// Shows `notice` as a desktop notification.
///
/// Delivery failures are ignored; a notification never changes the exit
/// code of the run it reports on.
pub fn notify(notice: &MoveNotice) {
    #[cfg(test)]
    if test_hook::deliver(notice) {
        return;
    }

    if matches!(env::var("XCPROJ_HELPER_TEST_MODE").as_deref(), Ok("1")) {
        return;
    }

    if let Err(e) = dispatch(notice) {
        tracing::debug!("notification not delivered: {e}");
    }
}

#[cfg(target_os = "macos")]
fn dispatch(notice: &MoveNotice) -> Result<(), String> {
    use mac_notification_sys::{Notification, send_notification};

    let mut options = Notification::new();
    options.asynchronous(true);

    send_notification(
        &notice.title(),
        Some(&notice.subtitle()),
        &notice.body(),
        Some(&options),
    )
    .map(|_| ())
    .map_err(|e| e.to_string())
}

#[cfg(not(target_os = "macos"))]
fn dispatch(_notice: &MoveNotice) -> Result<(), String> {
    Ok(())
}
