use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::args::MoveFileArgs;
use super::error::MoveError;
use crate::config::Config;
use crate::paths;
use crate::project::{PhaseKind, Project};

/// Phase types looked up in the source target, in lookup order. Other phase
/// types (frameworks, copy files, ...) are never searched.
const SEARCHED_PHASES: [PhaseKind; 2] = [PhaseKind::Resources, PhaseKind::Sources];

/// A single `move_file` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    pub project_path: PathBuf,
    pub file_path: PathBuf,
    pub from_target: String,
    pub to_target: String,
    pub to_group: Option<String>,
}

impl MoveRequest {
    /// Display name of the group receiving the file.
    pub fn destination_group_name(&self) -> &str {
        self.to_group.as_deref().unwrap_or(&self.to_target)
    }
}

impl From<MoveFileArgs> for MoveRequest {
    fn from(args: MoveFileArgs) -> Self {
        Self {
            project_path: args.project_file,
            file_path: args.file_path,
            from_target: args.from_target,
            to_target: args.to_target,
            to_group: args.to_group,
        }
    }
}

/// A build phase of the source target that lists the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub phase: String,
    pub kind: PhaseKind,
    pub file_ref: String,
}

/// A request resolved against the project, with every precondition checked.
#[derive(Debug, Clone)]
pub struct MoveTask {
    /// Absolute path of the file before the move.
    pub file_path: PathBuf,
    pub to_target: String,
    pub to_group: String,
    /// Absolute path of the file after the move.
    pub destination: PathBuf,
    pub memberships: Vec<Membership>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub destination: PathBuf,
    pub phases: Vec<PhaseKind>,
}

/// Moves a file reference, and the file behind it, from one native target
/// to another.
pub struct TargetFileMover<'a> {
    project: &'a mut Project,
    config: &'a Config,
}

impl<'a> TargetFileMover<'a> {
    pub fn new(project: &'a mut Project, config: &'a Config) -> Self {
        Self { project, config }
    }

    /// Validates the request and applies it to the project and the disk.
    /// The project is left unsaved.
    pub fn move_file(&mut self, request: &MoveRequest) -> Result<MoveOutcome, MoveError> {
        let task = self.validate(request)?;
        self.execute(&task)
    }

    /// Resolves every entity the move needs without mutating anything.
    pub fn validate(&self, request: &MoveRequest) -> Result<MoveTask, MoveError> {
        let project = &*self.project;

        if !request.file_path.exists() {
            return Err(MoveError::FileNotFoundOnDisk(request.file_path.clone()));
        }
        let file_path = paths::absolute(&request.file_path)
            .map_err(|_| MoveError::FileNotFoundOnDisk(request.file_path.clone()))?;

        info!("Attempting to find file matching path '{}'", file_path.display());
        if project.find_file(&file_path).is_none() {
            return Err(MoveError::FileNotFoundInProject(request.file_path.clone()));
        }

        let from_target = project
            .native_target_named(&request.from_target)
            .ok_or_else(|| MoveError::TargetNotFound(request.from_target.clone()))?;
        let to_target = project
            .native_target_named(&request.to_target)
            .ok_or_else(|| MoveError::TargetNotFound(request.to_target.clone()))?;
        if from_target == to_target {
            return Err(MoveError::SameTarget);
        }

        let group_name = request.destination_group_name();
        let to_group = match project.groups_named(group_name).as_slice() {
            [] => return Err(MoveError::GroupNotFound(group_name.to_string())),
            [group] => group.to_string(),
            groups => {
                return Err(MoveError::GroupAmbiguous {
                    name: group_name.to_string(),
                    count: groups.len(),
                });
            }
        };

        let memberships = self.find_memberships(from_target, &file_path);
        if memberships.is_empty() {
            return Err(MoveError::MembershipNotFound {
                file: request.file_path.clone(),
                target: request.from_target.clone(),
            });
        }
        let phase_names: Vec<&str> = memberships.iter().map(|m| m.kind.display_name()).collect();
        info!(
            "Found '{}' in these build phases: {}",
            request.file_path.display(),
            phase_names.join(", ")
        );

        let destination = self.resolve_destination(&to_group, &file_path)?;
        for path in [&file_path, &destination] {
            if !self.config.is_path_allowed(path, project.source_root()) {
                return Err(MoveError::OutsideAllowedScope(path.clone()));
            }
        }

        Ok(MoveTask {
            file_path,
            to_target: to_target.to_string(),
            to_group,
            destination,
            memberships,
        })
    }

    /// Applies a validated task membership by membership.
    ///
    /// A failure part way leaves the memberships already handled mutated in
    /// memory and on disk; nothing is rolled back.
    pub fn execute(&mut self, task: &MoveTask) -> Result<MoveOutcome, MoveError> {
        info!(
            "Attempting to move file '{}' to group '{}' of target '{}'",
            task.file_path.display(),
            self.project.display_name(&task.to_group),
            self.project.display_name(&task.to_target)
        );

        let mut moved_from: HashSet<PathBuf> = HashSet::new();
        for membership in &task.memberships {
            let old_path = self
                .project
                .real_path(&membership.file_ref)
                .ok_or_else(|| MoveError::FileNotFoundInProject(task.file_path.clone()))?;

            let removed = self
                .project
                .remove_file_reference(&membership.phase, &membership.file_ref)?;
            debug!(
                phase = %membership.phase,
                removed,
                "detached file reference from {}",
                membership.kind
            );

            self.project
                .move_to_group(&membership.file_ref, &task.to_group)?;

            // A file listed in both phases is renamed once; later memberships
            // already resolve to the destination.
            if old_path != task.destination && moved_from.insert(old_path.clone()) {
                fs::rename(&old_path, &task.destination).map_err(|source| MoveError::DiskMove {
                    from: old_path.clone(),
                    to: task.destination.clone(),
                    source,
                })?;
                info!(
                    "Moved '{}' to '{}'",
                    old_path.display(),
                    task.destination.display()
                );
            }

            let kind = self
                .project
                .phase_kind(&membership.phase)
                .filter(|kind| *kind == membership.kind)
                .ok_or_else(|| {
                    MoveError::UnknownPhaseType(
                        self.project
                            .isa(&membership.phase)
                            .unwrap_or(&membership.phase)
                            .to_string(),
                    )
                })?;
            let build_file = self
                .project
                .add_file_reference(&task.to_target, kind, &membership.file_ref)?;
            debug!(build_file = %build_file, "attached file reference to {kind}");
        }

        Ok(MoveOutcome {
            destination: task.destination.clone(),
            phases: task.memberships.iter().map(|m| m.kind).collect(),
        })
    }

    fn find_memberships(&self, target: &str, file_path: &Path) -> Vec<Membership> {
        let project = &*self.project;
        SEARCHED_PHASES
            .iter()
            .filter_map(|&kind| {
                let phase = project.build_phase(target, kind)?;
                let file_ref = project
                    .phase_file_references(phase)
                    .into_iter()
                    .find(|file_ref| project.real_path(file_ref).as_deref() == Some(file_path))?;
                Some(Membership {
                    phase: phase.to_string(),
                    kind,
                    file_ref: file_ref.to_string(),
                })
            })
            .collect()
    }

    fn resolve_destination(&self, group: &str, file_path: &Path) -> Result<PathBuf, MoveError> {
        let directory = self
            .project
            .real_path(group)
            .ok_or_else(|| MoveError::GroupPathUnresolved(self.project.display_name(group)))?;
        if !directory.is_dir() {
            return Err(MoveError::DestinationDirectoryMissing(directory));
        }

        let file_name = file_path
            .file_name()
            .ok_or_else(|| MoveError::FileNotFoundOnDisk(file_path.to_path_buf()))?;
        let destination = directory.join(file_name);
        if destination != file_path && fs::symlink_metadata(&destination).is_ok() {
            return Err(MoveError::DestinationOccupied(destination));
        }

        Ok(destination)
    }
}
