//! Object-graph view over an Xcode project bundle.
//!
//! `Project` resolves targets, groups, build phases and file references by
//! object ID and applies the few mutations a file move needs. Everything
//! else in the descriptor is carried through untouched.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::paths;
use crate::pbxproj::{Dictionary, Document, DocumentError, Value};

mod phase;

pub use phase::PhaseKind;

/// File name of the descriptor inside an `.xcodeproj` bundle.
pub const DESCRIPTOR_NAME: &str = "project.pbxproj";

const MAIN_GROUP_NAME: &str = "Main Group";

const GROUP_ISAS: &[&str] = &["PBXGroup", "PBXVariantGroup", "XCVersionGroup"];

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("cannot read project '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse project '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: DocumentError,
    },
    #[error("project '{}' is malformed: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },
    #[error("object '{0}' not found in project")]
    MissingObject(String),
    #[error("cannot write project '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug)]
pub struct Project {
    descriptor_path: PathBuf,
    source_root: PathBuf,
    document: Document,
    root_object: String,
    parents: HashMap<String, String>,
}

impl Project {
    /// Opens a project from either the `.xcodeproj` bundle or the
    /// `project.pbxproj` file inside it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let path = path.as_ref();
        let absolute = paths::absolute(path).map_err(|source| ProjectError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let descriptor_path = if absolute.is_dir() {
            absolute.join(DESCRIPTOR_NAME)
        } else {
            absolute
        };

        let content =
            fs::read_to_string(&descriptor_path).map_err(|source| ProjectError::Read {
                path: descriptor_path.clone(),
                source,
            })?;
        let document = Document::parse(&content).map_err(|source| ProjectError::Parse {
            path: descriptor_path.clone(),
            source,
        })?;

        let malformed = |reason: &str| ProjectError::Malformed {
            path: descriptor_path.clone(),
            reason: reason.to_string(),
        };
        let root_object = document
            .root
            .get_str("rootObject")
            .ok_or_else(|| malformed("missing rootObject"))?
            .to_string();
        let project_dir = document
            .objects
            .get(&root_object)
            .ok_or_else(|| malformed("rootObject does not name an object"))?
            .get_str("projectDirPath")
            .unwrap_or("");
        let bundle_parent = descriptor_path
            .parent()
            .and_then(Path::parent)
            .ok_or_else(|| malformed("descriptor is not inside a project bundle"))?;
        let source_root = paths::normalize_lexically(&bundle_parent.join(project_dir));

        let mut project = Self {
            descriptor_path,
            source_root,
            document,
            root_object,
            parents: HashMap::new(),
        };
        project.index_parents();
        debug!(
            objects = project.document.objects.len(),
            source_root = %project.source_root.display(),
            "opened project"
        );
        Ok(project)
    }

    /// Writes the object graph back to the descriptor file, first copying the
    /// current file to `project.pbxproj.bak` when `backup` is set.
    pub fn save(&self, backup: bool) -> Result<(), ProjectError> {
        let write_error = |source| ProjectError::Write {
            path: self.descriptor_path.clone(),
            source,
        };

        if backup && self.descriptor_path.exists() {
            fs::copy(&self.descriptor_path, self.backup_path()).map_err(write_error)?;
        }

        let content = self.document.to_pbxproj(&self.annotations());
        fs::write(&self.descriptor_path, content).map_err(write_error)?;
        debug!(path = %self.descriptor_path.display(), "saved project");
        Ok(())
    }

    /// Path of the `project.pbxproj` file this project was opened from.
    pub fn descriptor_path(&self) -> &Path {
        &self.descriptor_path
    }

    /// Where `save(true)` copies the previous descriptor.
    pub fn backup_path(&self) -> PathBuf {
        self.descriptor_path.with_extension("pbxproj.bak")
    }

    /// Directory that `SOURCE_ROOT` and the main group resolve against.
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Raw object dictionary for an ID.
    pub fn object(&self, id: &str) -> Option<&Dictionary> {
        self.document.objects.get(id)
    }

    fn object_mut(&mut self, id: &str) -> Result<&mut Dictionary, ProjectError> {
        self.document
            .objects
            .get_mut(id)
            .ok_or_else(|| ProjectError::MissingObject(id.to_string()))
    }

    /// Object type such as `PBXGroup` or `PBXNativeTarget`.
    pub fn isa(&self, id: &str) -> Option<&str> {
        self.object(id).and_then(|object| object.get_str("isa"))
    }

    /// Root of the group tree; it resolves to the source root.
    pub fn main_group(&self) -> Option<&str> {
        self.object(&self.root_object)
            .and_then(|root| root.get_str("mainGroup"))
    }

    /// Group that lists `id` among its children.
    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.parents.get(id).map(String::as_str)
    }

    /// Every `PBXFileReference` reachable from the main group, in tree order.
    pub fn files(&self) -> Vec<&str> {
        self.walk()
            .into_iter()
            .filter(|id| self.isa(id) == Some("PBXFileReference"))
            .collect()
    }

    /// Every `PBXGroup` reachable from the main group, in tree order.
    pub fn groups(&self) -> Vec<&str> {
        self.walk()
            .into_iter()
            .filter(|id| self.isa(id) == Some("PBXGroup"))
            .collect()
    }

    /// Groups whose display name equals `name`, in tree order.
    pub fn groups_named(&self, name: &str) -> Vec<&str> {
        self.groups()
            .into_iter()
            .filter(|id| self.display_name(id) == name)
            .collect()
    }

    /// Targets of type `PBXNativeTarget`, in the project's target order.
    pub fn native_targets(&self) -> Vec<&str> {
        let Some(root) = self.object(&self.root_object) else {
            return Vec::new();
        };
        root.str_items("targets")
            .filter(|id| self.isa(id) == Some("PBXNativeTarget"))
            .collect()
    }

    /// First native target with the given `name`.
    pub fn native_target_named(&self, name: &str) -> Option<&str> {
        self.native_targets()
            .into_iter()
            .find(|id| self.object(id).and_then(|t| t.get_str("name")) == Some(name))
    }

    /// First file reference whose resolved path equals `path`.
    pub fn find_file(&self, path: &Path) -> Option<&str> {
        self.files()
            .into_iter()
            .find(|id| self.real_path(id).as_deref() == Some(path))
    }

    /// Name shown for an object in Xcode's navigator and in descriptor
    /// comments. An unnamed main group is shown as `Main Group`.
    pub fn display_name(&self, id: &str) -> String {
        let Some(object) = self.object(id) else {
            return String::new();
        };
        if let Some(name) = object.get_str("name") {
            return name.to_string();
        }
        if let Some(path) = object.get_str("path") {
            return Path::new(path)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string());
        }
        if Some(id) == self.main_group() {
            return MAIN_GROUP_NAME.to_string();
        }

        let isa = object.get_str("isa").unwrap_or("");
        if let Some(kind) = PhaseKind::from_isa(isa) {
            return kind.display_name().to_string();
        }
        match isa {
            "PBXFrameworksBuildPhase" => "Frameworks",
            "PBXHeadersBuildPhase" => "Headers",
            "PBXCopyFilesBuildPhase" => "CopyFiles",
            "PBXShellScriptBuildPhase" => "ShellScript",
            "PBXProject" => "Project object",
            _ => "",
        }
        .to_string()
    }

    /// Absolute on-disk location of a file reference or group, derived from
    /// its `sourceTree` and the path segments of its enclosing groups.
    ///
    /// Returns `None` for trees that depend on build settings
    /// (`BUILT_PRODUCTS_DIR`, `SDKROOT`, ...) and for objects detached from
    /// the main group.
    pub fn real_path(&self, id: &str) -> Option<PathBuf> {
        let mut segments = Vec::new();
        let mut seen = HashSet::new();
        let mut current = id;

        let base = loop {
            if !seen.insert(current) {
                return None;
            }
            let object = self.object(current)?;
            segments.push(object.get_str("path").unwrap_or(""));

            match object.get_str("sourceTree").unwrap_or("<group>") {
                "<group>" => match self.parent_of(current) {
                    Some(parent) => current = parent,
                    None if Some(current) == self.main_group() => {
                        break self.source_root.clone();
                    }
                    None => return None,
                },
                "SOURCE_ROOT" => break self.source_root.clone(),
                "<absolute>" => break PathBuf::from("/"),
                _ => return None,
            }
        };

        let mut resolved = base;
        for segment in segments.iter().rev() {
            resolved.push(segment);
        }
        Some(paths::normalize_lexically(&resolved))
    }

    /// First build phase of `kind` in the target's phase list.
    pub fn build_phase(&self, target: &str, kind: PhaseKind) -> Option<&str> {
        self.object(target)?
            .str_items("buildPhases")
            .find(|phase| self.isa(phase) == Some(kind.isa()))
    }

    /// `None` for phase types a move never touches.
    pub fn phase_kind(&self, phase: &str) -> Option<PhaseKind> {
        self.isa(phase).and_then(PhaseKind::from_isa)
    }

    /// File references of a build phase, one per build file.
    pub fn phase_file_references(&self, phase: &str) -> Vec<&str> {
        let Some(object) = self.object(phase) else {
            return Vec::new();
        };
        object
            .str_items("files")
            .filter_map(|build_file| self.object(build_file)?.get_str("fileRef"))
            .collect()
    }

    /// Removes every build file in `phase` that points at `file_ref` and
    /// deletes those build-file objects. Returns how many were removed.
    pub fn remove_file_reference(
        &mut self,
        phase: &str,
        file_ref: &str,
    ) -> Result<usize, ProjectError> {
        let build_files: Vec<String> = self
            .object(phase)
            .ok_or_else(|| ProjectError::MissingObject(phase.to_string()))?
            .str_items("files")
            .filter(|build_file| {
                self.object(build_file)
                    .and_then(|object| object.get_str("fileRef"))
                    == Some(file_ref)
            })
            .map(str::to_string)
            .collect();

        if let Some(files) = self.object_mut(phase)?.get_array_mut("files") {
            files.retain(|item| {
                item.as_str()
                    .is_none_or(|id| !build_files.iter().any(|removed| removed == id))
            });
        }
        for id in &build_files {
            self.document.objects.remove(id);
        }

        Ok(build_files.len())
    }

    /// Re-parents a file reference under `group`.
    ///
    /// The reference becomes group-relative with its file name as path, so
    /// its resolved location is `<group directory>/<file name>`.
    pub fn move_to_group(&mut self, file_ref: &str, group: &str) -> Result<(), ProjectError> {
        if self.object(group).is_none() {
            return Err(ProjectError::MissingObject(group.to_string()));
        }
        let file_name = self
            .object(file_ref)
            .ok_or_else(|| ProjectError::MissingObject(file_ref.to_string()))?
            .get_str("path")
            .and_then(|path| Path::new(path).file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| ProjectError::Malformed {
                path: self.descriptor_path.clone(),
                reason: format!("file reference '{file_ref}' has no path"),
            })?;

        let former_parents: Vec<String> = self
            .document
            .objects
            .iter()
            .filter(|(_, object)| is_group(object))
            .filter(|(_, object)| object.str_items("children").any(|child| child == file_ref))
            .map(|(id, _)| id.clone())
            .collect();
        for parent in &former_parents {
            if let Some(children) = self.object_mut(parent)?.get_array_mut("children") {
                children.retain(|child| child.as_str() != Some(file_ref));
            }
        }

        push_item(self.object_mut(group)?, "children", file_ref);

        let file = self.object_mut(file_ref)?;
        file.insert("path", file_name);
        file.insert("sourceTree", "<group>");
        self.parents.insert(file_ref.to_string(), group.to_string());
        Ok(())
    }

    /// Adds `file_ref` to the target's build phase of `kind`, creating that
    /// phase when the target has none. Returns the new build file's ID.
    pub fn add_file_reference(
        &mut self,
        target: &str,
        kind: PhaseKind,
        file_ref: &str,
    ) -> Result<String, ProjectError> {
        let phase = match self.build_phase(target, kind) {
            Some(phase) => phase.to_string(),
            None => self.add_build_phase(target, kind)?,
        };

        let build_file = self.generate_id();
        let mut object = Dictionary::new();
        object.insert("isa", "PBXBuildFile");
        object.insert("fileRef", file_ref);
        self.document.objects.insert(build_file.clone(), object);

        push_item(self.object_mut(&phase)?, "files", &build_file);
        Ok(build_file)
    }

    fn add_build_phase(&mut self, target: &str, kind: PhaseKind) -> Result<String, ProjectError> {
        if self.object(target).is_none() {
            return Err(ProjectError::MissingObject(target.to_string()));
        }

        let id = self.generate_id();
        let mut phase = Dictionary::new();
        phase.insert("isa", kind.isa());
        phase.insert("buildActionMask", "2147483647");
        phase.insert("files", Vec::<Value>::new());
        phase.insert("runOnlyForDeploymentPostprocessing", "0");
        self.document.objects.insert(id.clone(), phase);

        push_item(self.object_mut(target)?, "buildPhases", &id);
        debug!(target_id = target, phase = %id, "created {kind} build phase");
        Ok(id)
    }

    /// Returns a fresh 24-digit uppercase hex object ID.
    pub fn generate_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().simple().to_string().to_uppercase()[..24].to_string();
            if !self.document.objects.contains_key(&id) {
                return id;
            }
        }
    }

    fn index_parents(&mut self) {
        self.parents.clear();
        for (id, object) in &self.document.objects {
            if is_group(object) {
                for child in object.str_items("children") {
                    self.parents.insert(child.to_string(), id.clone());
                }
            }
        }
    }

    /// Preorder walk of the group tree starting at the main group.
    fn walk(&self) -> Vec<&str> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut stack: Vec<&str> = self.main_group().into_iter().collect();

        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            order.push(id);
            if let Some(object) = self.object(id).filter(|object| is_group(object)) {
                let children: Vec<&str> = object.str_items("children").collect();
                stack.extend(children.into_iter().rev());
            }
        }

        order
    }

    /// Comments written after object IDs, the way Xcode annotates them.
    fn annotations(&self) -> HashMap<String, String> {
        let objects = &self.document.objects;

        let mut phase_of: HashMap<&str, &str> = HashMap::new();
        let mut list_owner: HashMap<&str, &str> = HashMap::new();
        for (id, object) in objects {
            if object
                .get_str("isa")
                .is_some_and(|isa| isa.ends_with("BuildPhase"))
            {
                for build_file in object.str_items("files") {
                    phase_of.insert(build_file, id.as_str());
                }
            }
            if let Some(list) = object.get_str("buildConfigurationList") {
                list_owner.insert(list, id.as_str());
            }
        }

        let mut annotations = HashMap::new();
        for (id, object) in objects {
            let isa = object.get_str("isa").unwrap_or("");
            let comment = match isa {
                "PBXBuildFile" => {
                    let file = object
                        .get_str("fileRef")
                        .or_else(|| object.get_str("productRef"))
                        .map(|file| self.display_name(file))
                        .unwrap_or_default();
                    match phase_of.get(id.as_str()) {
                        Some(phase) => format!("{file} in {}", self.display_name(phase)),
                        None => file,
                    }
                }
                "XCConfigurationList" => match list_owner.get(id.as_str()) {
                    Some(owner) => {
                        let owner_isa = self.isa(owner).unwrap_or("");
                        let owner_name = if owner_isa == "PBXProject" {
                            self.bundle_name()
                        } else {
                            self.display_name(owner)
                        };
                        format!("Build configuration list for {owner_isa} \"{owner_name}\"")
                    }
                    None => String::new(),
                },
                "PBXTargetDependency" | "PBXContainerItemProxy" => isa.to_string(),
                // Xcode leaves the main group unannotated.
                _ if Some(id.as_str()) == self.main_group() => String::new(),
                _ => self.display_name(id),
            };
            if !comment.is_empty() {
                annotations.insert(id.clone(), comment);
            }
        }

        annotations
    }

    fn bundle_name(&self) -> String {
        self.descriptor_path
            .parent()
            .and_then(Path::file_stem)
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

fn is_group(object: &Dictionary) -> bool {
    object
        .get_str("isa")
        .is_some_and(|isa| GROUP_ISAS.contains(&isa))
}

fn push_item(object: &mut Dictionary, key: &str, item: &str) {
    if object.get_array(key).is_none() {
        object.insert(key, Vec::<Value>::new());
    }
    if let Some(items) = object.get_array_mut(key) {
        items.push(Value::from(item));
    }
}
