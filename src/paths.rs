use std::path::{Component, Path, PathBuf};

/// Resolves `.` and `..` lexically so paths can be compared without touching
/// the filesystem.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(Path::new("/")),
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(name) => normalized.push(name),
        }
    }

    normalized
}

/// Makes `path` absolute against the current directory and normalizes it.
///
/// Symlinks are not resolved, matching how project paths are derived from
/// the group tree.
pub fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    Ok(normalize_lexically(&std::path::absolute(path)?))
}
