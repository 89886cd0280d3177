use std::io;
use std::path::{Component, Path, PathBuf};

/// Resolves a path to an absolute, component-normalized form.
///
/// Unlike `fs::canonicalize` this does not require the path to exist,
/// which matters because `open` targets a clear path that is currently
/// absent. Relative paths are anchored at the current working directory;
/// `.` and `..` components are folded out lexically.
pub fn absolute(path: &Path) -> io::Result<PathBuf> {
    let anchored = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut resolved = PathBuf::new();
    for component in anchored.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
    }
    Ok(resolved)
}

/// Whether `path` lives under `ancestor` (strictly below it).
pub fn is_descendant(path: &Path, ancestor: &Path) -> bool {
    path != ancestor && path.starts_with(ancestor)
}
