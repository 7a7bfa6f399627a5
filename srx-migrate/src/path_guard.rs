use std::io;
use std::path::{Path, PathBuf};

/// Whether `output` names the same file as `input`.
pub fn is_same_path(output: &Path, input: &Path) -> io::Result<bool> {
    Ok(normalize_for_compare(output)? == normalize_for_compare(input)?)
}

/// Absolute form of `path` for equality checks between paths that may not
/// exist yet.
pub(crate) fn normalize_for_compare(path: &Path) -> io::Result<PathBuf> {
    if path.exists() {
        // canonicalize resolves symlinks and `..` for paths that exist on disk.
        return path.canonicalize();
    }

    // A file about to be created in an existing directory.
    if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
        if !parent.as_os_str().is_empty() && parent.exists() {
            return Ok(parent.canonicalize()?.join(name));
        }
    }

    // Otherwise `..` segments are not resolved; `.` segments compare equal.
    let base = if path.is_absolute() {
        PathBuf::new()
    } else {
        std::env::current_dir()?
    };

    Ok(base.join(path))
}
