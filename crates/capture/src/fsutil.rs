//! Directory helpers used before any network traffic happens.
use std::fs::DirBuilder;
use std::io;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use tracing::trace;

/// Make sure `path` exists as a directory, creating missing ancestors.
///
/// A path with no separator at all is a bare name and is left alone: the call
/// succeeds without touching the filesystem. Existing paths are not modified.
/// New directories get mode `0o777` (minus umask) on Unix. OS errors are
/// returned as-is.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    trace!(path = %path.display(), "ensuring directory exists");

    if !has_separator(path) {
        trace!(path = %path.display(), "no separator in path, nothing to create");
        return Ok(());
    }

    if path.exists() {
        trace!(path = %path.display(), "directory already exists");
        return Ok(());
    }

    trace!(path = %path.display(), "creating directory tree");
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o777);
    }
    builder.create(path)
}

/// Directory part of a mirror path, suitable for [`ensure_dir`].
///
/// Keeps a trailing separator whenever the path has a directory component so
/// `www/latest.jpg` yields `www/` (which `ensure_dir` will create) while a bare
/// `latest.jpg` yields an empty path (which it will not).
pub fn mirror_parent(save_to: &Path) -> PathBuf {
    match save_to.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(""),
        _ => PathBuf::new(),
    }
}

fn has_separator(path: &Path) -> bool {
    let raw = path.as_os_str().to_string_lossy();
    #[cfg(windows)]
    {
        raw.contains(MAIN_SEPARATOR) || raw.contains('/')
    }
    #[cfg(not(windows))]
    {
        raw.contains(MAIN_SEPARATOR)
    }
}
