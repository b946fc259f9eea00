//! Input file discovery.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Find every file matching `pattern` inside any of `dirs`.
///
/// Directories that do not exist are ignored. The result is sorted and
/// deduplicated so that overlapping directories do not read a file twice.
///
/// # Errors
///
/// Returns [`Error::NoInputFilesFound`] if nothing matched, or
/// [`Error::Pattern`] if the pattern is not a valid glob.
pub fn discover<P: AsRef<Path>>(dirs: &[P], pattern: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for dir in dirs {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            tracing::debug!("Input directory {} does not exist", dir.display());
            continue;
        }

        // Only `pattern` is a glob; the directory is matched literally.
        let base = glob::Pattern::escape(&dir.to_string_lossy());
        let full = Path::new(&base).join(pattern);
        for entry in glob::glob(&full.to_string_lossy())? {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => tracing::debug!("Unreadable glob entry: {e}"),
            }
        }
    }

    files.sort();
    files.dedup();

    if files.is_empty() {
        return Err(Error::NoInputFilesFound {
            pattern: pattern.to_string(),
            dirs: dirs.iter().map(|d| d.as_ref().to_path_buf()).collect(),
        });
    }

    tracing::info!("Found {} file(s) matching {}", files.len(), pattern);
    Ok(files)
}
