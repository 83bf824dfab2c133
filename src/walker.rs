//! Tree walker: deterministic, read-only enumeration of candidate files.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::Error;
use crate::types::SourceFile;

/// A file selected for extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Path usable for opening the file.
    pub absolute: PathBuf,
    /// Path relative to the project directory, used in every report line.
    pub relative: PathBuf,
}

impl Candidate {
    /// Read and decode the file. Unreadable or non-UTF-8 files are logged and
    /// yield `None`; one bad file never aborts the scan.
    pub fn load(&self) -> Option<SourceFile> {
        let bytes = match std::fs::read(&self.absolute) {
            Err(e) => {
                tracing::warn!(file = %self.relative.display(), error = %e, "skipping unreadable file");
                return None;
            },
            Ok(b) => b,
        };
        return match String::from_utf8(bytes) {
            Err(e) => {
                tracing::warn!(file = %self.relative.display(), error = %e, "skipping file that is not valid UTF-8");
                None
            },
            Ok(text) => Some(SourceFile {
                path: self.relative.clone(),
                text,
            }),
        };
    }
}

/// Check that the root exists and can be listed, before anything is scanned.
///
/// # Errors
///
/// Returns `Error::RootNotFound`, `Error::RootNotDirectory`, or
/// `Error::RootUnreadable`.
fn ensure_readable_root(root: &Path) -> Result<(), Error> {
    let metadata = match std::fs::metadata(root) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::RootNotFound { path: root.to_path_buf() });
        },
        Err(source) => {
            return Err(Error::RootUnreadable {
                path: root.to_path_buf(),
                source,
            });
        },
        Ok(m) => m,
    };
    if !metadata.is_dir() {
        return Err(Error::RootNotDirectory { path: root.to_path_buf() });
    }
    if let Err(source) = std::fs::read_dir(root) {
        return Err(Error::RootUnreadable {
            path: root.to_path_buf(),
            source,
        });
    }
    return Ok(());
}

/// Whether a walk entry is a directory named in the prune list. The root
/// itself is never pruned.
fn is_pruned(entry: &DirEntry, prune_dirs: &[String]) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    return prune_dirs.iter().any(|p| return p.as_str() == name.as_ref());
}

/// Enumerate every file under `root` whose name ends with one of
/// `extensions`, skipping directories named in `prune_dirs` at any depth.
///
/// Entries are visited depth-first with siblings sorted by name, so the
/// order is stable across runs and platforms. Relative paths are computed
/// against `project`. Subdirectories that cannot be read are logged and
/// skipped.
///
/// # Errors
///
/// Returns an error only when the root itself is missing, not a directory,
/// or unreadable.
pub fn walk(
    root: &Path,
    project: &Path,
    extensions: &[String],
    prune_dirs: &[String],
) -> Result<Vec<Candidate>, Error> {
    ensure_readable_root(root)?;

    let mut candidates = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| return !is_pruned(e, prune_dirs));

    for entry in walker {
        let entry = match entry {
            Err(e) => {
                let at = e.path().map(|p| return p.display().to_string()).unwrap_or_default();
                tracing::warn!(path = %at, error = %e, "skipping unreadable entry");
                continue;
            },
            Ok(entry) => entry,
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !extensions.iter().any(|ext| return name.ends_with(ext.as_str())) {
            continue;
        }
        let absolute = entry.into_path();
        let relative = absolute.strip_prefix(project).unwrap_or(&absolute).to_path_buf();
        candidates.push(Candidate { absolute, relative });
    }

    tracing::debug!(root = %root.display(), files = candidates.len(), "walked source tree");
    return Ok(candidates);
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "export {};\n").unwrap();
    }

    fn defaults() -> (Vec<String>, Vec<String>) {
        let exts = [".tsx", ".ts"].iter().map(|s| s.to_string()).collect();
        let prune = ["node_modules", ".git"].iter().map(|s| s.to_string()).collect();
        (exts, prune)
    }

    #[test]
    fn file_as_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "App.tsx");
        let (exts, prune) = defaults();
        let result = walk(&dir.path().join("App.tsx"), dir.path(), &exts, &prune);
        assert!(matches!(result, Err(Error::RootNotDirectory { .. })));
    }

    #[test]
    fn missing_root_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let (exts, prune) = defaults();
        let result = walk(&dir.path().join("src"), dir.path(), &exts, &prune);
        assert!(matches!(result, Err(Error::RootNotFound { .. })));
    }

    #[test]
    fn non_utf8_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.tsx");
        std::fs::write(&path, [0xff_u8, 0xfe, 0x00]).unwrap();
        let candidate = Candidate {
            absolute: path,
            relative: PathBuf::from("bad.tsx"),
        };
        assert!(candidate.load().is_none());
    }

    #[test]
    fn prunes_housekeeping_dirs_at_any_depth() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "src/App.tsx");
        touch(dir.path(), "src/node_modules/lib/index.ts");
        touch(dir.path(), "src/pages/.git/hooks/x.ts");
        touch(dir.path(), "src/pages/Home.tsx");
        let (exts, prune) = defaults();
        let files = walk(&dir.path().join("src"), dir.path(), &exts, &prune).unwrap();
        let rel: Vec<PathBuf> = files.into_iter().map(|c| c.relative).collect();
        assert_eq!(rel, vec![PathBuf::from("src/App.tsx"), PathBuf::from("src/pages/Home.tsx")]);
    }

    #[test]
    fn order_is_sorted_depth_first_and_filtered_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "src/b.ts");
        touch(dir.path(), "src/a/z.tsx");
        touch(dir.path(), "src/a/y.css");
        touch(dir.path(), "src/c.tsx");
        let (exts, prune) = defaults();
        let files = walk(&dir.path().join("src"), dir.path(), &exts, &prune).unwrap();
        let rel: Vec<PathBuf> = files.into_iter().map(|c| c.relative).collect();
        assert_eq!(
            rel,
            vec![
                PathBuf::from("src/a/z.tsx"),
                PathBuf::from("src/b.ts"),
                PathBuf::from("src/c.tsx"),
            ]
        );
    }
}
