//! Where the indexing pipeline gets its files from.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Cursor};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::FileId;

/// Capability to enumerate and read the files of one directory.
pub trait DirectorySource {
    fn is_dir(&self, path: &Path) -> bool;

    /// Regular files directly inside `dir`, sorted by path. Not recursive.
    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    fn open(&self, path: &Path) -> io::Result<Box<dyn BufRead + '_>>;

    /// Stable identifier for `path` within a session.
    fn file_id(&self, path: &Path) -> FileId {
        path.to_string_lossy().into_owned()
    }
}

/// The real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSource;

impl DirectorySource for FsSource {
    fn is_dir(&self, path: &Path) -> bool { path.is_dir() }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            // follows symlinks to regular files
            if entry.path().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn BufRead + '_>> {
        let f = File::open(path)?;
        Ok(Box::new(BufReader::new(f)))
    }

    fn file_id(&self, path: &Path) -> FileId {
        fs::canonicalize(path)
            .unwrap_or_else(|_| path.to_path_buf())
            .to_string_lossy()
            .into_owned()
    }
}

/// In-memory `{path -> content}` fake. A path maps to a directory when some
/// file lives beneath it, or when it was added with [`MemorySource::with_dir`].
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: Vec<PathBuf>,
    unreadable: Vec<PathBuf>,
}

impl MemorySource {
    pub fn new() -> Self { Self::default() }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.dirs.push(path.into());
        self
    }

    /// A file that is listed but fails to open with `PermissionDenied`.
    pub fn with_unreadable(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.files.insert(path.clone(), Vec::new());
        self.unreadable.push(path);
        self
    }
}

impl DirectorySource for MemorySource {
    fn is_dir(&self, path: &Path) -> bool {
        self.dirs.iter().any(|d| d == path)
            || self.files.keys().any(|f| f.parent() == Some(path))
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        // BTreeMap keys are already sorted
        Ok(self
            .files
            .keys()
            .filter(|f| f.parent() == Some(dir))
            .cloned()
            .collect())
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn BufRead + '_>> {
        if self.unreadable.iter().any(|p| p == path) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"));
        }
        match self.files.get(path) {
            Some(bytes) => Ok(Box::new(Cursor::new(bytes.as_slice()))),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "no such file")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_source_lists_direct_children_only() {
        let src = MemorySource::new()
            .with_file("/data/b.txt", "b")
            .with_file("/data/a.txt", "a")
            .with_file("/data/nested/c.txt", "c");
        let files = src.list_files(Path::new("/data")).unwrap();
        assert_eq!(files, vec![PathBuf::from("/data/a.txt"), PathBuf::from("/data/b.txt")]);
        assert!(src.is_dir(Path::new("/data/nested")));
        assert!(!src.is_dir(Path::new("/data/a.txt")));
    }

    #[test]
    fn memory_source_empty_dir() {
        let src = MemorySource::new().with_dir("/empty");
        assert!(src.is_dir(Path::new("/empty")));
        assert!(src.list_files(Path::new("/empty")).unwrap().is_empty());
    }

    #[test]
    fn fs_source_skips_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("z.txt"), "z").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("inner.txt"), "inner").unwrap();

        let files = FsSource.list_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.txt", "z.txt"]);
    }
}
