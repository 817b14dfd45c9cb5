//! Local filesystem adapter using std::fs.

use std::io;
use std::path::{Path, PathBuf};

use appstrap_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{AppstrapError, AppstrapResult},
};
use walkdir::WalkDir;

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    pub fn new() -> Self {
        Self
    }

    fn ensure_parent(path: &Path) -> AppstrapResult<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
                .map_err(|e| map_io_error(parent, e, "create directory")),
            _ => Ok(()),
        }
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> AppstrapResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn read_to_string(&self, path: &Path) -> AppstrapResult<String> {
        std::fs::read_to_string(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn write_file(&self, path: &Path, content: &str) -> AppstrapResult<()> {
        Self::ensure_parent(path)?;
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn copy_file(&self, from: &Path, to: &Path) -> AppstrapResult<()> {
        Self::ensure_parent(to)?;
        std::fs::copy(from, to)
            .map(|_| ())
            .map_err(|e| map_io_error(from, e, &format!("copy to {}", to.display())))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_files(&self, dir: &Path) -> AppstrapResult<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                ApplicationError::filesystem(path, e)
            })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> AppstrapError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {operation}: {e}"),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_creates_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let path = tmp.path().join("config/initializers/app.rb");

        fs.write_file(&path, "# app").unwrap();
        assert_eq!(fs.read_to_string(&path).unwrap(), "# app");
    }

    #[test]
    fn list_files_is_recursive_and_sorted() {
        let tmp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        fs.write_file(&tmp.path().join("db/migrate/b.rb"), "").unwrap();
        fs.write_file(&tmp.path().join("db/migrate/a.rb"), "").unwrap();
        fs.create_dir_all(&tmp.path().join("db/migrate/empty")).unwrap();

        let files = fs.list_files(&tmp.path().join("db/migrate")).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.rb", "b.rb"]);
    }

    #[test]
    fn list_files_of_missing_directory_is_empty() {
        let tmp = TempDir::new().unwrap();
        let files = LocalFilesystem::new()
            .list_files(&tmp.path().join("nope"))
            .unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn read_of_missing_file_names_the_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Gemfile");
        let err = LocalFilesystem::new().read_to_string(&path).unwrap_err();
        assert!(err.to_string().contains("Gemfile"));
    }

    #[test]
    fn copy_preserves_bytes() {
        let tmp = TempDir::new().unwrap();
        let from = tmp.path().join("logo.png");
        std::fs::write(&from, [0x89, 0x50, 0x4e, 0x47, 0x00, 0xff]).unwrap();
        let to = tmp.path().join("app/assets/images/logo.png");

        LocalFilesystem::new().copy_file(&from, &to).unwrap();
        assert_eq!(std::fs::read(&to).unwrap(), [0x89, 0x50, 0x4e, 0x47, 0x00, 0xff]);
    }
}
