//! In-memory doubles for the ports, shared by this crate's tests and, via
//! the `testing` feature, by downstream crates.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, TemplateRenderer},
    },
    domain::RenderContext,
    error::AppstrapResult,
};

/// In-memory filesystem. Clones share one tree.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<Tree>>,
}

#[derive(Debug, Default)]
struct Tree {
    files: BTreeMap<PathBuf, String>,
    directories: BTreeSet<PathBuf>,
    writes: usize,
}

impl Tree {
    fn add_ancestors(&mut self, path: &Path) {
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.directories.insert(ancestor.to_path_buf());
        }
    }
}

impl MemoryFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file without counting it as a write.
    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        if let Ok(mut tree) = self.inner.write() {
            let path = path.as_ref();
            tree.add_ancestors(path);
            tree.files.insert(path.to_path_buf(), content.to_string());
        }
    }

    /// Seed an empty directory.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        if let Ok(mut tree) = self.inner.write() {
            let path = path.as_ref();
            tree.add_ancestors(path);
            tree.directories.insert(path.to_path_buf());
        }
    }

    pub fn with_file(self, path: impl AsRef<Path>, content: &str) -> Self {
        self.add_file(path, content);
        self
    }

    pub fn with_dir(self, path: impl AsRef<Path>) -> Self {
        self.add_dir(path);
        self
    }

    pub fn read_file(&self, path: impl AsRef<Path>) -> Option<String> {
        let tree = self.inner.read().ok()?;
        tree.files.get(path.as_ref()).cloned()
    }

    /// All file paths, sorted.
    pub fn files(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|tree| tree.files.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of writes performed through the port.
    pub fn write_count(&self) -> usize {
        self.inner.read().map(|tree| tree.writes).unwrap_or(0)
    }

    fn read_lock(&self, path: &Path) -> AppstrapResult<RwLockReadGuard<'_, Tree>> {
        self.inner
            .read()
            .map_err(|_| ApplicationError::filesystem(path, "filesystem lock poisoned").into())
    }

    fn write_lock(&self, path: &Path) -> AppstrapResult<RwLockWriteGuard<'_, Tree>> {
        self.inner
            .write()
            .map_err(|_| ApplicationError::filesystem(path, "filesystem lock poisoned").into())
    }
}

impl Filesystem for MemoryFilesystem {
    fn create_dir_all(&self, path: &Path) -> AppstrapResult<()> {
        let mut tree = self.write_lock(path)?;
        tree.add_ancestors(path);
        tree.directories.insert(path.to_path_buf());
        Ok(())
    }

    fn read_to_string(&self, path: &Path) -> AppstrapResult<String> {
        self.read_lock(path)?
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| ApplicationError::filesystem(path, "No such file or directory").into())
    }

    fn write_file(&self, path: &Path, content: &str) -> AppstrapResult<()> {
        let mut tree = self.write_lock(path)?;
        if tree.directories.contains(path) {
            return Err(ApplicationError::filesystem(path, "Is a directory").into());
        }
        tree.add_ancestors(path);
        tree.files.insert(path.to_path_buf(), content.to_string());
        tree.writes += 1;
        Ok(())
    }

    fn copy_file(&self, from: &Path, to: &Path) -> AppstrapResult<()> {
        let content = self.read_to_string(from)?;
        self.write_file(to, &content)
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|tree| tree.files.contains_key(path) || tree.directories.contains(path))
            .unwrap_or(false)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|tree| tree.directories.contains(path))
            .unwrap_or(false)
    }

    fn list_files(&self, dir: &Path) -> AppstrapResult<Vec<PathBuf>> {
        Ok(self
            .read_lock(dir)?
            .files
            .keys()
            .filter(|p| p.starts_with(dir) && p.as_path() != dir)
            .cloned()
            .collect())
    }
}

/// Renders with [`RenderContext::render`].
pub struct PlainRenderer;

impl TemplateRenderer for PlainRenderer {
    fn render(&self, template: &str, context: &RenderContext) -> AppstrapResult<String> {
        Ok(context.render(template))
    }
}
