//! Content transformation primitives.
//!
//! Every primitive works through the [`Filesystem`] port. Template sources
//! are relative to the resolved source directory and destinations are
//! relative to the target application root.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, TemplateRenderer},
    },
    domain::{AnchorLocator, Pattern, Position, RenderContext, Scope, inject, substitute},
    error::AppstrapResult,
};

/// What a primitive did to the target tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformOutcome {
    Written,
    /// Destination existed and overwriting was not requested.
    Skipped,
    /// Nothing matched; the file was not rewritten.
    Unchanged,
}

/// Applies render/copy/inject/substitute/create primitives to a target tree.
pub struct ContentTransformer<'a> {
    fs: &'a dyn Filesystem,
    renderer: &'a dyn TemplateRenderer,
    locator: &'a dyn AnchorLocator,
    source_root: &'a Path,
    target_root: &'a Path,
}

impl<'a> ContentTransformer<'a> {
    pub fn new(
        fs: &'a dyn Filesystem,
        renderer: &'a dyn TemplateRenderer,
        locator: &'a dyn AnchorLocator,
        source_root: &'a Path,
        target_root: &'a Path,
    ) -> Self {
        Self {
            fs,
            renderer,
            locator,
            source_root,
            target_root,
        }
    }

    /// Render `src` from the template source into `dst` in the target.
    pub fn render_template(
        &self,
        src: &Path,
        dst: &Path,
        overwrite: bool,
        context: &RenderContext,
    ) -> AppstrapResult<TransformOutcome> {
        let to = self.target_root.join(dst);
        if !overwrite && self.fs.exists(&to) {
            debug!(dst = %dst.display(), "Destination exists, not rendering");
            return Ok(TransformOutcome::Skipped);
        }

        let template = self.fs.read_to_string(&self.source_root.join(src))?;
        let rendered = self
            .renderer
            .render(&template, context)
            .map_err(|e| ApplicationError::RenderingFailed {
                path: src.to_path_buf(),
                reason: e.to_string(),
            })?;
        self.fs.write_file(&to, &rendered)?;
        Ok(TransformOutcome::Written)
    }

    pub fn copy_file(&self, src: &Path, dst: &Path, overwrite: bool) -> AppstrapResult<TransformOutcome> {
        self.copy_one(&self.source_root.join(src), &self.target_root.join(dst), overwrite)
    }

    /// Copy every file under `src`, applying `overwrite` per file.
    ///
    /// Reports `Written` when at least one file was copied.
    pub fn copy_tree(&self, src: &Path, dst: &Path, overwrite: bool) -> AppstrapResult<TransformOutcome> {
        let from_root = self.source_root.join(src);
        if !self.fs.is_dir(&from_root) {
            return Err(ApplicationError::filesystem(&from_root, "not a directory").into());
        }

        let to_root = self.target_root.join(dst);
        let mut outcome = TransformOutcome::Skipped;
        for file in self.fs.list_files(&from_root)? {
            let relative = file
                .strip_prefix(&from_root)
                .map_err(|e| ApplicationError::filesystem(&file, e))?;
            if self.copy_one(&file, &to_root.join(relative), overwrite)? == TransformOutcome::Written {
                outcome = TransformOutcome::Written;
            }
        }
        Ok(outcome)
    }

    fn copy_one(&self, from: &Path, to: &Path, overwrite: bool) -> AppstrapResult<TransformOutcome> {
        if !overwrite && self.fs.exists(to) {
            debug!(dst = %to.display(), "Destination exists, not copying");
            return Ok(TransformOutcome::Skipped);
        }
        self.fs.copy_file(from, to)?;
        Ok(TransformOutcome::Written)
    }

    /// Insert `content` before or after the first occurrence of `anchor`.
    ///
    /// A missing anchor fails and leaves the file untouched.
    pub fn inject_anchor(
        &self,
        file: &Path,
        anchor: &str,
        position: Position,
        content: &str,
    ) -> AppstrapResult<TransformOutcome> {
        let path = self.target_root.join(file);
        let original = self.fs.read_to_string(&path)?;
        let updated = inject(
            &original,
            &file.display().to_string(),
            anchor,
            position,
            content,
            self.locator,
        )?;
        self.fs.write_file(&path, &updated)?;
        Ok(TransformOutcome::Written)
    }

    pub fn substitute_pattern(
        &self,
        file: &Path,
        pattern: &Pattern,
        replacement: &str,
        scope: Scope,
    ) -> AppstrapResult<TransformOutcome> {
        let path = self.target_root.join(file);
        let original = self.fs.read_to_string(&path)?;
        match substitute(&original, pattern, replacement, scope)? {
            Some(updated) => {
                self.fs.write_file(&path, &updated)?;
                Ok(TransformOutcome::Written)
            }
            None => {
                debug!(file = %file.display(), pattern = pattern.as_str(), "Pattern not found");
                Ok(TransformOutcome::Unchanged)
            }
        }
    }

    /// Create an empty file (and its parents); an existing file is left alone.
    pub fn create_empty_file(&self, path: &Path) -> AppstrapResult<TransformOutcome> {
        let to = self.target_root.join(path);
        if self.fs.exists(&to) {
            return Ok(TransformOutcome::Skipped);
        }
        self.fs.write_file(&to, "")?;
        Ok(TransformOutcome::Written)
    }
}
