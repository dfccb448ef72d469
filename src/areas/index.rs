//! Staging area
//!
//! Wraps the index file on disk: loading, staging scans into it, preparing
//! it for a commit and writing it back. The parsed content is the
//! authoritative description of what would be committed now.

use crate::artifacts::index::file_info::FileInfo;
use crate::artifacts::index::IndexContent;
use anyhow::Context;
use chrono::Local;
use std::collections::BTreeMap;
use std::io::Write;
use std::ops::DerefMut;
use std::path::Path;

#[derive(Debug)]
pub struct Index {
    /// Path to the index file (typically `.jit/index`)
    path: Box<Path>,
    content: IndexContent,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            content: IndexContent::default(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &IndexContent {
        &self.content
    }

    /// Load the index from disk
    ///
    /// A missing or empty file yields an empty index.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        if !self.path.exists() {
            self.content = IndexContent::default();
            return Ok(());
        }

        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Unable to read index at {}", self.path.display()))?;
        self.content = IndexContent::parse(&text)?;

        Ok(())
    }

    /// Replace the in-memory content wholesale (checkout, merge)
    pub fn replace(&mut self, content: IndexContent) {
        self.content = content;
    }

    /// Merge a scan into the index and stamp the metadata
    ///
    /// # Returns
    ///
    /// true when anything was staged
    pub fn stage(&mut self, current_files: BTreeMap<String, FileInfo>) -> bool {
        let changed = self.content.stage(current_files);
        if changed {
            self.content.metadata.last_modified = Local::now().naive_local();
        }

        changed
    }

    /// Clear all dirty/new flags ahead of hashing for a commit
    pub fn prepare_commit(&mut self) {
        self.content.prepare_commit(Local::now().naive_local());
    }

    /// Write the index file back to disk under an exclusive lock
    pub fn write_updates(&self) -> anyhow::Result<()> {
        let mut index_file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .with_context(|| format!("Unable to open index at {}", self.path.display()))?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Exclusive, 0, 1)?;

        lock.deref_mut()
            .write_all(self.content.render().as_bytes())
            .with_context(|| format!("Unable to write index at {}", self.path.display()))?;

        Ok(())
    }
}
