//! Index file format (staging manifest)
//!
//! The index is the textual manifest of tracked files: what the working tree
//! looked like at the last checkout, and what would be committed now. It is
//! the content the commit checksum is computed over.
//!
//! ## File Format
//!
//! ```text
//! [METADATA]
//! entries = N
//! last_modified = YYYY-MM-DD HH:MM:SS
//! is_dirty = true|false
//!
//! [ENTRY]
//! filename = <path>
//! checksum = <40-hex>
//! addition_date = YYYY-MM-DD HH:MM:SS
//! last_modified = YYYY-MM-DD HH:MM:SS
//! is_dirty = true|false
//! is_new = true|false
//! ```
//!
//! Whitespace around `=` is ignored; a blank line terminates an entry. The
//! reader tolerates missing keys (fields default), the writer always emits
//! every key.

pub mod file_info;

use crate::artifacts::index::file_info::FileInfo;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// Timestamp format used throughout the on-disk text formats
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Section marker opening the metadata block
const METADATA_SECTION: &str = "[METADATA]";

/// Section marker opening a file entry block
const ENTRY_SECTION: &str = "[ENTRY]";

/// Index header metadata
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexMetadata {
    /// Number of tracked entries
    pub entries: usize,
    /// Time of the last index rewrite
    pub last_modified: NaiveDateTime,
    /// True when any entry is staged but not committed
    pub is_dirty: bool,
}

/// Parsed index file: metadata plus the tracked file map
///
/// Paths are unique; the map keeps entries ordered by path so the rendered
/// form is stable for hashing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexContent {
    pub metadata: IndexMetadata,
    pub files: BTreeMap<String, FileInfo>,
}

impl IndexContent {
    /// Parse the text grammar
    ///
    /// Tolerant to missing keys: absent fields keep their default values.
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let mut content = IndexContent::default();
        let mut entry = FileInfo::default();
        let mut reading_entry = false;

        for line in text.lines() {
            let line = line.trim();

            if line == METADATA_SECTION {
                reading_entry = false;
            } else if line == ENTRY_SECTION {
                reading_entry = true;
            } else if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim();

                if reading_entry {
                    entry.set_field(key, value)?;
                } else {
                    content.metadata.set_field(key, value)?;
                }
            } else if line.is_empty() && reading_entry {
                reading_entry = false;
                content.files.insert(entry.filename.clone(), entry);
                entry = FileInfo::default();
            }
        }

        // flush a trailing entry that was not terminated by a blank line
        if !entry.filename.is_empty() {
            content.files.insert(entry.filename.clone(), entry);
        }

        Ok(content)
    }

    /// Render the text grammar, all keys emitted
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str(METADATA_SECTION);
        out.push('\n');
        out.push_str(&format!("entries = {}\n", self.metadata.entries));
        out.push_str(&format!(
            "last_modified = {}\n",
            self.metadata.last_modified.format(TIME_FORMAT)
        ));
        out.push_str(&format!("is_dirty = {}\n", self.metadata.is_dirty));

        for info in self.files.values() {
            out.push('\n');
            out.push_str(ENTRY_SECTION);
            out.push('\n');
            info.render(&mut out);
        }

        out
    }

    /// Merge a freshly scanned file map into the index
    ///
    /// New paths are marked new and dirty; paths whose checksum changed are
    /// marked dirty; unchanged paths are left as they are. Staging the same
    /// scan twice yields the same result.
    ///
    /// # Returns
    ///
    /// true when any entry was mutated
    pub fn stage(&mut self, current_files: BTreeMap<String, FileInfo>) -> bool {
        let mut a_file_changed = false;

        for (filename, mut info) in current_files {
            match self.files.get(&filename) {
                Some(existing) => {
                    if existing.checksum != info.checksum {
                        info.is_dirty = true;
                        info.is_new = false;
                        info.addition_date = existing.addition_date;
                        a_file_changed = true;
                        self.files.insert(filename, info);
                    }
                }
                None => {
                    info.is_dirty = true;
                    info.is_new = true;
                    a_file_changed = true;
                    self.files.insert(filename, info);
                }
            }
        }

        if a_file_changed {
            self.metadata.is_dirty = true;
        }
        self.metadata.entries = self.files.len();

        a_file_changed
    }

    /// Produce the canonical post-commit state
    ///
    /// Clears every dirty/new flag so the rendered index hashes to a stable
    /// checksum for identical content. Must run immediately before the
    /// commit checksum is computed.
    pub fn prepare_commit(&mut self, now: NaiveDateTime) {
        self.metadata.is_dirty = false;
        self.metadata.last_modified = now;

        for info in self.files.values_mut() {
            info.is_dirty = false;
            info.is_new = false;
        }
    }
}

impl IndexMetadata {
    fn set_field(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "entries" => self.entries = value.parse().unwrap_or_default(),
            "last_modified" => {
                self.last_modified =
                    NaiveDateTime::parse_from_str(value, TIME_FORMAT).unwrap_or_default()
            }
            "is_dirty" => self.is_dirty = value == "true",
            _ => {}
        }

        Ok(())
    }
}
