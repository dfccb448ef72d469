//! Tracked file record

use crate::artifacts::index::TIME_FORMAT;
use crate::artifacts::objects::checksum::Checksum;
use chrono::NaiveDateTime;

/// Metadata for one tracked file
///
/// `is_dirty` marks content that differs from the last committed version,
/// `is_new` marks a path absent from the prior index. Both are cleared when
/// the index is prepared for a commit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileInfo {
    /// Path relative to the repository root, unique within an index
    pub filename: String,
    /// Checksum of the file content
    pub checksum: Checksum,
    /// Time the path was first staged
    pub addition_date: NaiveDateTime,
    /// Working-tree modification time at the last scan
    pub last_modified: NaiveDateTime,
    pub is_dirty: bool,
    pub is_new: bool,
}

impl FileInfo {
    pub(super) fn set_field(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "filename" => self.filename = value.to_string(),
            "checksum" => self.checksum = Checksum::try_parse(value.to_string())?,
            "addition_date" => {
                self.addition_date =
                    NaiveDateTime::parse_from_str(value, TIME_FORMAT).unwrap_or_default()
            }
            "last_modified" => {
                self.last_modified =
                    NaiveDateTime::parse_from_str(value, TIME_FORMAT).unwrap_or_default()
            }
            "is_dirty" => self.is_dirty = value == "true",
            "is_new" => self.is_new = value == "true",
            _ => {}
        }

        Ok(())
    }

    pub(super) fn render(&self, out: &mut String) {
        out.push_str(&format!("filename = {}\n", self.filename));
        out.push_str(&format!("checksum = {}\n", self.checksum));
        out.push_str(&format!(
            "addition_date = {}\n",
            self.addition_date.format(TIME_FORMAT)
        ));
        out.push_str(&format!(
            "last_modified = {}\n",
            self.last_modified.format(TIME_FORMAT)
        ));
        out.push_str(&format!("is_dirty = {}\n", self.is_dirty));
        out.push_str(&format!("is_new = {}\n", self.is_new));
    }
}
