//! Working tree status
//!
//! Compares the current working-tree scan against the stored index and sorts
//! every path into exactly one of four disjoint sets. A fifth implicit set,
//! clean, is everything the report does not mention.

use crate::artifacts::index::file_info::FileInfo;
use crate::artifacts::index::IndexContent;
use std::collections::{BTreeMap, BTreeSet};

/// The four disjoint change sets of a status scan
///
/// | set        | condition                                          |
/// |------------|----------------------------------------------------|
/// | `staged`   | in index, same checksum, marked dirty in the index |
/// | `modified` | in index, checksum differs                         |
/// | `new`      | absent from the index                              |
/// | `deleted`  | in index, absent from the working tree             |
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    pub staged: BTreeSet<String>,
    pub modified: BTreeSet<String>,
    pub new_files: BTreeSet<String>,
    pub deleted: BTreeSet<String>,
}

impl StatusReport {
    /// Classify a scan against the index
    pub fn compute(index: &IndexContent, scanned: &BTreeMap<String, FileInfo>) -> Self {
        let mut report = StatusReport::default();
        let mut remaining: BTreeSet<&String> = index.files.keys().collect();

        for (filename, info) in scanned {
            match index.files.get(filename) {
                Some(stored) => {
                    if stored.checksum != info.checksum {
                        report.modified.insert(filename.clone());
                    } else if stored.is_dirty {
                        report.staged.insert(filename.clone());
                    }
                    remaining.remove(filename);
                }
                None => {
                    report.new_files.insert(filename.clone());
                }
            }
        }

        report.deleted = remaining.into_iter().cloned().collect();
        report
    }

    /// True when every set is empty, i.e. the repository is not dirty
    ///
    /// Branch creation, checkout and merge refuse to run unless this holds.
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty()
            && self.modified.is_empty()
            && self.new_files.is_empty()
            && self.deleted.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::checksum::Checksum;

    fn info(filename: &str, content: &[u8], is_dirty: bool) -> FileInfo {
        FileInfo {
            filename: filename.to_string(),
            checksum: Checksum::of_bytes(content),
            is_dirty,
            ..Default::default()
        }
    }

    fn index_of(entries: &[FileInfo]) -> IndexContent {
        let mut index = IndexContent::default();
        for entry in entries {
            index.files.insert(entry.filename.clone(), entry.clone());
        }
        index.metadata.entries = index.files.len();
        index
    }

    fn scan_of(entries: &[FileInfo]) -> BTreeMap<String, FileInfo> {
        entries
            .iter()
            .map(|entry| (entry.filename.clone(), entry.clone()))
            .collect()
    }

    #[test]
    fn classifies_each_path_into_exactly_one_set() {
        let index = index_of(&[
            info("clean.txt", b"clean", false),
            info("staged.txt", b"staged", true),
            info("modified.txt", b"before", false),
            info("deleted.txt", b"gone", false),
        ]);
        let scan = scan_of(&[
            info("clean.txt", b"clean", false),
            info("staged.txt", b"staged", false),
            info("modified.txt", b"after", false),
            info("untracked.txt", b"new", false),
        ]);

        let report = StatusReport::compute(&index, &scan);

        assert_eq!(report.staged, BTreeSet::from(["staged.txt".to_string()]));
        assert_eq!(report.modified, BTreeSet::from(["modified.txt".to_string()]));
        assert_eq!(
            report.new_files,
            BTreeSet::from(["untracked.txt".to_string()])
        );
        assert_eq!(report.deleted, BTreeSet::from(["deleted.txt".to_string()]));

        // the four sets are pairwise disjoint
        let total = report.staged.len()
            + report.modified.len()
            + report.new_files.len()
            + report.deleted.len();
        let mut union = BTreeSet::new();
        union.extend(report.staged.iter());
        union.extend(report.modified.iter());
        union.extend(report.new_files.iter());
        union.extend(report.deleted.iter());
        assert_eq!(union.len(), total);
    }

    #[test]
    fn a_matching_scan_is_clean() {
        let entries = [info("a.txt", b"a", false), info("b.txt", b"b", false)];
        let report = StatusReport::compute(&index_of(&entries), &scan_of(&entries));

        assert!(report.is_clean());
    }

    #[test]
    fn a_staged_entry_blocks_cleanliness() {
        let index = index_of(&[info("a.txt", b"a", true)]);
        let scan = scan_of(&[info("a.txt", b"a", false)]);

        assert!(!StatusReport::compute(&index, &scan).is_clean());
    }

    #[test]
    fn deleted_contains_only_index_paths() {
        let index = index_of(&[info("a.txt", b"a", false)]);
        let report = StatusReport::compute(&index, &BTreeMap::new());

        assert_eq!(report.deleted, BTreeSet::from(["a.txt".to_string()]));
        assert!(report.new_files.is_empty());
    }
}
