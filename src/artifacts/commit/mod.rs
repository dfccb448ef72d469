//! Commit records and the commit graph
//!
//! A commit is an immutable record of an index snapshot plus metadata and
//! parent links. Commits form a DAG keyed by checksum; edges go from child
//! to parents and are looked up by checksum, never by back-pointer.

pub mod graph;

use crate::artifacts::objects::checksum::Checksum;
use chrono::NaiveDateTime;

/// Branch name recorded on commits created while detached with no known parent
pub const DETACHED_BRANCH_NAME: &str = "wild";

/// One node of the commit graph
///
/// The checksum equals the SHA-1 of the serialised index at commit time.
/// `branch_name` is informational (used for log grouping); `author` may be
/// empty. Parents: none for an initial commit, two for a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub checksum: Checksum,
    pub message: String,
    pub branch_name: String,
    pub author: String,
    pub timestamp: NaiveDateTime,
    pub parents: Vec<Checksum>,
}
