//! Commit graph storage and traversal
//!
//! The graph maps checksums to commit records and supports insertion,
//! lookup, ancestry intersection (lowest common ancestor) and linear history
//! walking.
//!
//! ## On-disk format
//!
//! A single blob at a fixed, well-known object address (so both ends of a
//! clone agree where to find it):
//!
//! ```text
//! u64 count
//! repeat count times:
//!   u64 len; bytes checksum
//!   u64 len; bytes message
//!   u64 len; bytes branch_name
//!   u64 len; bytes author
//!   i64 timestamp (seconds since epoch)
//!   u64 n_parents
//!   repeat n_parents: u64 len; bytes parent_checksum
//! ```
//!
//! Integers are little-endian. The whole record block is zlib-compressed and
//! prefixed by its compressed length as a u64.

use crate::artifacts::commit::Commit;
use crate::artifacts::objects::checksum::Checksum;
use anyhow::Context;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime};
use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read, Write};
use std::path::Path;

/// Fixed object address of the serialised commit graph
pub const COMMIT_GRAPH_CHECKSUM: &str = "4015b57ae21a9bd5ca21822bd56ba88678a0ce5e";

/// A commit printed by the history walk, decorated with the branch name when
/// it is the tip of a diverging branch rather than part of the current chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub commit: Commit,
    pub branch_point: Option<String>,
}

/// In-memory commit graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitGraph {
    commits: HashMap<Checksum, Commit>,
}

impl CommitGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fixed address the graph is stored at
    pub fn address() -> Checksum {
        Checksum::try_parse(COMMIT_GRAPH_CHECKSUM.to_string())
            .expect("commit graph address is a valid checksum")
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    pub fn get(&self, checksum: &Checksum) -> Option<&Commit> {
        self.commits.get(checksum)
    }

    pub fn contains(&self, checksum: &Checksum) -> bool {
        self.commits.contains_key(checksum)
    }

    /// Insert a commit, linking it to the given parents
    ///
    /// Parent checksums not currently present in the graph are dropped, so a
    /// record can never reference a node the graph does not hold.
    pub fn add(&mut self, mut commit: Commit, parents: Vec<Checksum>) {
        commit.parents = parents
            .into_iter()
            .filter(|parent| self.commits.contains_key(parent))
            .collect();

        self.commits.insert(commit.checksum.clone(), commit);
    }

    /// Lowest common ancestor of two commits
    ///
    /// Collects the ancestor set of `a` (including `a` itself) by depth-first
    /// traversal, then walks from `b` gathering every node in that set. The
    /// intersection commit with the most recent timestamp wins.
    pub fn intersection(&self, a: &Checksum, b: &Checksum) -> Option<&Commit> {
        let (start, target) = (self.commits.get(a)?, self.commits.get(b)?);

        let mut ancestors = HashSet::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if ancestors.insert(current.checksum.clone()) {
                for parent in &current.parents {
                    if let Some(parent) = self.commits.get(parent) {
                        stack.push(parent);
                    }
                }
            }
        }

        let mut intersections: Vec<&Commit> = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![target];
        while let Some(current) = stack.pop() {
            if !seen.insert(current.checksum.clone()) {
                continue;
            }
            if ancestors.contains(&current.checksum) {
                intersections.push(current);
            }
            for parent in &current.parents {
                if let Some(parent) = self.commits.get(parent) {
                    stack.push(parent);
                }
            }
        }

        intersections.sort_by(|lhs, rhs| rhs.timestamp.cmp(&lhs.timestamp));
        intersections.into_iter().next()
    }

    /// Whether `ancestor` is reachable from `descendant` (inclusive)
    pub fn is_ancestor(&self, ancestor: &Checksum, descendant: &Checksum) -> bool {
        let mut seen = HashSet::new();
        let mut stack = vec![descendant.clone()];

        while let Some(current) = stack.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            if &current == ancestor {
                return true;
            }
            if let Some(commit) = self.commits.get(&current) {
                stack.extend(commit.parents.iter().cloned());
            }
        }

        false
    }

    /// Walk the parent chain from a tip, newest first
    ///
    /// Parents on the same branch continue the chain; parents recorded under
    /// another branch name are emitted once as decorated branch points. The
    /// walk terminates when no same-branch parent exists.
    pub fn history_from(&self, tip: &Checksum) -> Vec<HistoryEntry> {
        let mut history = Vec::new();
        let mut checksum = tip.clone();

        while let Some(commit) = self.commits.get(&checksum) {
            history.push(HistoryEntry {
                commit: commit.clone(),
                branch_point: None,
            });

            for parent_checksum in &commit.parents {
                let Some(parent) = self.commits.get(parent_checksum) else {
                    continue;
                };
                if parent.branch_name == commit.branch_name {
                    checksum = parent.checksum.clone();
                } else {
                    history.push(HistoryEntry {
                        commit: parent.clone(),
                        branch_point: Some(parent.branch_name.clone()),
                    });
                }
            }

            // no same-branch parent was found
            if checksum == commit.checksum {
                break;
            }
        }

        history
    }

    /// Serialise every record to the uncompressed binary layout
    pub fn encode(&self) -> anyhow::Result<Bytes> {
        let mut out = Vec::new();

        out.write_u64::<LittleEndian>(self.commits.len() as u64)?;
        for commit in self.commits.values() {
            write_str(&mut out, commit.checksum.as_ref())?;
            write_str(&mut out, &commit.message)?;
            write_str(&mut out, &commit.branch_name)?;
            write_str(&mut out, &commit.author)?;
            out.write_i64::<LittleEndian>(commit.timestamp.and_utc().timestamp())?;
            out.write_u64::<LittleEndian>(commit.parents.len() as u64)?;
            for parent in &commit.parents {
                write_str(&mut out, parent.as_ref())?;
            }
        }

        Ok(out.into())
    }

    /// Rebuild a graph from the uncompressed binary layout
    pub fn decode(data: &[u8]) -> anyhow::Result<Self> {
        let mut reader = Cursor::new(data);
        let mut commits = HashMap::new();

        let count = reader.read_u64::<LittleEndian>()?;
        for _ in 0..count {
            let checksum = Checksum::try_parse(read_str(&mut reader)?)?;
            let message = read_str(&mut reader)?;
            let branch_name = read_str(&mut reader)?;
            let author = read_str(&mut reader)?;
            let timestamp = read_timestamp(&mut reader)?;

            let n_parents = reader.read_u64::<LittleEndian>()?;
            let mut parents = Vec::with_capacity(n_parents as usize);
            for _ in 0..n_parents {
                parents.push(Checksum::try_parse(read_str(&mut reader)?)?);
            }

            commits.insert(
                checksum.clone(),
                Commit {
                    checksum,
                    message,
                    branch_name,
                    author,
                    timestamp,
                    parents,
                },
            );
        }

        Ok(Self { commits })
    }

    /// Write the compressed, length-prefixed graph blob
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Unable to create object directory {}", parent.display())
            })?;
        }

        let encoded = self.encode()?;
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&encoded)?;
        let compressed = encoder.finish().context("Unable to compress commit graph")?;

        let mut framed = Vec::with_capacity(compressed.len() + 8);
        framed.write_u64::<LittleEndian>(compressed.len() as u64)?;
        framed.write_all(&compressed)?;

        std::fs::write(path, framed)
            .with_context(|| format!("Unable to write commit graph at {}", path.display()))
    }

    /// Load the graph blob; a missing file yields an empty graph
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let framed = std::fs::read(path)
            .with_context(|| format!("Unable to read commit graph at {}", path.display()))?;
        let mut reader = Cursor::new(framed);
        let compressed_len = reader.read_u64::<LittleEndian>()?;

        let mut compressed = vec![0u8; compressed_len as usize];
        reader.read_exact(&mut compressed)?;

        let mut decoder = flate2::read::ZlibDecoder::new(compressed.as_slice());
        let mut decoded = Vec::new();
        decoder
            .read_to_end(&mut decoded)
            .context("Unable to decompress commit graph")?;

        Self::decode(&decoded)
    }
}

fn write_str(out: &mut Vec<u8>, value: &str) -> anyhow::Result<()> {
    out.write_u64::<LittleEndian>(value.len() as u64)?;
    out.write_all(value.as_bytes())?;
    Ok(())
}

fn read_str(reader: &mut Cursor<impl AsRef<[u8]>>) -> anyhow::Result<String> {
    let len = reader.read_u64::<LittleEndian>()?;
    let mut buffer = vec![0u8; len as usize];
    reader.read_exact(&mut buffer)?;

    String::from_utf8(buffer).context("Invalid string in commit graph")
}

fn read_timestamp(reader: &mut Cursor<impl AsRef<[u8]>>) -> anyhow::Result<NaiveDateTime> {
    let seconds = reader.read_i64::<LittleEndian>()?;

    DateTime::from_timestamp(seconds, 0)
        .map(|timestamp| timestamp.naive_utc())
        .context("Invalid timestamp in commit graph")
}
