//! References and logs
//!
//! References are text files holding a commit checksum: `HEAD` (which may
//! instead hold a symbolic `refs/heads/<name>` path) and one file per branch
//! under `refs/heads/`. Every ref update appends a line to the matching
//! append-only log under `logs/`:
//!
//! ```text
//! <old-checksum>\t<new-checksum>\t<timestamp>\t<kind>: <message>
//! ```
//!
//! The logs double as a history source when the commit graph is absent.

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::head::Head;
use crate::artifacts::index::TIME_FORMAT;
use crate::artifacts::objects::checksum::Checksum;
use anyhow::Context;
use chrono::{Local, NaiveDateTime};
use derive_new::new;
use std::io::Write;
use std::ops::DerefMut;
use std::path::Path;
use walkdir::WalkDir;

/// Pattern of one log line; the digests are tab-separated
const LOG_LINE_REGEX: &str =
    r"(?m)^([0-9a-f]{40})\t([0-9a-f]{40})\t(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})\t(commit|merge|branch|clone): (.+)$";

/// Reason a ref moved, recorded in its log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Commit,
    Merge,
    Branch,
    Clone,
}

impl LogKind {
    fn as_str(&self) -> &'static str {
        match self {
            LogKind::Commit => "commit",
            LogKind::Merge => "merge",
            LogKind::Branch => "branch",
            LogKind::Clone => "clone",
        }
    }
}

/// One parsed log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub old: Checksum,
    pub new: Checksum,
    pub timestamp: NaiveDateTime,
    pub kind: String,
    pub message: String,
}

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the repository directory (typically `.jit`)
    path: Box<Path>,
}

impl Refs {
    pub fn head_path(&self) -> std::path::PathBuf {
        self.path.join("HEAD")
    }

    pub fn heads_path(&self) -> std::path::PathBuf {
        self.path.join("refs").join("heads")
    }

    pub fn logs_path(&self) -> std::path::PathBuf {
        self.path.join("logs")
    }

    pub fn log_path(&self, ref_path: &str) -> std::path::PathBuf {
        self.logs_path().join(ref_path)
    }

    pub fn read_head(&self) -> anyhow::Result<Head> {
        let content = std::fs::read_to_string(self.head_path())
            .context("Could not open the HEAD file")?;

        Head::try_parse(&content)
    }

    pub fn write_head(&self, head: &Head) -> anyhow::Result<()> {
        self.update_ref_file(&self.head_path(), &head.render())
    }

    /// Resolve HEAD to a concrete checksum
    ///
    /// An attached HEAD reads its branch tip (the zero checksum on an unborn
    /// branch); a detached HEAD is already concrete.
    pub fn resolve_head(&self) -> anyhow::Result<Checksum> {
        match self.read_head()? {
            Head::Branch(name) => self.read_branch(&name),
            Head::Detached(checksum) => Ok(checksum),
        }
    }

    pub fn branch_exists(&self, name: &BranchName) -> bool {
        self.heads_path().join(name.as_ref()).exists()
    }

    /// Read a branch tip
    pub fn read_branch(&self, name: &BranchName) -> anyhow::Result<Checksum> {
        let branch_path = self.heads_path().join(name.as_ref());
        if !branch_path.exists() {
            anyhow::bail!("No branch named {}", name);
        }

        let content = std::fs::read_to_string(&branch_path)
            .with_context(|| format!("Unable to read branch ref {}", branch_path.display()))?;

        Checksum::try_parse(content.trim().to_string())
    }

    /// Move a branch tip
    pub fn write_branch(&self, name: &BranchName, checksum: &Checksum) -> anyhow::Result<()> {
        let branch_path = self.heads_path().join(name.as_ref());
        self.update_ref_file(&branch_path, checksum.as_ref())
    }

    /// List all branches, sorted by name
    pub fn list_branches(&self) -> anyhow::Result<Vec<BranchName>> {
        let heads = self.heads_path();
        let mut branches = WalkDir::new(&heads)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let name = entry.path().strip_prefix(&heads).ok()?;
                BranchName::try_parse(name.to_string_lossy().to_string()).ok()
            })
            .collect::<Vec<_>>();
        branches.sort();

        Ok(branches)
    }

    /// Append one line to a ref's log
    pub fn append_log(
        &self,
        ref_path: &str,
        old: &Checksum,
        new: &Checksum,
        kind: LogKind,
        message: &str,
    ) -> anyhow::Result<()> {
        let log_path = self.log_path(ref_path);
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Unable to create log directory {}", parent.display())
            })?;
        }

        let mut log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Unable to open the log file {}", log_path.display()))?;

        writeln!(
            log_file,
            "{}\t{}\t{}\t{}: {}",
            old,
            new,
            Local::now().naive_local().format(TIME_FORMAT),
            kind.as_str(),
            message
        )
        .with_context(|| format!("Unable to append to the log file {}", log_path.display()))
    }

    /// Parse a ref's log, oldest line first
    ///
    /// Unparseable lines are skipped; a missing log reads as empty.
    pub fn read_log(&self, ref_path: &str) -> anyhow::Result<Vec<LogRecord>> {
        let log_path = self.log_path(ref_path);
        if !log_path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&log_path)
            .with_context(|| format!("Unable to read the log file {}", log_path.display()))?;
        let re = regex::Regex::new(LOG_LINE_REGEX).context("invalid log line regex")?;

        Ok(re
            .captures_iter(&content)
            .filter_map(|captures| {
                Some(LogRecord {
                    old: Checksum::try_parse(captures[1].to_string()).ok()?,
                    new: Checksum::try_parse(captures[2].to_string()).ok()?,
                    timestamp: NaiveDateTime::parse_from_str(&captures[3], TIME_FORMAT).ok()?,
                    kind: captures[4].to_string(),
                    message: captures[5].to_string(),
                })
            })
            .collect())
    }

    fn update_ref_file(&self, path: &Path, raw_ref: &str) -> anyhow::Result<()> {
        std::fs::create_dir_all(path.parent().with_context(|| {
            format!("failed to locate parent directory for ref file at {path:?}")
        })?)?;

        let mut ref_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("failed to open ref file at {path:?}"))?;
        let mut lock = file_guard::lock(&mut ref_file, file_guard::Lock::Exclusive, 0, 1)?;
        lock.deref_mut().write_all(raw_ref.as_bytes())?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_refs() -> (PathBuf, Refs) {
        let dir = std::env::temp_dir().join(format!(
            "jit-refs-{}-{}",
            std::process::id(),
            rand::random::<u32>()
        ));
        std::fs::create_dir_all(dir.join("refs/heads")).unwrap();
        std::fs::create_dir_all(dir.join("logs")).unwrap();
        let refs = Refs::new(dir.clone().into_boxed_path());
        (dir, refs)
    }

    fn branch(name: &str) -> BranchName {
        BranchName::try_parse(name.to_string()).unwrap()
    }

    #[test]
    fn head_round_trips_both_variants() {
        let (dir, refs) = temp_refs();

        let attached = Head::Branch(branch("master"));
        refs.write_head(&attached).unwrap();
        assert_eq!(refs.read_head().unwrap(), attached);

        let detached = Head::Detached(Checksum::of_bytes(b"commit"));
        refs.write_head(&detached).unwrap();
        assert_eq!(refs.read_head().unwrap(), detached);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn reading_a_missing_branch_fails() {
        let (dir, refs) = temp_refs();

        let error = refs.read_branch(&branch("nope")).unwrap_err();
        assert!(error.to_string().contains("No branch named nope"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn branch_tips_round_trip() {
        let (dir, refs) = temp_refs();
        let tip = Checksum::of_bytes(b"tip");

        refs.write_branch(&branch("feature"), &tip).unwrap();
        assert_eq!(refs.read_branch(&branch("feature")).unwrap(), tip);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn resolve_head_follows_the_attached_branch() {
        let (dir, refs) = temp_refs();
        let tip = Checksum::of_bytes(b"tip");
        refs.write_branch(&branch("master"), &tip).unwrap();
        refs.write_head(&Head::Branch(branch("master"))).unwrap();

        assert_eq!(refs.resolve_head().unwrap(), tip);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn lists_branches_in_name_order() {
        let (dir, refs) = temp_refs();
        let tip = Checksum::of_bytes(b"tip");
        refs.write_branch(&branch("zeta"), &tip).unwrap();
        refs.write_branch(&branch("alpha"), &tip).unwrap();

        let names: Vec<String> = refs
            .list_branches()
            .unwrap()
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn log_lines_round_trip() {
        let (dir, refs) = temp_refs();
        let old = Checksum::zero();
        let new = Checksum::of_bytes(b"first");

        refs.append_log("refs/heads/master", &old, &new, LogKind::Commit, "first")
            .unwrap();
        refs.append_log(
            "refs/heads/master",
            &new,
            &Checksum::of_bytes(b"second"),
            LogKind::Merge,
            "Merge feature into master",
        )
        .unwrap();

        let records = refs.read_log("refs/heads/master").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].old, old);
        assert_eq!(records[0].new, new);
        assert_eq!(records[0].kind, "commit");
        assert_eq!(records[0].message, "first");
        assert_eq!(records[1].kind, "merge");
        assert_eq!(records[1].message, "Merge feature into master");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn a_missing_log_reads_as_empty() {
        let (dir, refs) = temp_refs();
        assert!(refs.read_log("refs/heads/none").unwrap().is_empty());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
