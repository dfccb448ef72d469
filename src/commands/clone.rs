//! Local-filesystem clone
//!
//! A full clone copies every file under the source `.jit` directory and
//! checks out the HEAD branch tip. A branch clone transports a single
//! branch, optionally limited to the N most recent commits: the snapshots
//! reachable from the branch log, the blobs they reference, the commit
//! graph, the branch ref and its log.

use crate::areas::refs::LogKind;
use crate::areas::repository::{Repository, JIT_DIR};
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::head::Head;
use crate::artifacts::commit::graph::CommitGraph;
use crate::artifacts::objects::checksum::Checksum;
use anyhow::Context;
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use walkdir::WalkDir;

impl Repository {
    /// Copy a whole repository and check out its HEAD branch
    pub async fn clone_from(&mut self, source_dir: &Path) -> anyhow::Result<()> {
        let source_jit = source_dir.join(JIT_DIR);
        if !source_jit.is_dir() {
            anyhow::bail!(
                "No Jit repository named {} was found.",
                source_dir.display()
            );
        }

        for entry in WalkDir::new(&source_jit)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
        {
            let relative = entry
                .path()
                .strip_prefix(source_dir)
                .context("clone source walked outside itself")?;
            copy_file(entry.path(), &self.path().join(relative))?;
        }

        let tip = self.refs().resolve_head()?;
        let content = self.restore_index_file(&tip)?;
        self.restore_snapshot(&content)?;

        writeln!(self.writer(), "Clone successful")?;

        Ok(())
    }

    /// Transport a single branch, optionally depth-limited
    pub async fn clone_branch_from(
        &mut self,
        branch: &str,
        source_dir: &Path,
        depth: Option<usize>,
    ) -> anyhow::Result<()> {
        let name = BranchName::try_parse(branch.to_string())?;

        let source_jit = source_dir.join(JIT_DIR);
        if !source_jit.is_dir() {
            anyhow::bail!(
                "No Jit repository named {} was found.",
                source_dir.display()
            );
        }
        let source = Repository::new(source_dir.to_path_buf(), Box::new(std::io::sink()))?;

        // branch history, newest first, deduplicated
        let mut seen = HashSet::new();
        let mut commits: Vec<Checksum> = source
            .refs()
            .read_log(&name.ref_path())?
            .into_iter()
            .rev()
            .map(|record| record.new)
            .filter(|checksum| !checksum.is_zero())
            .filter(|checksum| seen.insert(checksum.clone()))
            .collect();
        if let Some(depth) = depth {
            commits.truncate(depth);
        }

        self.ensure_layout()?;

        for commit in &commits {
            let content = source.load_snapshot(commit)?;
            for info in content.files.values() {
                copy_file(
                    &source.store().object_path(&info.checksum),
                    &self.store().object_path(&info.checksum),
                )?;
            }
            copy_file(
                &source.store().object_path(commit),
                &self.store().object_path(commit),
            )?;
        }

        let graph_address = CommitGraph::address();
        let source_graph = source.store().object_path(&graph_address);
        if source_graph.exists() {
            copy_file(&source_graph, &self.store().object_path(&graph_address))?;
        }

        let tip = source.refs().read_branch(&name)?;
        self.refs().write_branch(&name, &tip)?;
        copy_file(
            &source.refs().log_path(&name.ref_path()),
            &self.refs().log_path(&name.ref_path()),
        )?;
        self.refs().write_head(&Head::Branch(name.clone()))?;
        self.refs().append_log(
            &name.ref_path(),
            &tip,
            &tip,
            LogKind::Clone,
            &format!("{} from {}", name, source_dir.display()),
        )?;

        let content = self.restore_index_file(&tip)?;
        self.restore_snapshot(&content)?;

        writeln!(self.writer(), "Clone successful")?;

        Ok(())
    }

    /// Create the `.jit` skeleton of a clone target without the init banner
    fn ensure_layout(&self) -> anyhow::Result<()> {
        for subdir in ["logs/refs/heads", "refs/heads", "objects", "branches"] {
            std::fs::create_dir_all(self.jit_path().join(subdir))
                .with_context(|| format!("Failed to create .jit/{subdir}"))?;
        }

        Ok(())
    }
}

fn copy_file(source: &Path, destination: &Path) -> anyhow::Result<()> {
    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Unable to create directory {}", parent.display()))?;
    }

    if destination.exists() {
        return Ok(());
    }

    std::fs::copy(source, destination).with_context(|| {
        format!(
            "Unable to copy {} to {}",
            source.display(),
            destination.display()
        )
    })?;

    Ok(())
}
