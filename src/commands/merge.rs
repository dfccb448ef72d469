//! Three-way merge of a feature branch into the current branch
//!
//! The merge base is the lowest common ancestor from the commit graph, with
//! a fallback to scanning the two branch logs when the graph does not know
//! both tips. Per-file reconciliation follows the snapshot checksums; only
//! files changed on both sides go through the line-level three-way merge.

use crate::areas::object_store::ObjectStore;
use crate::areas::refs::LogKind;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::commit::Commit;
use crate::artifacts::index::file_info::FileInfo;
use crate::artifacts::merge::three_way_merge;
use crate::artifacts::objects::checksum::Checksum;
use anyhow::Context;
use chrono::Local;
use colored::Colorize;
use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use std::path::PathBuf;

impl Repository {
    pub async fn merge(&mut self, feature: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let current_branch = self
            .refs()
            .read_head()?
            .branch()
            .cloned()
            .context("Cannot perform merge while outside a branch")?;
        let feature_branch = BranchName::try_parse(feature.to_string())?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;
        self.ensure_clean(&index)?;

        let head_tip = self.refs().read_branch(&current_branch)?;
        let feature_tip = self.refs().read_branch(&feature_branch)?;

        let graph = self.load_graph()?;
        if graph.is_ancestor(&feature_tip, &head_tip) {
            writeln!(self.writer(), "Already up to date")?;
            return Ok(());
        }

        let base = graph
            .intersection(&feature_tip, &head_tip)
            .map(|commit| commit.checksum.clone())
            .or_else(|| {
                self.merge_base_from_logs(&current_branch, &feature_branch)
                    .ok()
                    .flatten()
            })
            .context("The branches are not related! Orphan merge out of scope")?;

        if base == feature_tip {
            writeln!(self.writer(), "Already up to date")?;
            return Ok(());
        }

        let base_content = self.load_snapshot(&base)?;
        let mut theirs_content = self.load_snapshot(&feature_tip)?.files;
        let ours_content = index.content().clone();

        let mut merged: BTreeMap<String, FileInfo> = BTreeMap::new();
        let mut conflicted: Vec<String> = Vec::new();

        for (filename, ours_info) in &ours_content.files {
            let base_info = base_content.files.get(filename);
            let theirs_info = theirs_content.remove(filename);

            match (base_info, theirs_info) {
                // untouched by the feature branch: keep ours
                (_, None) => {
                    merged.insert(filename.clone(), ours_info.clone());
                }
                (_, Some(theirs_info)) if theirs_info.checksum == ours_info.checksum => {
                    merged.insert(filename.clone(), ours_info.clone());
                }
                // only the feature branch changed the file: take theirs
                (Some(base_info), Some(theirs_info))
                    if base_info.checksum == ours_info.checksum =>
                {
                    self.store().materialise(
                        &theirs_info.checksum,
                        &self.workspace().absolute(filename),
                    )?;
                    merged.insert(filename.clone(), theirs_info);
                }
                // only we changed the file: keep ours
                (Some(base_info), Some(theirs_info))
                    if base_info.checksum == theirs_info.checksum =>
                {
                    merged.insert(filename.clone(), ours_info.clone());
                }
                // both sides changed the file: reconcile line by line
                (base_info, Some(theirs_info)) => {
                    let info = self
                        .merge_file(filename, ours_info, base_info, &theirs_info)
                        .await?;
                    if info.is_dirty {
                        conflicted.push(filename.clone());
                    }
                    merged.insert(filename.clone(), info);
                }
            }
        }

        // files the feature branch added
        for (filename, theirs_info) in theirs_content {
            self.store().materialise(
                &theirs_info.checksum,
                &self.workspace().absolute(&filename),
            )?;
            merged.insert(filename, theirs_info);
        }

        let mut content = ours_content;
        content.files = merged;
        content.metadata.entries = content.files.len();
        content.metadata.is_dirty = !conflicted.is_empty();
        content.metadata.last_modified = Local::now().naive_local();

        std::fs::write(self.index_path(), content.render())
            .context("Unable to rewrite the index")?;
        index.replace(content);

        if !conflicted.is_empty() {
            writeln!(
                self.writer(),
                "{}",
                "Automatic merge failed. Fix conflicts and commit the result.".red()
            )?;
            for filename in &conflicted {
                writeln!(self.writer(), "\t{}", filename.red())?;
            }
            return Ok(());
        }

        // record the merge commit with both tips as parents
        let merge_checksum = Checksum::of_file(&self.index_path())?;
        let message = format!("Merge {feature_branch} into {current_branch}");

        self.store().put(&self.index_path(), &merge_checksum)?;
        self.refs().write_branch(&current_branch, &merge_checksum)?;
        self.refs().append_log(
            &current_branch.ref_path(),
            &head_tip,
            &merge_checksum,
            LogKind::Merge,
            &message,
        )?;

        let mut graph = self.load_graph()?;
        graph.add(
            Commit {
                checksum: merge_checksum.clone(),
                message: message.clone(),
                branch_name: current_branch.to_string(),
                author: String::new(),
                timestamp: Local::now().naive_local(),
                parents: Vec::new(),
            },
            vec![feature_tip, head_tip],
        );
        self.save_graph(&graph)?;

        writeln!(self.writer(), "{message}")?;

        Ok(())
    }

    /// Line-level merge of one file changed on both sides
    ///
    /// Base, ours and theirs are read as three concurrent blocking tasks and
    /// joined before merging. The merged result replaces the working-tree
    /// file; a conflict leaves the entry dirty and its blob unstored.
    async fn merge_file(
        &self,
        filename: &str,
        ours_info: &FileInfo,
        base_info: Option<&FileInfo>,
        theirs_info: &FileInfo,
    ) -> anyhow::Result<FileInfo> {
        let base_path = base_info.map(|info| self.store().object_path(&info.checksum));
        let theirs_path = self.store().object_path(&theirs_info.checksum);
        let ours_path = self.workspace().absolute(filename);

        let (base_lines, ours_lines, theirs_lines) = tokio::try_join!(
            tokio::task::spawn_blocking(move || match base_path {
                Some(path) => read_blob_lines(path),
                None => Ok(Vec::new()),
            }),
            tokio::task::spawn_blocking(move || read_working_lines(ours_path)),
            tokio::task::spawn_blocking(move || read_blob_lines(theirs_path)),
        )?;
        let (base_lines, ours_lines, theirs_lines) = (base_lines?, ours_lines?, theirs_lines?);

        let outcome = three_way_merge(&base_lines, &ours_lines, &theirs_lines);

        self.workspace().write_lines(filename, &outcome.lines)?;
        let absolute = self.workspace().absolute(filename);
        let checksum = Checksum::of_file(&absolute)?;

        if !outcome.has_conflicts {
            self.store().put(&absolute, &checksum)?;
        }

        Ok(FileInfo {
            filename: filename.to_string(),
            checksum,
            addition_date: ours_info.addition_date,
            last_modified: Local::now().naive_local(),
            is_dirty: outcome.has_conflicts,
            is_new: false,
        })
    }

    /// Merge-base discovery from the branch logs
    ///
    /// Used when the commit graph is unavailable: the newest commit of the
    /// feature log that also appears in the current branch's log is the
    /// base.
    fn merge_base_from_logs(
        &self,
        current: &BranchName,
        feature: &BranchName,
    ) -> anyhow::Result<Option<Checksum>> {
        let base_commits: HashSet<Checksum> = self
            .refs()
            .read_log(&current.ref_path())?
            .into_iter()
            .flat_map(|record| [record.old, record.new])
            .filter(|checksum| !checksum.is_zero())
            .collect();

        let feature_records = self.refs().read_log(&feature.ref_path())?;
        for record in feature_records.iter().rev() {
            for checksum in [&record.new, &record.old] {
                if !checksum.is_zero() && base_commits.contains(checksum) {
                    return Ok(Some(checksum.clone()));
                }
            }
        }

        Ok(None)
    }
}

fn read_blob_lines(path: PathBuf) -> anyhow::Result<Vec<String>> {
    let compressed = std::fs::read(&path)
        .with_context(|| format!("Unable to read object file {}", path.display()))?;
    let data = ObjectStore::decompress(&compressed)?;
    let text = String::from_utf8(data.to_vec())
        .with_context(|| format!("Object at {} is not valid text", path.display()))?;

    Ok(text.lines().map(str::to_string).collect())
}

fn read_working_lines(path: PathBuf) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Could not open {}", path.display()))?;

    Ok(content.lines().map(str::to_string).collect())
}
