use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::diff::compute_diff;
use anyhow::Context;
use colored::Colorize;
use std::collections::BTreeMap;
use std::io::Write;

/// Pattern of a two-branch diff range, `branchA..branchB`
const DIFF_RANGE_REGEX: &str = r"^([A-Za-z0-9._-]+)\.\.([A-Za-z0-9._-]+)$";

impl Repository {
    /// Diff the working tree against the committed state, or two branches
    pub async fn diff(&mut self, range: Option<&str>) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        match range {
            None => self.diff_worktree().await,
            Some(range) => self.diff_branches(range).await,
        }
    }

    /// Working tree vs. the snapshot at the current tip
    async fn diff_worktree(&mut self) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let report = self.status_report(&index)?;
        if report.modified.is_empty() && report.staged.is_empty() && report.deleted.is_empty() {
            return Ok(());
        }

        let tip = self.refs().resolve_head()?;
        let committed = self.load_snapshot(&tip)?;
        let mut original: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (filename, info) in &committed.files {
            original.insert(filename.clone(), self.store().get_text(&info.checksum)?);
        }

        let mut current: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for filename in report.modified.iter().chain(report.staged.iter()) {
            current.insert(filename.clone(), self.workspace().read_lines(filename)?);
        }
        for filename in &report.deleted {
            current.insert(filename.clone(), Vec::new());
        }

        for (filename, current_lines) in &current {
            let original_lines = original.remove(filename).unwrap_or_default();
            let script = compute_diff(&original_lines, current_lines);
            self.print_file_diff(filename, &script)?;
        }

        Ok(())
    }

    /// Snapshot-to-snapshot diff between two branch tips
    ///
    /// `A..B` names both sides; a bare branch name diffs the current branch
    /// against it.
    async fn diff_branches(&mut self, range: &str) -> anyhow::Result<()> {
        let re = regex::Regex::new(DIFF_RANGE_REGEX).context("invalid diff range regex")?;

        let (first, second) = match re.captures(range) {
            Some(captures) => (captures[1].to_string(), captures[2].to_string()),
            None => {
                let current = self
                    .refs()
                    .read_head()?
                    .branch()
                    .cloned()
                    .context("Cannot diff a branch while outside a branch")?;
                (current.to_string(), range.to_string())
            }
        };

        let first = BranchName::try_parse(first)?;
        let second = BranchName::try_parse(second)?;
        let first_content = self.load_snapshot(&self.refs().read_branch(&first)?)?;
        let mut second_content = self
            .load_snapshot(&self.refs().read_branch(&second)?)?
            .files;

        let mut pairs: BTreeMap<String, (Vec<String>, Vec<String>)> = BTreeMap::new();
        for (filename, info) in &first_content.files {
            let counterpart = second_content.remove(filename);
            let same = counterpart
                .as_ref()
                .map(|other| other.checksum == info.checksum)
                .unwrap_or(false);
            if same {
                continue;
            }

            let before = self.store().get_text(&info.checksum)?;
            let after = match counterpart {
                Some(other) => self.store().get_text(&other.checksum)?,
                None => Vec::new(),
            };
            pairs.insert(filename.clone(), (before, after));
        }
        // files only present on the second branch
        for (filename, info) in second_content {
            let after = self.store().get_text(&info.checksum)?;
            pairs.insert(filename, (Vec::new(), after));
        }

        for (filename, (before, after)) in &pairs {
            let script = compute_diff(before, after);
            self.print_file_diff(filename, &script)?;
        }

        Ok(())
    }

    fn print_file_diff(&self, filename: &str, script: &[String]) -> anyhow::Result<()> {
        writeln!(
            self.writer(),
            "{}",
            format!("diff --jit a/{filename} b/{filename}").cyan()
        )?;

        for line in script {
            if line.starts_with('+') {
                writeln!(self.writer(), "{}", line.green())?;
            } else if line.starts_with('-') {
                writeln!(self.writer(), "{}", line.red())?;
            } else {
                writeln!(self.writer(), "{line}")?;
            }
        }
        writeln!(self.writer())?;

        Ok(())
    }
}
