use crate::areas::repository::Repository;
use crate::artifacts::branch::head::Head;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// Print the four change sets plus the current position
    pub async fn status(&mut self) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let report = self.status_report(&index)?;

        match self.refs().read_head()? {
            Head::Branch(name) => {
                writeln!(self.writer(), "On branch {}", name.as_ref().green())?;
            }
            Head::Detached(checksum) => {
                writeln!(
                    self.writer(),
                    "HEAD detached at {}",
                    checksum.to_short().cyan()
                )?;
            }
        }

        if report.is_clean() {
            writeln!(
                self.writer(),
                "{}",
                "nothing to commit, working tree clean".green()
            )?;
            return Ok(());
        }

        if !report.staged.is_empty() {
            writeln!(self.writer(), "\nChanges to be committed:")?;
            for filename in &report.staged {
                let is_new = index
                    .content()
                    .files
                    .get(filename)
                    .map(|info| info.is_new)
                    .unwrap_or(false);
                let operation = if is_new {
                    "new file".green()
                } else {
                    "modified".yellow()
                };
                writeln!(self.writer(), "\t{}: {}", operation, filename)?;
            }
        }

        if !report.modified.is_empty() || !report.deleted.is_empty() {
            writeln!(self.writer(), "\nChanges not staged for commit:")?;
            for filename in &report.modified {
                writeln!(self.writer(), "\t{}: {}", "modified".yellow(), filename)?;
            }
            for filename in &report.deleted {
                writeln!(self.writer(), "\t{}: {}", "deleted".red(), filename)?;
            }
        }

        if !report.new_files.is_empty() {
            writeln!(self.writer(), "\nUntracked files:")?;
            for filename in &report.new_files {
                writeln!(self.writer(), "\t{}", filename.red())?;
            }
        }

        Ok(())
    }
}
