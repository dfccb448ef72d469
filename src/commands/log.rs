use crate::areas::repository::Repository;
use crate::artifacts::commit::graph::HistoryEntry;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// Print history from HEAD, newest first
    ///
    /// The commit graph is the primary source; when it does not know the
    /// current tip (e.g. a repository transported without its graph) the
    /// ref log is replayed instead.
    pub async fn log(&mut self) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let head = self.refs().read_head()?;
        let tip = self.refs().resolve_head()?;
        if tip.is_zero() {
            return Ok(());
        }

        let graph = self.load_graph()?;
        if graph.contains(&tip) {
            for entry in graph.history_from(&tip) {
                self.print_history_entry(&entry)?;
            }
            return Ok(());
        }

        for record in self.refs().read_log(&head.log_ref_path())? {
            if record.kind != "commit" && record.kind != "merge" {
                continue;
            }
            writeln!(self.writer(), "{} {}", "commit".green(), record.new)?;
            writeln!(self.writer(), "{} Unknown", "Author:".blue())?;
            writeln!(self.writer(), "{}   {}", "Date:".cyan(), record.timestamp)?;
            writeln!(self.writer())?;
            writeln!(self.writer(), "    {}", record.message.yellow())?;
            writeln!(self.writer())?;
        }

        Ok(())
    }

    fn print_history_entry(&self, entry: &HistoryEntry) -> anyhow::Result<()> {
        let decoration = match &entry.branch_point {
            Some(branch) => format!(" ({branch})"),
            None => String::new(),
        };
        let author = if entry.commit.author.is_empty() {
            "Unknown"
        } else {
            &entry.commit.author
        };

        writeln!(
            self.writer(),
            "{}{}",
            entry.commit.checksum.as_ref().green(),
            decoration.yellow()
        )?;
        writeln!(self.writer(), "{} {}", "Author:".blue(), author)?;
        writeln!(
            self.writer(),
            "{}  {}",
            "Date:".cyan(),
            entry.commit.timestamp
        )?;
        writeln!(self.writer())?;
        writeln!(self.writer(), "\t{}", entry.commit.message.yellow())?;
        writeln!(self.writer())?;

        Ok(())
    }
}
