use crate::areas::refs::LogKind;
use crate::areas::repository::Repository;
use crate::artifacts::branch::head::Head;
use crate::artifacts::commit::{Commit, DETACHED_BRANCH_NAME};
use crate::artifacts::objects::checksum::Checksum;
use chrono::Local;
use std::io::Write;

impl Repository {
    /// Snapshot the staged index as a new commit
    ///
    /// The index is rewritten in its canonical post-commit form, hashed, and
    /// stored; then the branch ref (or the detached HEAD) moves, the log
    /// gains a line, and the commit graph is extended and saved.
    pub async fn commit(&mut self, message: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        if !index.content().metadata.is_dirty {
            writeln!(self.writer(), "Nothing to commit")?;
            return Ok(());
        }

        index.prepare_commit();
        index.write_updates()?;

        let checksum = Checksum::of_file(index.path())?;

        let head = self.refs().read_head()?;
        let old = match &head {
            Head::Branch(name) => self.refs().read_branch(name)?,
            Head::Detached(checksum) => checksum.clone(),
        };
        if let Head::Branch(name) = &head {
            self.refs().write_branch(name, &checksum)?;
        }

        self.store().put(&self.index_path(), &checksum)?;
        self.refs().append_log(
            &head.log_ref_path(),
            &old,
            &checksum,
            LogKind::Commit,
            message,
        )?;

        let mut graph = self.load_graph()?;
        let branch_name = match &head {
            Head::Branch(name) => name.to_string(),
            // a detached commit inherits its parent's branch
            Head::Detached(_) => graph
                .get(&old)
                .map(|parent| parent.branch_name.clone())
                .unwrap_or_else(|| DETACHED_BRANCH_NAME.to_string()),
        };
        let parents = if old.is_zero() {
            Vec::new()
        } else {
            vec![old.clone()]
        };
        graph.add(
            Commit {
                checksum: checksum.clone(),
                message: message.to_string(),
                branch_name: branch_name.clone(),
                author: String::new(),
                timestamp: Local::now().naive_local(),
                parents: Vec::new(),
            },
            parents,
        );
        self.save_graph(&graph)?;

        if matches!(head, Head::Detached(_)) {
            self.refs().write_head(&Head::Detached(checksum.clone()))?;
        }

        writeln!(
            self.writer(),
            "[{} {}] {}",
            branch_name,
            checksum.to_short(),
            message
        )?;

        Ok(())
    }
}
