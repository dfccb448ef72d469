use crate::areas::refs::LogKind;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::head::Head;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// Create a branch at the current position and switch HEAD onto it
    pub async fn create_branch(&mut self, name: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let name = BranchName::try_parse(name.to_string())?;
        if self.refs().branch_exists(&name) {
            anyhow::bail!("branch {} already exists", name);
        }

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;
        self.ensure_clean(&index)?;

        let checksum = self.refs().resolve_head()?;
        self.refs().write_branch(&name, &checksum)?;
        self.refs().write_head(&Head::Branch(name.clone()))?;
        self.refs().append_log(
            &name.ref_path(),
            &checksum,
            &checksum,
            LogKind::Branch,
            name.as_ref(),
        )?;

        writeln!(self.writer(), "Switched to a new branch '{name}'")?;

        Ok(())
    }

    /// List every branch, marking the current one
    pub async fn list_branches(&mut self) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let current = self.refs().read_head()?.branch().cloned();

        for name in self.refs().list_branches()? {
            if Some(&name) == current.as_ref() {
                writeln!(self.writer(), "* {}", name.as_ref().green())?;
            } else {
                writeln!(self.writer(), "  {name}")?;
            }
        }

        Ok(())
    }
}
