use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::head::Head;
use crate::artifacts::index::IndexContent;
use crate::artifacts::objects::checksum::Checksum;
use anyhow::Context;
use std::io::Write;

impl Repository {
    /// Materialise another snapshot into the working tree
    ///
    /// The target is first tried as a commit checksum against the object
    /// store, then as a branch name. The snapshot's index object becomes the
    /// new index file; files missing from the snapshot are deleted, every
    /// tracked file is rewritten from the store.
    pub async fn checkout(&mut self, target: &str) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;
        self.ensure_clean(&index)?;

        let (new_head, checksum) = self.resolve_checkout_target(target)?;

        let content = self.restore_index_file(&checksum)?;
        self.restore_snapshot(&content)?;
        index.replace(content);

        self.refs().write_head(&new_head)?;
        writeln!(self.writer(), "Head now at {target}")?;

        Ok(())
    }

    fn resolve_checkout_target(&self, target: &str) -> anyhow::Result<(Head, Checksum)> {
        if let Ok(checksum) = Checksum::try_parse(target.to_string()) {
            if self.store().contains(&checksum) {
                return Ok((Head::Detached(checksum.clone()), checksum));
            }
        }

        let name = BranchName::try_parse(target.to_string())
            .with_context(|| format!("No branch nor commit matches {target}"))?;
        let tip = self.refs().read_branch(&name)?;

        Ok((Head::Branch(name), tip))
    }

    /// Decompress a snapshot object into the index file, byte for byte
    pub(crate) fn restore_index_file(&self, checksum: &Checksum) -> anyhow::Result<IndexContent> {
        if checksum.is_zero() {
            std::fs::write(self.index_path(), "").context("Unable to rewrite the index")?;
            return Ok(IndexContent::default());
        }

        let data = self.store().get(checksum)?;
        std::fs::write(self.index_path(), &data).context("Unable to rewrite the index")?;

        let text = String::from_utf8(data.to_vec())
            .map_err(|_| anyhow::anyhow!("Snapshot {checksum} is not valid text"))?;
        IndexContent::parse(&text)
    }

    /// Rewrite the working tree to match a snapshot
    ///
    /// Tracked files not present in the snapshot are deleted; everything the
    /// snapshot references is materialised from the object store.
    pub(crate) fn restore_snapshot(&self, content: &IndexContent) -> anyhow::Result<()> {
        for file in self.workspace().list_files(None)? {
            let filename = file.to_string_lossy();
            if !content.files.contains_key(filename.as_ref()) {
                self.workspace().delete_file(&filename)?;
            }
        }

        for (filename, info) in &content.files {
            self.store()
                .materialise(&info.checksum, &self.workspace().absolute(filename))?;
        }

        Ok(())
    }
}
