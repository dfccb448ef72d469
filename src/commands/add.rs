use crate::areas::repository::Repository;
use std::collections::BTreeMap;
use std::path::Path;

impl Repository {
    /// Recursively scan the given paths and stage every non-ignored file
    pub async fn add(&mut self, paths: &[String]) -> anyhow::Result<()> {
        self.ensure_initialized()?;

        let mut scanned = BTreeMap::new();
        for path in paths {
            // a path that does not exist (yet) is skipped, not an error
            if !self.workspace().absolute(path).exists() {
                continue;
            }
            scanned.extend(self.workspace().scan(Some(Path::new(path)))?);
        }

        if scanned.is_empty() {
            return Ok(());
        }

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;
        index.stage(scanned.clone());
        index.write_updates()?;

        // every scanned file lands in the object store; existing blobs are no-ops
        for info in scanned.values() {
            let source = self.workspace().absolute(&info.filename);
            self.store().put(&source, &info.checksum)?;
        }

        Ok(())
    }
}
