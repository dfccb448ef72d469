use crate::areas::repository::Repository;
use crate::artifacts::objects::checksum::Checksum;
use anyhow::Context;
use std::io::Write;

/// Subdirectories of a fresh repository
const SUBDIRS: [&str; 7] = [
    "branches",
    "logs",
    "logs/refs",
    "logs/refs/heads",
    "refs",
    "refs/heads",
    "objects",
];

impl Repository {
    pub async fn init(&mut self) -> anyhow::Result<()> {
        let jit_path = self.jit_path();

        if jit_path.exists() {
            anyhow::bail!("Jit is already initialized for this directory");
        }

        for subdir in SUBDIRS {
            std::fs::create_dir_all(jit_path.join(subdir))
                .with_context(|| format!("Failed to create .jit/{subdir}"))?;
        }

        // master starts unborn: its ref holds the zero checksum
        std::fs::write(
            jit_path.join("refs/heads/master"),
            Checksum::zero().as_ref(),
        )
        .context("Failed to create refs/heads/master")?;
        std::fs::write(jit_path.join("HEAD"), "refs/heads/master")
            .context("Failed to create HEAD")?;
        std::fs::write(jit_path.join("logs/refs/heads/master"), "")
            .context("Failed to create the master log")?;
        std::fs::write(jit_path.join("index"), "").context("Failed to create the index")?;

        writeln!(self.writer(), "Initialized empty jit repository")?;

        Ok(())
    }
}
