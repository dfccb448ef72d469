//! Working directory operations
//!
//! The workspace enumerates regular files under the repository root,
//! filtered by the ignore rules, and returns normalised paths relative to
//! the root. It also performs the file reads and writes the merge and
//! checkout procedures need.
//!
//! ## Ignore rules
//!
//! The repository directory itself is always excluded. `.jitignore`
//! contributes one glob per line where `*` stands for one or more
//! characters: patterns ending with `/` match directory prefixes anywhere in
//! the path, patterns without a trailing slash match file names.

use crate::artifacts::index::file_info::FileInfo;
use crate::artifacts::objects::checksum::Checksum;
use crate::areas::repository::JIT_DIR;
use anyhow::Context;
use chrono::{DateTime, Local, NaiveDateTime};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// File holding the ignore globs, one per line
const IGNORE_FILE: &str = ".jitignore";

/// Compiled `.jitignore` rules
#[derive(Debug, Default)]
struct IgnoreRules {
    directories: Vec<Regex>,
    file_names: Vec<Regex>,
}

impl IgnoreRules {
    fn load(root: &Path) -> anyhow::Result<Self> {
        let ignore_path = root.join(IGNORE_FILE);
        if !ignore_path.exists() {
            return Ok(Self::default());
        }

        let mut rules = Self::default();
        let content = std::fs::read_to_string(&ignore_path)
            .with_context(|| format!("Unable to read {}", ignore_path.display()))?;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(prefix) = line.strip_suffix('/') {
                rules.directories.push(Self::glob_to_regex(prefix)?);
            } else {
                rules.file_names.push(Self::glob_to_regex(line)?);
            }
        }

        Ok(rules)
    }

    /// Translate a glob into a full-match regex, `*` expanding to one or
    /// more characters
    fn glob_to_regex(glob: &str) -> anyhow::Result<Regex> {
        let escaped = regex::escape(glob).replace(r"\*", ".+");

        Regex::new(&format!("^{escaped}$"))
            .with_context(|| format!("Invalid ignore pattern: {glob}"))
    }

    fn matches(&self, relative_path: &Path) -> bool {
        let file_name = relative_path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        if self.file_names.iter().any(|re| re.is_match(&file_name)) {
            return true;
        }

        relative_path.components().rev().skip(1).any(|component| {
            let Component::Normal(dir) = component else {
                return false;
            };
            let dir = dir.to_string_lossy();
            self.directories.iter().any(|re| re.is_match(&dir))
        })
    }
}

#[derive(Debug)]
pub struct Workspace {
    /// Repository root path
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn absolute(&self, relative: &str) -> PathBuf {
        self.path.join(relative)
    }

    /// Enumerate every tracked-eligible file under a subtree
    ///
    /// Paths are normalised (no `.`/`..` segments, no redundant separators)
    /// and relative to the repository root. The scan is read-only and
    /// idempotent.
    pub fn list_files(&self, subtree: Option<&Path>) -> anyhow::Result<Vec<PathBuf>> {
        let rules = IgnoreRules::load(&self.path)?;
        let start = match subtree {
            Some(subtree) => self.path.join(subtree),
            None => self.path.to_path_buf(),
        };

        if !start.exists() {
            anyhow::bail!("The specified path does not exist: {}", start.display());
        }

        if start.is_file() {
            let relative = self.relative_to_root(&start)?;
            return Ok(if self.is_ignored(&relative, &rules) {
                Vec::new()
            } else {
                vec![relative]
            });
        }

        let mut files = WalkDir::new(&start)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| self.relative_to_root(entry.path()).ok())
            .filter(|relative| !self.is_ignored(relative, &rules))
            .collect::<Vec<_>>();
        files.sort();

        Ok(files)
    }

    /// Scan a subtree into a file map with checksums and timestamps
    pub fn scan(&self, subtree: Option<&Path>) -> anyhow::Result<BTreeMap<String, FileInfo>> {
        let now = Local::now().naive_local();
        let mut current_files = BTreeMap::new();

        for relative in self.list_files(subtree)? {
            let absolute = self.path.join(&relative);
            let filename = relative.to_string_lossy().to_string();

            let metadata = std::fs::metadata(&absolute)
                .with_context(|| format!("Unable to stat {}", absolute.display()))?;
            let last_modified = metadata
                .modified()
                .map(|time| DateTime::<Local>::from(time).naive_local())
                .unwrap_or_else(|_| NaiveDateTime::default());

            current_files.insert(
                filename.clone(),
                FileInfo {
                    filename,
                    checksum: Checksum::of_file(&absolute)?,
                    addition_date: now,
                    last_modified,
                    is_dirty: false,
                    is_new: false,
                },
            );
        }

        Ok(current_files)
    }

    pub fn read_lines(&self, relative: &str) -> anyhow::Result<Vec<String>> {
        let path = self.path.join(relative);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Could not open {}", path.display()))?;

        Ok(content.lines().map(str::to_string).collect())
    }

    pub fn write_lines(&self, relative: &str, lines: &[String]) -> anyhow::Result<()> {
        let path = self.path.join(relative);
        let mut content = lines.join("\n");
        content.push('\n');

        std::fs::write(&path, content)
            .with_context(|| format!("Unable to write {}", path.display()))
    }

    pub fn delete_file(&self, relative: &str) -> anyhow::Result<()> {
        let path = self.path.join(relative);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Unable to delete {}", path.display()))?;
        }

        Ok(())
    }

    fn relative_to_root(&self, path: &Path) -> anyhow::Result<PathBuf> {
        let normalised: PathBuf = path
            .components()
            .filter(|component| !matches!(component, Component::CurDir))
            .collect();

        normalised
            .strip_prefix(self.path.as_ref())
            .map(Path::to_path_buf)
            .with_context(|| format!("{} is outside the repository", path.display()))
    }

    fn is_ignored(&self, relative: &Path, rules: &IgnoreRules) -> bool {
        let in_repo_dir = relative.components().any(|component| {
            matches!(component, Component::Normal(name) if name.to_string_lossy() == JIT_DIR)
        });

        in_repo_dir || rules.matches(relative)
    }
}
