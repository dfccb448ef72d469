//! Repository abstraction and coordination
//!
//! The `Repository` type is a facade over the lower-level areas (object
//! store, index, workspace, refs) and carries the repository root through
//! every operation. The verbs themselves live in `commands`, one
//! `impl Repository` block per verb.

use crate::areas::index::Index;
use crate::areas::object_store::ObjectStore;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use crate::artifacts::commit::graph::CommitGraph;
use crate::artifacts::index::IndexContent;
use crate::artifacts::objects::checksum::Checksum;
use crate::artifacts::status::StatusReport;
use std::cell::{RefCell, RefMut};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Repository directory name
pub const JIT_DIR: &str = ".jit";

/// Object store directory name
const OBJECTS_DIR: &str = "objects";

/// Index file name
const INDEX_FILE: &str = "index";

/// Message shown whenever a dirty working tree blocks an operation
pub const DIRTY_REPO_ERROR: &str = "You have uncommitted changes! Please commit them first";

/// Snapshot-based repository
///
/// Coordinates the object store, index, workspace and refs. This is the
/// entry point for every verb.
pub struct Repository {
    /// Repository root path
    path: Box<Path>,
    /// Output writer (stdout in production, a buffer in tests)
    writer: RefCell<Box<dyn std::io::Write>>,
    /// Staging area
    index: Arc<Mutex<Index>>,
    /// Content-addressed store
    store: ObjectStore,
    /// Working directory
    workspace: Workspace,
    /// Reference manager
    refs: Refs,
}

impl Repository {
    pub fn new(path: PathBuf, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(&path)?;
        }
        let path = path.canonicalize()?;

        let jit_path = path.join(JIT_DIR);
        let index = Index::new(jit_path.join(INDEX_FILE).into_boxed_path());
        let store = ObjectStore::new(jit_path.join(OBJECTS_DIR).into_boxed_path());
        let workspace = Workspace::new(path.clone().into_boxed_path());
        let refs = Refs::new(jit_path.into_boxed_path());

        Ok(Repository {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            index: Arc::new(Mutex::new(index)),
            store,
            workspace,
            refs,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn jit_path(&self) -> PathBuf {
        self.path.join(JIT_DIR)
    }

    pub fn index_path(&self) -> PathBuf {
        self.jit_path().join(INDEX_FILE)
    }

    pub fn writer(&self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&self) -> Arc<Mutex<Index>> {
        self.index.clone()
    }

    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    /// Fail unless the repository directory exists
    pub fn ensure_initialized(&self) -> anyhow::Result<()> {
        if !self.jit_path().exists() {
            anyhow::bail!("Not a jit repository");
        }

        Ok(())
    }

    /// Scan the whole working tree and classify it against an index
    pub fn status_report(&self, index: &Index) -> anyhow::Result<StatusReport> {
        let scanned = self.workspace.scan(None)?;

        Ok(StatusReport::compute(index.content(), &scanned))
    }

    /// Safety gate used by branch, checkout and merge
    pub fn ensure_clean(&self, index: &Index) -> anyhow::Result<()> {
        if !self.status_report(index)?.is_clean() {
            anyhow::bail!("{DIRTY_REPO_ERROR}");
        }

        Ok(())
    }

    /// Load an index snapshot from the object store
    ///
    /// The zero checksum reads as the empty snapshot of an unborn branch.
    pub fn load_snapshot(&self, checksum: &Checksum) -> anyhow::Result<IndexContent> {
        if checksum.is_zero() {
            return Ok(IndexContent::default());
        }

        let data = self.store.get(checksum)?;
        let text = String::from_utf8(data.to_vec())
            .map_err(|_| anyhow::anyhow!("Snapshot {checksum} is not valid text"))?;

        IndexContent::parse(&text)
    }

    /// Load the commit graph from its fixed object address
    pub fn load_graph(&self) -> anyhow::Result<CommitGraph> {
        CommitGraph::load(&self.store.object_path(&CommitGraph::address()))
    }

    /// Persist the commit graph at its fixed object address
    pub fn save_graph(&self, graph: &CommitGraph) -> anyhow::Result<()> {
        graph.save(&self.store.object_path(&CommitGraph::address()))
    }
}
