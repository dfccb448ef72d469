//! Content-addressed object store
//!
//! Maps a 40-hex checksum to a zlib-deflated blob on disk. Blobs live under
//! `.jit/objects/xx/yyy...` where `xx` is the first two hex characters of
//! the checksum. Writes are idempotent: an existing object is never touched,
//! and objects are never deleted.

use crate::artifacts::objects::checksum::Checksum;
use anyhow::Context;
use bytes::Bytes;
use derive_new::new;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, new)]
pub struct ObjectStore {
    /// Path to the objects directory (typically `.jit/objects`)
    path: Box<Path>,
}

impl ObjectStore {
    /// Absolute path an object with this checksum is stored at
    pub fn object_path(&self, checksum: &Checksum) -> PathBuf {
        self.path.join(checksum.to_path())
    }

    pub fn contains(&self, checksum: &Checksum) -> bool {
        self.object_path(checksum).exists()
    }

    /// Compress a source file into the store
    ///
    /// A no-op when the object already exists. The blob is written to a
    /// temporary name and renamed into place, then restricted to owner and
    /// group read permissions.
    pub fn put(&self, source: &Path, checksum: &Checksum) -> anyhow::Result<()> {
        let object_path = self.object_path(checksum);
        if object_path.exists() {
            return Ok(());
        }

        let data = std::fs::read(source)
            .with_context(|| format!("Unable to read source file {}", source.display()))?;
        let compressed = Self::compress(&data)?;

        let object_dir = object_path
            .parent()
            .with_context(|| format!("Invalid object path {}", object_path.display()))?;
        std::fs::create_dir_all(object_dir).with_context(|| {
            format!("Unable to create object directory {}", object_dir.display())
        })?;

        let temp_object_path = object_dir.join(Self::generate_temp_name());
        std::fs::write(&temp_object_path, &compressed).with_context(|| {
            format!("Unable to write object file {}", temp_object_path.display())
        })?;
        std::fs::rename(&temp_object_path, &object_path).with_context(|| {
            format!("Unable to rename object file to {}", object_path.display())
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&object_path, std::fs::Permissions::from_mode(0o440))
                .with_context(|| {
                    format!("Unable to set permissions on {}", object_path.display())
                })?;
        }

        Ok(())
    }

    /// Read and decompress an object
    pub fn get(&self, checksum: &Checksum) -> anyhow::Result<Bytes> {
        let object_path = self.object_path(checksum);
        let compressed = std::fs::read(&object_path)
            .with_context(|| format!("Unable to read object file {}", object_path.display()))?;

        Self::decompress(&compressed)
    }

    /// Read an object as lines of text
    ///
    /// Line terminators are discarded; empty lines between content are kept.
    pub fn get_text(&self, checksum: &Checksum) -> anyhow::Result<Vec<String>> {
        let data = self.get(checksum)?;
        let text = String::from_utf8(data.to_vec())
            .with_context(|| format!("Object {checksum} is not valid text"))?;

        Ok(text.lines().map(str::to_string).collect())
    }

    /// Decompress an object into a working-tree file
    ///
    /// Parent directories are created as needed; an existing file is
    /// overwritten and left read/write.
    pub fn materialise(&self, checksum: &Checksum, destination: &Path) -> anyhow::Result<()> {
        let data = self.get(checksum)?;

        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Unable to create directory {}", parent.display())
            })?;
        }

        std::fs::write(destination, &data)
            .with_context(|| format!("Unable to write file {}", destination.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(destination, std::fs::Permissions::from_mode(0o644))?;
        }

        Ok(())
    }

    pub fn compress(data: &[u8]) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(data)
            .context("Unable to compress object content")?;

        encoder
            .finish()
            .map(Bytes::from)
            .context("Unable to finish compressing object content")
    }

    pub fn decompress(data: &[u8]) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .context("Unable to decompress object content")?;

        Ok(decompressed.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::checksum::Checksum;

    fn temp_store() -> (PathBuf, ObjectStore) {
        let dir = std::env::temp_dir().join(format!(
            "jit-store-{}-{}",
            std::process::id(),
            rand::random::<u32>()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let store = ObjectStore::new(dir.clone().into_boxed_path());
        (dir, store)
    }

    #[test]
    fn stores_and_reads_back_a_blob() {
        let (dir, store) = temp_store();
        let source = dir.join("source.txt");
        std::fs::write(&source, b"hello\n").unwrap();

        let checksum = Checksum::of_file(&source).unwrap();
        store.put(&source, &checksum).unwrap();

        assert!(store.contains(&checksum));
        assert_eq!(store.get(&checksum).unwrap().as_ref(), b"hello\n");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn reading_and_rehashing_yields_the_requested_checksum() {
        let (dir, store) = temp_store();
        let source = dir.join("source.txt");
        std::fs::write(&source, b"some content\nwith lines\n").unwrap();

        let checksum = Checksum::of_file(&source).unwrap();
        store.put(&source, &checksum).unwrap();

        let round_tripped = Checksum::of_bytes(&store.get(&checksum).unwrap());
        assert_eq!(round_tripped, checksum);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn writing_an_existing_object_is_a_no_op() {
        let (dir, store) = temp_store();
        let source = dir.join("source.txt");
        std::fs::write(&source, b"original").unwrap();

        let checksum = Checksum::of_file(&source).unwrap();
        store.put(&source, &checksum).unwrap();

        // same checksum, different source content: the stored blob must win
        std::fs::write(&source, b"tampered").unwrap();
        store.put(&source, &checksum).unwrap();

        assert_eq!(store.get(&checksum).unwrap().as_ref(), b"original");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn splits_text_objects_into_lines() {
        let (dir, store) = temp_store();
        let source = dir.join("source.txt");
        std::fs::write(&source, b"one\n\nthree\n").unwrap();

        let checksum = Checksum::of_file(&source).unwrap();
        store.put(&source, &checksum).unwrap();

        assert_eq!(store.get_text(&checksum).unwrap(), vec!["one", "", "three"]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn compression_round_trips() {
        let data = b"the quick brown fox".repeat(64);
        let compressed = ObjectStore::compress(&data).unwrap();
        assert!(compressed.len() < data.len());

        let decompressed = ObjectStore::decompress(&compressed).unwrap();
        assert_eq!(decompressed.as_ref(), data.as_slice());
    }

    #[test]
    fn hash_is_stable_through_the_codec_path() {
        let data = b"stability check\n";
        let compressed = ObjectStore::compress(data).unwrap();
        let decompressed = ObjectStore::decompress(&compressed).unwrap();
        let recompressed = ObjectStore::compress(&decompressed).unwrap();
        let restored = ObjectStore::decompress(&recompressed).unwrap();

        assert_eq!(Checksum::of_bytes(&restored), Checksum::of_bytes(data));
    }
}
