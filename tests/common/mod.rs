#![allow(dead_code)]

use assert_cmd::Command;
use assert_fs::TempDir;
use sha1::{Digest, Sha1};
use std::path::Path;

/// Build a `jit` command running inside the given directory
pub fn run_jit(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("jit").expect("Failed to find jit binary");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

/// Write a working-tree file, creating parent directories as needed
pub fn write_file(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directories");
    }
    std::fs::write(path, content).expect("Failed to write file");
}

pub fn read_file(dir: &Path, relative: &str) -> String {
    std::fs::read_to_string(dir.join(relative)).expect("Failed to read file")
}

/// Read a ref file under `.jit`, trimmed
pub fn read_ref(dir: &Path, ref_path: &str) -> String {
    read_file(dir, &format!(".jit/{ref_path}")).trim().to_string()
}

/// Hex SHA-1 of a file under the repository root
pub fn checksum_of(dir: &Path, relative: &str) -> String {
    let data = std::fs::read(dir.join(relative)).expect("Failed to read file for hashing");
    let mut hasher = Sha1::new();
    hasher.update(&data);
    format!("{:x}", hasher.finalize())
}

/// Fan-out object path of a checksum, relative to the repository root
pub fn object_path(checksum: &str) -> String {
    format!(".jit/objects/{}/{}", &checksum[..2], &checksum[2..])
}

/// A fresh temp dir with an initialised repository
pub fn init_repository() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    run_jit(dir.path(), &["init"]).assert().success();
    dir
}

/// Stage and commit one file, returning the new master tip
pub fn commit_file(dir: &Path, relative: &str, content: &str, message: &str) -> String {
    write_file(dir, relative, content);
    run_jit(dir, &["add", relative]).assert().success();
    run_jit(dir, &["commit", message]).assert().success();
    read_head_tip(dir)
}

/// Resolve HEAD to a concrete checksum
pub fn read_head_tip(dir: &Path) -> String {
    let head = read_ref(dir, "HEAD");
    if head.starts_with("refs/") {
        read_ref(dir, &head)
    } else {
        head
    }
}
