//! Core repository components
//!
//! This module contains the stateful building blocks of a repository:
//!
//! - `index`: staging area tracking what would be committed now
//! - `object_store`: content-addressed storage for compressed blobs
//! - `refs`: HEAD, branch refs and their append-only logs
//! - `repository`: high-level coordination of the other areas
//! - `workspace`: working directory scanning and file operations

pub(crate) mod index;
pub(crate) mod object_store;
pub(crate) mod refs;
pub mod repository;
pub(crate) mod workspace;
