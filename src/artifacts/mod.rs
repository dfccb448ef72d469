//! Data structures and algorithms
//!
//! - `branch`: branch names and the HEAD reference
//! - `commit`: commit records, the commit graph and its binary codec
//! - `diff`: LCS-based line diff
//! - `index`: the staging manifest and its text grammar
//! - `merge`: three-way line merge
//! - `objects`: content checksums
//! - `status`: working tree change classification

pub mod branch;
pub mod commit;
pub mod diff;
pub mod index;
pub mod merge;
pub mod objects;
pub mod status;
