//! Content addressing primitives
//!
//! Everything stored by the repository is addressed by the SHA-1 hash of its
//! uncompressed content, rendered as 40 lowercase hexadecimal characters.

pub mod checksum;

/// Length of a hex-encoded SHA-1 digest
pub const CHECKSUM_LENGTH: usize = 40;
