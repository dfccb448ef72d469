//! Branch names and the HEAD reference

pub mod branch_name;
pub mod head;

/// Pattern every branch name must match
pub const BRANCH_NAME_REGEX: &str = r"^[A-Za-z0-9._-]+$";
