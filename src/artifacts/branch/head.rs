//! The HEAD reference
//!
//! HEAD is either attached to a branch (symbolic, `refs/heads/<name>`) or
//! detached at a raw commit checksum. The two states are distinct variants,
//! not a string prefix convention.

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::checksum::Checksum;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    /// Attached to a branch; the tip lives in the branch ref file
    Branch(BranchName),
    /// Detached at a concrete commit
    Detached(Checksum),
}

impl Head {
    /// Parse the content of the HEAD file
    pub fn try_parse(content: &str) -> anyhow::Result<Self> {
        let content = content.trim();

        if content.starts_with("refs/") {
            Ok(Head::Branch(BranchName::try_parse_ref_path(content)?))
        } else {
            Ok(Head::Detached(Checksum::try_parse(content.to_string())?))
        }
    }

    /// Render the content of the HEAD file
    pub fn render(&self) -> String {
        match self {
            Head::Branch(name) => name.ref_path(),
            Head::Detached(checksum) => checksum.to_string(),
        }
    }

    /// Ref path the log of this position is appended under
    pub fn log_ref_path(&self) -> String {
        match self {
            Head::Branch(name) => name.ref_path(),
            Head::Detached(_) => "HEAD".to_string(),
        }
    }

    pub fn branch(&self) -> Option<&BranchName> {
        match self {
            Head::Branch(name) => Some(name),
            Head::Detached(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_symbolic_ref() {
        let head = Head::try_parse("refs/heads/master\n").unwrap();
        assert_eq!(
            head,
            Head::Branch(BranchName::try_parse("master".to_string()).unwrap())
        );
        assert_eq!(head.render(), "refs/heads/master");
    }

    #[test]
    fn parses_a_detached_checksum() {
        let digest = "f572d396fae9206628714fb2ce00f72e94f2258f";
        let head = Head::try_parse(digest).unwrap();
        assert_eq!(
            head,
            Head::Detached(Checksum::try_parse(digest.to_string()).unwrap())
        );
        assert_eq!(head.render(), digest);
    }

    #[test]
    fn rejects_garbage() {
        assert!(Head::try_parse("not a head").is_err());
    }
}
