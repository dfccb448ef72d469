use crate::artifacts::branch::BRANCH_NAME_REGEX;
use anyhow::Context;

const REF_PREFIX: &str = "refs/heads/";

/// Validated branch name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: String) -> anyhow::Result<Self> {
        let re = regex::Regex::new(BRANCH_NAME_REGEX)
            .with_context(|| format!("invalid branch name regex: {BRANCH_NAME_REGEX}"))?;

        if re.is_match(&name) {
            Ok(Self(name))
        } else {
            anyhow::bail!("invalid branch name: {}", name);
        }
    }

    /// Ref path under the repository directory, e.g. `refs/heads/master`
    pub fn ref_path(&self) -> String {
        format!("{REF_PREFIX}{}", self.0)
    }

    /// Recover the branch name from a ref path
    pub fn try_parse_ref_path(ref_path: &str) -> anyhow::Result<Self> {
        let name = ref_path
            .strip_prefix(REF_PREFIX)
            .with_context(|| format!("ref path must start with '{REF_PREFIX}', got '{ref_path}'"))?;

        Self::try_parse(name.to_string())
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::proptest;

    proptest! {
        #[test]
        fn accepts_names_from_the_allowed_alphabet(
            name in "[A-Za-z0-9._-]+"
        ) {
            assert!(BranchName::try_parse(name).is_ok());
        }

        #[test]
        fn rejects_names_with_foreign_characters(
            prefix in "[A-Za-z0-9]*",
            forbidden in r"[/\\ :~^@{}\*\?\[]",
            suffix in "[A-Za-z0-9]*"
        ) {
            let name = format!("{prefix}{forbidden}{suffix}");
            assert!(BranchName::try_parse(name).is_err());
        }
    }

    #[test]
    fn rejects_the_empty_name() {
        assert!(BranchName::try_parse(String::new()).is_err());
    }

    #[test]
    fn ref_path_round_trips() {
        let name = BranchName::try_parse("feature-1".to_string()).unwrap();
        assert_eq!(name.ref_path(), "refs/heads/feature-1");
        assert_eq!(
            BranchName::try_parse_ref_path("refs/heads/feature-1").unwrap(),
            name
        );
    }
}
