//! Line diff based on the longest common subsequence
//!
//! The change script is produced by walking the LCS table back from the
//! bottom-right corner: equal lines are emitted as context (`"  line"`),
//! lines only in the new sequence as additions (`"+ line"`), lines only in
//! the old sequence as deletions (`"- line"`).
//!
//! When both directions of the walk preserve the LCS length the addition
//! direction wins. That tie-break is part of the contract.

/// Build the `(|a|+1) x (|b|+1)` LCS length table
///
/// `table[i][j]` is the length of the longest common subsequence of
/// `a[..i]` and `b[..j]`.
pub fn lcs_table(a: &[String], b: &[String]) -> Vec<Vec<usize>> {
    let (n, m) = (a.len(), b.len());
    let mut table = vec![vec![0usize; m + 1]; n + 1];

    for i in 1..=n {
        for j in 1..=m {
            if a[i - 1] == b[j - 1] {
                table[i][j] = table[i - 1][j - 1] + 1;
            } else {
                table[i][j] = table[i - 1][j].max(table[i][j - 1]);
            }
        }
    }

    table
}

/// Emit the change script transforming `a` into `b`
pub fn compute_diff(a: &[String], b: &[String]) -> Vec<String> {
    let table = lcs_table(a, b);
    let (mut i, mut j) = (a.len(), b.len());
    let mut script = Vec::new();

    while i > 0 || j > 0 {
        if i > 0 && j > 0 && a[i - 1] == b[j - 1] {
            script.push(format!("  {}", a[i - 1]));
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || table[i][j - 1] >= table[i - 1][j]) {
            script.push(format!("+ {}", b[j - 1]));
            j -= 1;
        } else {
            script.push(format!("- {}", a[i - 1]));
            i -= 1;
        }
    }

    script.reverse();
    script
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|line| line.to_string()).collect()
    }

    /// Replay a change script against its old sequence
    fn apply_script(script: &[String]) -> Vec<String> {
        script
            .iter()
            .filter(|line| line.starts_with("  ") || line.starts_with("+ "))
            .map(|line| line[2..].to_string())
            .collect()
    }

    #[test]
    fn identical_sequences_are_all_context() {
        let a = lines(&["one", "two"]);
        assert_eq!(compute_diff(&a, &a), lines(&["  one", "  two"]));
    }

    #[test]
    fn appended_line_is_an_addition() {
        let old = lines(&["hello"]);
        let new = lines(&["hello", "world"]);

        assert_eq!(compute_diff(&old, &new), lines(&["  hello", "+ world"]));
    }

    #[test]
    fn removed_line_is_a_deletion() {
        let old = lines(&["hello", "world"]);
        let new = lines(&["hello"]);

        assert_eq!(compute_diff(&old, &new), lines(&["  hello", "- world"]));
    }

    #[test]
    fn replaced_line_deletes_then_adds() {
        let old = lines(&["a", "b", "c"]);
        let new = lines(&["a", "x", "c"]);

        assert_eq!(
            compute_diff(&old, &new),
            lines(&["  a", "- b", "+ x", "  c"])
        );
    }

    #[test]
    fn tie_break_takes_the_addition_step_first() {
        // both directions preserve the LCS length; the walk must consume the
        // addition before the deletion, so the reversed script deletes first
        let old = lines(&["a"]);
        let new = lines(&["b"]);

        assert_eq!(compute_diff(&old, &new), lines(&["- a", "+ b"]));
    }

    #[test]
    fn diff_against_empty_adds_everything() {
        let new = lines(&["one", "two"]);
        assert_eq!(compute_diff(&[], &new), lines(&["+ one", "+ two"]));
    }

    proptest! {
        #[test]
        fn applying_the_script_reproduces_the_new_sequence(
            a in proptest::collection::vec("[abc]{0,3}", 0..12),
            b in proptest::collection::vec("[abc]{0,3}", 0..12),
        ) {
            let script = compute_diff(&a, &b);
            prop_assert_eq!(apply_script(&script), b);
        }

        #[test]
        fn deletions_in_the_script_reproduce_the_old_sequence(
            a in proptest::collection::vec("[abc]{0,3}", 0..12),
            b in proptest::collection::vec("[abc]{0,3}", 0..12),
        ) {
            let script = compute_diff(&a, &b);
            let old: Vec<String> = script
                .iter()
                .filter(|line| line.starts_with("  ") || line.starts_with("- "))
                .map(|line| line[2..].to_string())
                .collect();
            prop_assert_eq!(old, a);
        }
    }
}
