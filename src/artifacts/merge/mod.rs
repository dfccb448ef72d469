//! Three-way line merge
//!
//! Reconciles two divergent line sequences against a common base with a
//! single cursor per sequence. The algorithm is line-aligned and runs in
//! O(n); it is deliberately simpler than subsequence-based merges and
//! produces conservative conflicts.

/// Marker opening the local side of a conflict block
pub const CONFLICT_OURS_MARKER: &str = "<<<<<<< BRANCH 1";
/// Marker separating the two sides
pub const CONFLICT_SEPARATOR: &str = "=======";
/// Marker closing the incoming side
pub const CONFLICT_THEIRS_MARKER: &str = ">>>>>>> BRANCH 2";

/// Result of a three-way merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub lines: Vec<String>,
    pub has_conflicts: bool,
}

/// Merge `ours` and `theirs` relative to `base`, line by line
///
/// At each step the three cursors expose one line each, an exhausted cursor
/// reading as the empty string:
///
/// - both sides agree: keep the line, the base advances only when it agrees
/// - only theirs changed: take theirs
/// - only ours changed: keep ours
/// - both changed differently: emit a conflict block with both sides
///
/// A cursor that has run past the end of its sequence never contributes its
/// empty placeholder to the output.
pub fn three_way_merge(base: &[String], ours: &[String], theirs: &[String]) -> MergeOutcome {
    let mut merged = Vec::new();
    let mut has_conflicts = false;
    let (mut i, mut j, mut k) = (0usize, 0usize, 0usize);

    while i < base.len() || j < ours.len() || k < theirs.len() {
        let base_line = base.get(i).map(String::as_str).unwrap_or("");
        let ours_line = ours.get(j).map(String::as_str).unwrap_or("");
        let theirs_line = theirs.get(k).map(String::as_str).unwrap_or("");

        if ours_line == theirs_line {
            if j < ours.len() || k < theirs.len() {
                merged.push(ours_line.to_string());
            }
            // lines only remaining in the base were dropped by both sides
            if i < base.len() && (base_line == ours_line || (j >= ours.len() && k >= theirs.len()))
            {
                i += 1;
            }
            if j < ours.len() {
                j += 1;
            }
            if k < theirs.len() {
                k += 1;
            }
        } else if ours_line == base_line {
            // only theirs changed the line
            if k < theirs.len() {
                merged.push(theirs_line.to_string());
            }
            i += 1;
            j += 1;
            if k < theirs.len() {
                k += 1;
            }
        } else if theirs_line == base_line {
            // only ours changed the line
            if j < ours.len() {
                merged.push(ours_line.to_string());
            }
            i += 1;
            if j < ours.len() {
                j += 1;
            }
            k += 1;
        } else {
            has_conflicts = true;
            merged.push(CONFLICT_OURS_MARKER.to_string());
            merged.push(ours_line.to_string());
            merged.push(CONFLICT_SEPARATOR.to_string());
            merged.push(theirs_line.to_string());
            merged.push(CONFLICT_THEIRS_MARKER.to_string());
            if i < base.len() {
                i += 1;
            }
            if j < ours.len() {
                j += 1;
            }
            if k < theirs.len() {
                k += 1;
            }
        }
    }

    MergeOutcome {
        lines: merged,
        has_conflicts,
    }
}
