//! Non-overlapping byte-range substitutions over a content string.
//!
//! Shared by every rewriter in the pipeline: replacements are collected
//! against one specific content string, checked for overlap, and applied
//! right-to-left so earlier offsets stay valid.

use crate::{Error, Result};

/// One byte-range substitution: replace `[start, end)` with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// First byte of the replaced range.
    pub start: usize,
    /// One past the last byte of the replaced range.
    pub end: usize,
    /// Replacement text.
    pub text: String,
}

impl Replacement {
    /// Build a replacement over `[start, end)`.
    #[must_use]
    pub fn new(start: usize, end: usize, text: impl Into<String>) -> Self {
        Self { start, end, text: text.into() }
    }
}

/// Verify that no two replacements overlap: sorted by start, every entry
/// must end at or before the next one begins.
///
/// # Errors
///
/// Returns [`Error::Replacement`] naming the first overlapping pair.
pub fn check_no_overlap(replacements: &[Replacement]) -> Result<()> {
    let mut sorted: Vec<&Replacement> = replacements.iter().collect();
    sorted.sort_by_key(|r| r.start);
    for pair in sorted.windows(2) {
        if pair[1].start < pair[0].end {
            return Err(Error::Replacement(format!(
                "overlap: [{}, {}) and [{}, {})",
                pair[0].start, pair[0].end, pair[1].start, pair[1].end
            )));
        }
    }
    Ok(())
}

/// Apply a replacement set to `text`: check overlap, then splice from the
/// highest start offset down so earlier offsets are unaffected.
///
/// # Errors
///
/// Returns [`Error::Replacement`] on overlap or on a range that falls
/// outside the text or has `start > end`.
pub fn apply(text: &str, replacements: &[Replacement]) -> Result<String> {
    check_no_overlap(replacements)?;

    let mut sorted: Vec<&Replacement> = replacements.iter().collect();
    sorted.sort_by(|a, b| b.start.cmp(&a.start));

    let mut out = text.to_string();
    for rep in sorted {
        if rep.end > out.len() || rep.start > rep.end {
            return Err(Error::Replacement(format!(
                "invalid replacement: [{}, {}) over {} bytes",
                rep.start,
                rep.end,
                out.len()
            )));
        }
        out.replace_range(rep.start..rep.end, &rep.text);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn applies_right_to_left() {
        let text = "aaa bbb ccc";
        let reps = vec![
            Replacement::new(0, 3, "xx"),
            Replacement::new(8, 11, "yyyy"),
        ];
        assert_eq!(apply(text, &reps).unwrap(), "xx bbb yyyy");
    }

    #[test]
    fn adjacent_ranges_are_legal() {
        let reps = vec![Replacement::new(0, 2, "A"), Replacement::new(2, 4, "B")];
        assert_eq!(apply("abcd", &reps).unwrap(), "AB");
    }

    #[test]
    fn overlap_is_rejected() {
        let reps = vec![Replacement::new(0, 3, "A"), Replacement::new(2, 5, "B")];
        assert!(matches!(apply("abcdef", &reps), Err(Error::Replacement(_))));
        assert!(check_no_overlap(&reps).is_err());
    }

    #[test]
    fn out_of_bounds_is_rejected() {
        let reps = vec![Replacement::new(0, 99, "A")];
        assert!(matches!(apply("short", &reps), Err(Error::Replacement(_))));
    }

    #[test]
    fn empty_range_inserts() {
        let reps = vec![Replacement::new(3, 3, "X")];
        assert_eq!(apply("abcdef", &reps).unwrap(), "abcXdef");
    }
}
