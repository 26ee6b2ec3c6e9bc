//! Per-hunk line pairing with intra-line change markers.
//!
//! Aligns a hunk's old-text and new-text line lists into a synchronized
//! sequence of [`Triple`]s. Replaced line pairs that are similar enough get
//! character-level span markers; dissimilar pairs are marked whole-line.
//! The markers are zero-width tags stripped (or turned into colors) by the
//! renderer, never shown raw.

use similar::{Algorithm, DiffOp, capture_diff_slices, get_diff_ratio};

/// Start of a deleted span.
pub const MARK_DELETE: &str = "\u{0}-";
/// Start of an inserted span.
pub const MARK_INSERT: &str = "\u{0}+";
/// Start of a substituted span.
pub const MARK_CHANGE: &str = "\u{0}^";
/// Ends any open span.
pub const MARK_END: &str = "\u{1}";

/// Replaced pairs at or above this ratio get intra-line markers; below it
/// they keep whole-line markers.
const SIMILARITY_CUTOFF: f32 = 0.75;

/// One side of a [`Triple`]: the 1-based position within the hunk, plus the
/// marker-bearing text. `num` is `None` when this side has no line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Side {
    pub num: Option<usize>,
    pub text: String,
}

impl Side {
    fn present(num: usize, text: String) -> Self {
        Self {
            num: Some(num),
            text,
        }
    }

    fn absent() -> Self {
        Self::default()
    }
}

/// A synchronized pair of old/new lines as consumed by the renderer.
///
/// `changed` is false only for common lines duplicated on both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple {
    pub old: Side,
    pub new: Side,
    pub changed: bool,
}

/// Align `old` against `new`. Every input line appears in exactly one
/// triple and triples preserve input order.
pub fn mdiff(old: &[&str], new: &[&str]) -> Vec<Triple> {
    let ops = capture_diff_slices(Algorithm::Myers, old, new);
    let mut triples = Vec::with_capacity(old.len().max(new.len()));

    for op in &ops {
        match *op {
            DiffOp::Equal {
                old_index,
                new_index,
                len,
            } => {
                for k in 0..len {
                    triples.push(Triple {
                        old: Side::present(old_index + k + 1, old[old_index + k].to_string()),
                        new: Side::present(new_index + k + 1, old[old_index + k].to_string()),
                        changed: false,
                    });
                }
            }
            DiffOp::Delete {
                old_index, old_len, ..
            } => {
                for k in 0..old_len {
                    triples.push(deleted(old_index + k, old[old_index + k]));
                }
            }
            DiffOp::Insert {
                new_index, new_len, ..
            } => {
                for k in 0..new_len {
                    triples.push(inserted(new_index + k, new[new_index + k]));
                }
            }
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                // Pair lines positionally; the overhang of the longer side
                // becomes one-sided triples.
                for k in 0..old_len.max(new_len) {
                    match (k < old_len, k < new_len) {
                        (true, true) => {
                            triples.push(replaced(
                                old_index + k,
                                old[old_index + k],
                                new_index + k,
                                new[new_index + k],
                            ));
                        }
                        (true, false) => {
                            triples.push(deleted(old_index + k, old[old_index + k]));
                        }
                        (false, true) => {
                            triples.push(inserted(new_index + k, new[new_index + k]));
                        }
                        (false, false) => unreachable!(),
                    }
                }
            }
        }
    }

    triples
}

/// Remove all span markers, leaving the original text.
pub fn strip_markers(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '\u{0}' => {
                // the kind character is part of the marker
                chars.next();
            }
            '\u{1}' => {}
            _ => out.push(c),
        }
    }
    out
}

fn deleted(index: usize, text: &str) -> Triple {
    Triple {
        old: Side::present(index + 1, format!("{MARK_DELETE}{text}{MARK_END}")),
        new: Side::absent(),
        changed: true,
    }
}

fn inserted(index: usize, text: &str) -> Triple {
    Triple {
        old: Side::absent(),
        new: Side::present(index + 1, format!("{MARK_INSERT}{text}{MARK_END}")),
        changed: true,
    }
}

fn replaced(old_index: usize, old: &str, new_index: usize, new: &str) -> Triple {
    let (old_marked, new_marked) = match mark_similar_pair(old, new) {
        Some(pair) => pair,
        None => (
            format!("{MARK_DELETE}{old}{MARK_END}"),
            format!("{MARK_INSERT}{new}{MARK_END}"),
        ),
    };
    Triple {
        old: Side::present(old_index + 1, old_marked),
        new: Side::present(new_index + 1, new_marked),
        changed: true,
    }
}

/// Character-level markers for a near-matching pair, or `None` when the two
/// lines are too different to highlight span by span.
fn mark_similar_pair(old: &str, new: &str) -> Option<(String, String)> {
    let old_chars: Vec<char> = old.chars().collect();
    let new_chars: Vec<char> = new.chars().collect();
    let ops = capture_diff_slices(Algorithm::Myers, &old_chars, &new_chars);

    if get_diff_ratio(&ops, old_chars.len(), new_chars.len()) < SIMILARITY_CUTOFF {
        return None;
    }

    let mut left = String::with_capacity(old.len());
    let mut right = String::with_capacity(new.len());
    for op in &ops {
        match *op {
            DiffOp::Equal {
                old_index,
                new_index,
                len,
            } => {
                left.extend(&old_chars[old_index..old_index + len]);
                right.extend(&new_chars[new_index..new_index + len]);
            }
            DiffOp::Delete {
                old_index, old_len, ..
            } => {
                left.push_str(MARK_DELETE);
                left.extend(&old_chars[old_index..old_index + old_len]);
                left.push_str(MARK_END);
            }
            DiffOp::Insert {
                new_index, new_len, ..
            } => {
                right.push_str(MARK_INSERT);
                right.extend(&new_chars[new_index..new_index + new_len]);
                right.push_str(MARK_END);
            }
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                left.push_str(MARK_CHANGE);
                left.extend(&old_chars[old_index..old_index + old_len]);
                left.push_str(MARK_END);
                right.push_str(MARK_CHANGE);
                right.extend(&new_chars[new_index..new_index + new_len]);
                right.push_str(MARK_END);
            }
        }
    }

    Some((left, right))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nums(triples: &[Triple]) -> Vec<(Option<usize>, Option<usize>, bool)> {
        triples
            .iter()
            .map(|t| (t.old.num, t.new.num, t.changed))
            .collect()
    }

    #[test]
    fn equal_lines_pair_unchanged() {
        let triples = mdiff(&["a\n", "b\n"], &["a\n", "b\n"]);

        assert_eq!(
            nums(&triples),
            vec![(Some(1), Some(1), false), (Some(2), Some(2), false)]
        );
        assert_eq!(triples[0].old.text, "a\n");
        assert_eq!(triples[0].new.text, "a\n");
    }

    #[test]
    fn pure_insertion_is_one_sided() {
        let triples = mdiff(&["a\n"], &["a\n", "b\n"]);

        assert_eq!(
            nums(&triples),
            vec![(Some(1), Some(1), false), (None, Some(2), true)]
        );
        assert_eq!(triples[1].new.text, "\u{0}+b\n\u{1}");
    }

    #[test]
    fn pure_deletion_is_one_sided() {
        let triples = mdiff(&["a\n", "b\n"], &["b\n"]);

        assert_eq!(
            nums(&triples),
            vec![(Some(1), None, true), (Some(2), Some(1), false)]
        );
        assert_eq!(triples[0].old.text, "\u{0}-a\n\u{1}");
    }

    #[test]
    fn dissimilar_replace_keeps_whole_line_markers() {
        let triples = mdiff(&["one\n"], &["two\n"]);

        assert_eq!(nums(&triples), vec![(Some(1), Some(1), true)]);
        assert_eq!(triples[0].old.text, "\u{0}-one\n\u{1}");
        assert_eq!(triples[0].new.text, "\u{0}+two\n\u{1}");
    }

    #[test]
    fn similar_replace_gets_intra_line_markers() {
        let triples = mdiff(&["hello world\n"], &["hello brave world\n"]);

        assert_eq!(nums(&triples), vec![(Some(1), Some(1), true)]);
        assert_eq!(triples[0].old.text, "hello world\n");
        assert_eq!(triples[0].new.text, "hello \u{0}+brave \u{1}world\n");
    }

    #[test]
    fn replace_overhang_becomes_one_sided() {
        let triples = mdiff(&["one\n", "three\n"], &["two\n"]);

        assert_eq!(
            nums(&triples),
            vec![(Some(1), Some(1), true), (Some(2), None, true)]
        );
    }

    #[test]
    fn every_line_appears_exactly_once() {
        let old = vec!["a\n", "b\n", "c\n", "d\n"];
        let new = vec!["a\n", "x\n", "c\n", "e\n", "f\n"];
        let triples = mdiff(&old, &new);

        let old_nums: Vec<usize> = triples.iter().filter_map(|t| t.old.num).collect();
        let new_nums: Vec<usize> = triples.iter().filter_map(|t| t.new.num).collect();
        assert_eq!(old_nums, vec![1, 2, 3, 4]);
        assert_eq!(new_nums, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn strip_markers_round_trips() {
        assert_eq!(strip_markers("a\u{0}-bc\u{1}d"), "abcd");
        assert_eq!(strip_markers("\u{0}+x\u{1}"), "x");
        assert_eq!(strip_markers("plain"), "plain");
    }
}
