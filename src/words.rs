//! Word-level re-marking of replaced line pairs.
//!
//! Character-level markers from [`crate::mdiff`] tend to shatter identifiers.
//! For a replaced pair this module re-diffs the two texts at word
//! granularity, splitting on case boundaries so `getFooBar` stays three
//! tokens, and reassembles them with the same span markers.

use similar::{Algorithm, DiffOp, capture_diff_slices};

use crate::mdiff::{MARK_CHANGE, MARK_DELETE, MARK_END, MARK_INSERT};

/// Re-diff a replaced pair at word granularity.
///
/// Returns both texts reassembled with delete/insert/change markers around
/// the non-equal spans; equal spans stay unmarked. Stripping the markers
/// from either output reproduces the corresponding input exactly.
pub fn refine(old: &str, new: &str) -> (String, String) {
    let old_words = split_words(old);
    let new_words = split_words(new);
    let ops = capture_diff_slices(Algorithm::Myers, &old_words, &new_words);

    let mut left = String::with_capacity(old.len());
    let mut right = String::with_capacity(new.len());
    for op in &ops {
        match *op {
            DiffOp::Equal {
                old_index,
                new_index,
                len,
            } => {
                push_words(&mut left, &old_words[old_index..old_index + len]);
                push_words(&mut right, &new_words[new_index..new_index + len]);
            }
            DiffOp::Delete {
                old_index, old_len, ..
            } => {
                left.push_str(MARK_DELETE);
                push_words(&mut left, &old_words[old_index..old_index + old_len]);
                left.push_str(MARK_END);
            }
            DiffOp::Insert {
                new_index, new_len, ..
            } => {
                right.push_str(MARK_INSERT);
                push_words(&mut right, &new_words[new_index..new_index + new_len]);
                right.push_str(MARK_END);
            }
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                left.push_str(MARK_CHANGE);
                push_words(&mut left, &old_words[old_index..old_index + old_len]);
                left.push_str(MARK_END);
                right.push_str(MARK_CHANGE);
                push_words(&mut right, &new_words[new_index..new_index + new_len]);
                right.push_str(MARK_END);
            }
        }
    }

    (left, right)
}

/// Tokenize into words, keeping every input character in exactly one token.
///
/// Token classes in priority order: a run of 2+ uppercase letters, an
/// uppercase letter followed by lowercase letters, a run of 2+ lowercase
/// letters, a run of alphanumerics, a single whitespace character, any
/// single other character. Longer alphabetic runs win over the single-char
/// fallback so identifier-like tokens are not shattered.
fn split_words(text: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let len = next_token_len(rest);
        let (word, tail) = rest.split_at(len);
        words.push(word);
        rest = tail;
    }
    words
}

/// Byte length of the token starting at the front of `s`.
fn next_token_len(s: &str) -> usize {
    let Some(first) = s.chars().next() else {
        return 0;
    };
    let head = first.len_utf8();
    let rest = &s[head..];

    if first.is_uppercase() {
        let upper = run_len(rest, char::is_uppercase);
        if upper > 0 {
            return head + upper;
        }
        let lower = run_len(rest, char::is_lowercase);
        if lower > 0 {
            return head + lower;
        }
        return head + run_len(rest, char::is_alphanumeric);
    }
    if first.is_lowercase() {
        let lower = run_len(rest, char::is_lowercase);
        if lower > 0 {
            return head + lower;
        }
        return head + run_len(rest, char::is_alphanumeric);
    }
    if first.is_alphanumeric() {
        return head + run_len(rest, char::is_alphanumeric);
    }
    head
}

/// Byte length of the leading run of characters satisfying `pred`.
fn run_len(s: &str, pred: impl Fn(char) -> bool) -> usize {
    s.char_indices()
        .find(|&(_, c)| !pred(c))
        .map_or(s.len(), |(i, _)| i)
}

fn push_words(out: &mut String, words: &[&str]) {
    for word in words {
        out.push_str(word);
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::mdiff::strip_markers;

    #[test]
    fn camel_case_splits_on_case_boundaries() {
        assert_eq!(split_words("getFooBar"), vec!["get", "Foo", "Bar"]);
        assert_eq!(split_words("HTTPServer"), vec!["HTTPS", "erver"]);
        assert_eq!(split_words("foo_bar99"), vec!["foo", "_", "bar", "99"]);
        assert_eq!(split_words("a b"), vec!["a", " ", "b"]);
    }

    #[test]
    fn every_character_lands_in_one_token() {
        let text = "fn main() {\n\tprintln!(\"héllo\");\n}";
        assert_eq!(split_words(text).concat(), text);
    }

    #[test]
    fn changed_word_is_marked_on_both_sides() {
        let (old, new) = refine("foo bar\n", "foo baz\n");

        assert_eq!(old, "foo \u{0}^bar\u{1}\n");
        assert_eq!(new, "foo \u{0}^baz\u{1}\n");
    }

    #[test]
    fn inserted_word_is_marked_only_on_new_side() {
        let (old, new) = refine("a c\n", "a b c\n");

        assert_eq!(old, "a c\n");
        assert_eq!(new, "a \u{0}+b \u{1}c\n");
    }

    #[test]
    fn identical_texts_carry_no_markers() {
        let (old, new) = refine("same line\n", "same line\n");

        assert_eq!(old, "same line\n");
        assert_eq!(new, "same line\n");
    }

    proptest! {
        #[test]
        fn refine_round_trips(a in "[^\\x00\\x01]{0,60}", b in "[^\\x00\\x01]{0,60}") {
            let (old, new) = refine(&a, &b);
            prop_assert_eq!(strip_markers(&old), a);
            prop_assert_eq!(strip_markers(&new), b);
        }
    }
}
