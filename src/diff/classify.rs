//! Line classification for the unified-diff grammar.
//!
//! All predicates are stateless and operate on a single already-decoded text
//! line (trailing newline included). They are grouped in the [`UnifiedDiff`]
//! dialect value so a future dialect (e.g. context diff) can supply its own
//! set without touching the parser.

use nom::Parser;
use nom::character::complete::{char, u64 as address_number};
use nom::combinator::{all_consuming, opt};
use nom::sequence::preceded;

use super::ParseError;
use super::hunk::Addr;

/// Length of the svn log separator: a run of exactly this many dashes is
/// never a deleted line, while `----` (yaml front matter) is.
const SVN_SEPARATOR_DASHES: usize = 72;

/// The unified-diff dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnifiedDiff;

impl UnifiedDiff {
    pub fn is_old_path(&self, line: &str) -> bool {
        line.starts_with("--- ")
    }

    pub fn is_new_path(&self, line: &str) -> bool {
        line.starts_with("+++ ")
    }

    /// Minimal valid hunk meta is `@@ -1 +1 @@`; extra text may trail the
    /// closing `@@` (git log does this). The `## ` form shows up in svn
    /// property changes from `svn log --diff`.
    pub fn is_hunk_meta(&self, line: &str) -> bool {
        marker_at_or_after(line, "@@ -", " @@", 8) || marker_at_or_after(line, "## -", " ##", 8)
    }

    /// Parse `@@ -start[,count] +start[,count] @@` into two address pairs.
    /// A missing count means 1, e.g. `@@ -1 +1,2 @@`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidHunkMeta`] naming the offending line when
    /// either address token is missing or non-numeric.
    pub fn parse_hunk_meta(&self, meta: &str) -> Result<(Addr, Addr), ParseError> {
        let mut tokens = meta.split_whitespace();
        let old = tokens.nth(1).and_then(|t| parse_address(t, '-'));
        let new = tokens.next().and_then(|t| parse_address(t, '+'));

        match (old, new) {
            (Some(old), Some(new)) => Ok((old, new)),
            _ => Err(ParseError::InvalidHunkMeta {
                meta: meta.trim_end().to_string(),
            }),
        }
    }

    /// Split a hunk content line into its tag character and the rest. A bare
    /// newline is an empty common line.
    pub fn parse_hunk_line(&self, line: &str) -> (char, String) {
        if line == "\n" {
            return (' ', line.to_string());
        }
        let mut chars = line.chars();
        let tag = chars.next().unwrap_or(' ');
        (tag, chars.as_str().to_string())
    }

    /// `----` alone is legitimate old content (seen in yaml files); a run of
    /// exactly 72 dashes is the svn log separator and must not be mistaken
    /// for a deletion.
    pub fn is_old(&self, line: &str) -> bool {
        line.starts_with('-') && !self.is_old_path(line) && !is_svn_separator(line)
    }

    pub fn is_new(&self, line: &str) -> bool {
        line.starts_with('+') && !self.is_new_path(line)
    }

    /// A bare newline counts: some tools strip the trailing whitespace off
    /// empty context lines.
    pub fn is_common(&self, line: &str) -> bool {
        line.starts_with(' ') || line == "\n"
    }

    /// Covers both `\ No newline at end of file` and the `... of property`
    /// variant emitted by svn.
    pub fn is_eof(&self, line: &str) -> bool {
        line.starts_with("\\ No newline at end of")
    }

    pub fn is_only_in_dir(&self, line: &str) -> bool {
        line.starts_with("Only in ")
    }

    pub fn is_binary_differ(&self, line: &str) -> bool {
        let line = line.trim_end();
        line.len() >= "Binary files  differ".len()
            && line.starts_with("Binary files ")
            && line.ends_with(" differ")
    }
}

/// True when `line` starts with `prefix` and the first occurrence of
/// `marker` is at byte offset `min` or later.
fn marker_at_or_after(line: &str, prefix: &str, marker: &str, min: usize) -> bool {
    line.starts_with(prefix) && line.find(marker).is_some_and(|i| i >= min)
}

fn is_svn_separator(line: &str) -> bool {
    let line = line.trim_end();
    line.len() == SVN_SEPARATOR_DASHES && line.bytes().all(|b| b == b'-')
}

/// Parse one `-start[,count]` or `+start[,count]` token.
fn parse_address(token: &str, sign: char) -> Option<Addr> {
    let parsed: nom::IResult<&str, (u64, Option<u64>)> = all_consuming(preceded(
        char(sign),
        (address_number, opt(preceded(char(','), address_number))),
    ))
    .parse(token);

    let (_, (start, count)) = parsed.ok()?;
    Some((start as usize, count.unwrap_or(1) as usize))
}
