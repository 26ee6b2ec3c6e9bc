//! One logical file's change within a diff stream.

use super::hunk::Hunk;

/// A unified-diff unit: one file's change, or a pseudo-unit wrapping a
/// non-file event (`Only in DIR: NAME`, `Binary files ... differ`, or
/// dangling trailing headers).
///
/// Owned exclusively by the parser while being built; read-only once
/// yielded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDiff {
    /// Leading non-hunk, non-path lines (`diff --git ...`, `index ...`, and
    /// the event line itself for pseudo-units).
    pub headers: Vec<String>,
    /// The raw `--- ` line, or empty for pseudo-units.
    pub old_path: String,
    /// The raw `+++ ` line, or empty for pseudo-units.
    pub new_path: String,
    /// Hunks in encounter order; empty for pseudo-units.
    pub hunks: Vec<Hunk>,
}

impl FileDiff {
    /// A pseudo-unit carrying only header lines.
    pub fn headers_only(headers: Vec<String>) -> Self {
        Self {
            headers,
            ..Self::default()
        }
    }

    /// True once the unit has both paths and at least one hunk, i.e. it can
    /// be yielded ahead of whatever starts next.
    pub(crate) fn is_complete(&self) -> bool {
        !self.old_path.is_empty() && !self.new_path.is_empty() && !self.hunks.is_empty()
    }
}
