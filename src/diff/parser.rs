//! Pull-based state machine assembling file-diff units from a line stream.

use std::collections::VecDeque;
use std::mem;

use super::classify::UnifiedDiff;
use super::file::FileDiff;
use super::{Hunk, ParseError};

/// Streaming parser over decoded diff lines.
///
/// Pulls each input line exactly once and yields one [`FileDiff`] at a time,
/// without materializing the rest of the stream. Safe to abandon mid-stream;
/// it holds no external resources.
pub struct DiffParser<I> {
    lines: I,
    dialect: UnifiedDiff,
    /// The in-progress unit.
    diff: FileDiff,
    /// Pending unclassified lines waiting for the construct they precede.
    headers: Vec<String>,
    /// Finalized units not yet handed to the caller. A single input line can
    /// finalize the current unit *and* produce a pseudo-unit, hence a queue.
    ready: VecDeque<FileDiff>,
    done: bool,
}

impl<I> DiffParser<I>
where
    I: Iterator<Item = String>,
{
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            dialect: UnifiedDiff,
            diff: FileDiff::default(),
            headers: Vec::new(),
            ready: VecDeque::new(),
            done: false,
        }
    }

    /// Apply the transition rules to one input line.
    fn feed(&mut self, line: String) -> Result<(), ParseError> {
        let d = self.dialect;

        if d.is_old_path(&line) {
            // Only a completed (or absent) last hunk lets this start a new
            // file-diff; otherwise it is a deleted content line that merely
            // looks like an old-path marker.
            match self.diff.hunks.last_mut() {
                Some(hunk) if !hunk.is_completed() => {
                    hunk.append(d.parse_hunk_line(&line));
                }
                _ => {
                    if self.diff.is_complete() {
                        self.ready.push_back(mem::take(&mut self.diff));
                    }
                    self.diff = FileDiff {
                        headers: mem::take(&mut self.headers),
                        old_path: line,
                        ..FileDiff::default()
                    };
                }
            }
        } else if d.is_new_path(&line) && !self.diff.old_path.is_empty() {
            if self.diff.new_path.is_empty() {
                self.diff.new_path = line;
            } else if let Some(hunk) = self.diff.hunks.last_mut() {
                // Same ambiguity as above, for a literal '+++ ' line
                hunk.append(d.parse_hunk_line(&line));
            } else {
                self.headers.push(line);
            }
        } else if d.is_hunk_meta(&line) {
            let (old_addr, new_addr) = d.parse_hunk_meta(&line)?;
            let hunk = Hunk::new(mem::take(&mut self.headers), line, old_addr, new_addr);
            self.diff.hunks.push(hunk);
        } else if !self.diff.hunks.is_empty()
            && self.headers.is_empty()
            && (d.is_old(&line) || d.is_new(&line) || d.is_common(&line))
        {
            // A pending-headers backlog means we sit between a hunk-like
            // header and the next hunk meta; content must not be swallowed.
            if let Some(hunk) = self.diff.hunks.last_mut() {
                hunk.append(d.parse_hunk_line(&line));
            }
        } else if d.is_eof(&line) {
            // '\ No newline at end of ...' markers are dropped
        } else if d.is_only_in_dir(&line) || d.is_binary_differ(&line) {
            // Standalone event: close the current unit if it is complete,
            // then emit a headers-only pseudo-unit for this line.
            if self.diff.is_complete() {
                self.ready.push_back(mem::take(&mut self.diff));
            }
            self.headers.push(line);
            self.ready
                .push_back(FileDiff::headers_only(mem::take(&mut self.headers)));
            self.diff = FileDiff::default();
        } else {
            self.headers.push(line);
        }

        Ok(())
    }

    /// End-of-stream validation and flush.
    fn finish(&mut self) -> Result<(), ParseError> {
        if !self.diff.old_path.is_empty() {
            if self.diff.new_path.is_empty() {
                return Err(ParseError::MissingNewPath {
                    old_path: self.diff.old_path.trim_end().to_string(),
                });
            }
            if let Some(hunk) = self.diff.hunks.last() {
                if hunk.meta.is_empty() || hunk.is_empty() {
                    return Err(ParseError::EmptyHunk {
                        meta: hunk.meta.trim_end().to_string(),
                    });
                }
            }
            self.ready.push_back(mem::take(&mut self.diff));
        }

        // Dangling trailing headers are tolerated, not an error
        if !self.headers.is_empty() {
            self.ready
                .push_back(FileDiff::headers_only(mem::take(&mut self.headers)));
        }

        Ok(())
    }
}

impl<I> Iterator for DiffParser<I>
where
    I: Iterator<Item = String>,
{
    type Item = Result<FileDiff, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(diff) = self.ready.pop_front() {
                return Some(Ok(diff));
            }
            if self.done {
                return None;
            }
            match self.lines.next() {
                Some(line) => {
                    if let Err(err) = self.feed(line) {
                        self.done = true;
                        return Some(Err(err));
                    }
                }
                None => {
                    self.done = true;
                    if let Err(err) = self.finish() {
                        return Some(Err(err));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Vec<FileDiff> {
        DiffParser::new(input.split_inclusive('\n').map(String::from))
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn single_file_diff() {
        let units = parse("--- a\n+++ b\n@@ -1,2 +1,2 @@\n-foo\n+bar\n common\n");

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].old_path, "--- a\n");
        assert_eq!(units[0].new_path, "+++ b\n");
        assert_eq!(units[0].hunks.len(), 1);
        assert_eq!(units[0].hunks[0].lines().len(), 3);
    }

    #[test]
    fn leading_headers_attach_to_the_unit() {
        let units = parse(
            "diff --git a/f b/f\nindex 000..111 100644\n\
             --- a/f\n+++ b/f\n@@ -1 +1 @@\n-x\n+y\n",
        );

        assert_eq!(units.len(), 1);
        assert_eq!(
            units[0].headers,
            vec!["diff --git a/f b/f\n", "index 000..111 100644\n"]
        );
    }

    #[test]
    fn two_files_split_on_old_path() {
        let units = parse(
            "--- a\n+++ b\n@@ -1 +1 @@\n-x\n+y\n\
             --- c\n+++ d\n@@ -1 +1 @@\n-u\n+v\n",
        );

        assert_eq!(units.len(), 2);
        assert_eq!(units[0].old_path, "--- a\n");
        assert_eq!(units[1].old_path, "--- c\n");
    }

    #[test]
    fn old_path_lookalike_inside_open_hunk_is_content() {
        // The hunk declares two old lines; '--- x' arrives while it is
        // still incomplete, so it is a deleted line, not a new file.
        let units = parse("--- a\n+++ b\n@@ -1,2 +1,1 @@\n--- x\n-old\n+new\n");

        assert_eq!(units.len(), 1);
        let lines = units[0].hunks[0].lines();
        assert_eq!(lines[0], ('-', "-- x\n".to_string()));
        assert_eq!(lines[1], ('-', "old\n".to_string()));
        assert_eq!(lines[2], ('+', "new\n".to_string()));
        assert!(units[0].hunks[0].is_completed());
    }

    #[test]
    fn dangling_trailing_header_yields_pseudo_unit() {
        let units = parse("--- a\n+++ b\n@@ -1 +1 @@\n-x\n+y\nspam\n");

        assert_eq!(units.len(), 2);
        assert_eq!(units[0].hunks.len(), 1);
        assert_eq!(units[1].headers, vec!["spam\n"]);
        assert_eq!(units[1].old_path, "");
        assert_eq!(units[1].new_path, "");
        assert!(units[1].hunks.is_empty());
    }

    #[test]
    fn only_in_dir_is_isolated_between_diffs() {
        let units = parse(
            "--- a\n+++ b\n@@ -1 +1 @@\n-x\n+y\n\
             Only in foo: foo\n\
             --- c\n+++ d\n@@ -1 +1 @@\n-u\n+v\n",
        );

        assert_eq!(units.len(), 3);
        assert_eq!(units[1].headers, vec!["Only in foo: foo\n"]);
        assert!(units[1].hunks.is_empty());
        assert_eq!(units[2].old_path, "--- c\n");
    }

    #[test]
    fn binary_differ_yields_pseudo_unit() {
        let units = parse("Binary files a/x and b/x differ\n");

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].headers, vec!["Binary files a/x and b/x differ\n"]);
        assert!(units[0].hunks.is_empty());
    }

    #[test]
    fn eof_marker_is_dropped() {
        let units = parse("--- a\n+++ b\n@@ -1 +1 @@\n-x\n\\ No newline at end of file\n+y\n");

        assert_eq!(units[0].hunks[0].lines().len(), 2);
    }

    #[test]
    fn malformed_hunk_meta_is_fatal() {
        let results: Vec<_> =
            DiffParser::new("--- a\n+++ b\n@@ -a,a +0 @@\n".split_inclusive('\n').map(String::from))
                .collect();

        assert!(matches!(
            results.last(),
            Some(Err(ParseError::InvalidHunkMeta { meta })) if meta == "@@ -a,a +0 @@"
        ));
    }

    #[test]
    fn at_signs_without_the_meta_prefix_are_headers() {
        // No '@@ -' prefix, so this is never hunk meta and must not be
        // rejected; it lands in the trailing pseudo-unit instead.
        let units = parse("--- a\n+++ b\n@@ -1 +1 @@\n-x\n+y\n@@ bogus @@\n");

        assert_eq!(units.len(), 2);
        assert_eq!(units[1].headers, vec!["@@ bogus @@\n"]);
    }

    #[test]
    fn missing_new_path_is_fatal() {
        let results: Vec<_> =
            DiffParser::new("--- a\n".split_inclusive('\n').map(String::from)).collect();

        assert!(matches!(
            results.last(),
            Some(Err(ParseError::MissingNewPath { old_path })) if old_path == "--- a"
        ));
    }

    #[test]
    fn empty_trailing_hunk_is_fatal() {
        let results: Vec<_> =
            DiffParser::new("--- a\n+++ b\n@@ -1 +1 @@\n".split_inclusive('\n').map(String::from))
                .collect();

        assert!(matches!(
            results.last(),
            Some(Err(ParseError::EmptyHunk { meta })) if meta == "@@ -1 +1 @@"
        ));
    }

    #[test]
    fn header_backlog_keeps_content_out_of_previous_hunk() {
        // 'Property changes on: f' is a header between two hunks; the
        // old-looking line after it must not land in the finished hunk.
        let units = parse(
            "--- a\n+++ b\n@@ -1 +1 @@\n-x\n+y\n\
             Property changes on: f\n\
             ## -0,0 +1 ##\n+prop\n",
        );

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].hunks.len(), 2);
        assert_eq!(units[0].hunks[0].lines().len(), 2);
        assert_eq!(units[0].hunks[1].headers, vec!["Property changes on: f\n"]);
        assert_eq!(units[0].hunks[1].lines(), &[('+', "prop\n".to_string())]);
    }

    #[test]
    fn empty_stream_yields_nothing() {
        assert!(parse("").is_empty());
    }
}
