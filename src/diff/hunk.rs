//! One `@@ -a,b +c,d @@` change block.

/// A `(start_line, line_count)` address pair from a hunk meta line.
pub type Addr = (usize, usize);

/// A single hunk accumulated by the diff parser.
///
/// Created when a hunk meta line is recognized, mutated by [`append`] as
/// subsequent content lines are classified, and read-only once the owning
/// [`FileDiff`](super::FileDiff) has been yielded.
///
/// [`append`]: Hunk::append
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// Unclassified lines that preceded this hunk (e.g. vcs property
    /// headers), in encounter order.
    pub headers: Vec<String>,
    /// The raw meta line, kept verbatim for re-display.
    pub meta: String,
    pub old_addr: Addr,
    pub new_addr: Addr,
    lines: Vec<(char, String)>,
}

impl Hunk {
    pub fn new(headers: Vec<String>, meta: String, old_addr: Addr, new_addr: Addr) -> Self {
        Self {
            headers,
            meta,
            old_addr,
            new_addr,
            lines: Vec::new(),
        }
    }

    /// Append one classified content line: tag is `-` (old), `+` (new) or
    /// ` ` (common); text excludes the tag and keeps its trailing newline.
    pub fn append(&mut self, line: (char, String)) {
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[(char, String)] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines present in the old revision: everything not tagged `+`.
    pub fn old_text(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|(tag, _)| *tag != '+')
            .map(|(_, text)| text.as_str())
            .collect()
    }

    /// Lines present in the new revision: everything not tagged `-`.
    pub fn new_text(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|(tag, _)| *tag != '-')
            .map(|(_, text)| text.as_str())
            .collect()
    }

    /// A hunk is complete exactly when both declared counts are satisfied.
    ///
    /// This is what lets the parser tell a new file's `--- ` marker apart
    /// from a deleted content line that merely looks like one.
    pub fn is_completed(&self) -> bool {
        let old_count = self.lines.iter().filter(|(tag, _)| *tag != '+').count();
        let new_count = self.lines.iter().filter(|(tag, _)| *tag != '-').count();
        self.old_addr.1 == old_count && self.new_addr.1 == new_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hunk(old_count: usize, new_count: usize) -> Hunk {
        Hunk::new(
            vec![],
            format!("@@ -1,{old_count} +1,{new_count} @@\n"),
            (1, old_count),
            (1, new_count),
        )
    }

    #[test]
    fn completion_tracks_declared_counts() {
        let mut h = hunk(2, 2);
        assert!(!h.is_completed());

        h.append(('-', "foo\n".to_string()));
        h.append(('+', "bar\n".to_string()));
        assert!(!h.is_completed());

        h.append((' ', "common\n".to_string()));
        assert!(h.is_completed());
    }

    #[test]
    fn common_lines_count_toward_both_sides() {
        let mut h = hunk(1, 1);
        h.append((' ', "same\n".to_string()));
        assert!(h.is_completed());
    }

    #[test]
    fn overshoot_is_not_complete() {
        let mut h = hunk(1, 0);
        h.append(('-', "a\n".to_string()));
        assert!(h.is_completed());
        h.append(('-', "b\n".to_string()));
        assert!(!h.is_completed());
    }

    #[test]
    fn text_projections_preserve_order() {
        let mut h = hunk(2, 2);
        h.append(('-', "old\n".to_string()));
        h.append(('+', "new\n".to_string()));
        h.append((' ', "ctx\n".to_string()));

        assert_eq!(h.old_text(), vec!["old\n", "ctx\n"]);
        assert_eq!(h.new_text(), vec!["new\n", "ctx\n"]);
    }

    #[test]
    fn zero_count_hunk_completes_immediately() {
        // @@ -0,0 +0,0 @@ never occurs in practice but must not wedge
        let h = hunk(0, 0);
        assert!(h.is_completed());
    }
}
