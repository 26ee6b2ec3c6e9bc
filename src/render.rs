//! Colorized rendering of file-diff units.
//!
//! Two layouts over the same triple stream: traditional interleaved lines,
//! and side-by-side columns with line numbers. Column fitting is the fiddly
//! part: tab normalization must treat the zero-width span markers as zero
//! width, splitting must not cut ANSI escape sequences in half, and wide
//! characters occupy two columns.

use unicode_width::UnicodeWidthChar;

use crate::diff::{FileDiff, Hunk};
use crate::mdiff::{self, MARK_CHANGE, MARK_DELETE, MARK_END, MARK_INSERT, strip_markers};
use crate::theme::{Kind, RESET, Theme};
use crate::words;

/// Layout and column-fitting options for the renderer.
#[derive(Debug, Clone)]
pub struct MarkupConfig {
    pub side_by_side: bool,
    /// Column width for side-by-side mode; 0 = detect from the terminal,
    /// falling back to 80.
    pub width: usize,
    pub tab_width: usize,
    /// Wrap overflowing columns onto continuation rows instead of
    /// truncating them with a marker glyph.
    pub wrap: bool,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            side_by_side: false,
            width: 80,
            tab_width: 8,
            wrap: false,
        }
    }
}

/// Streaming transform from file-diff units to terminal-ready lines.
///
/// Stateless across triples except for the current hunk's addresses used
/// for numbering.
pub struct Marker<'a> {
    theme: &'a Theme,
    config: MarkupConfig,
}

impl<'a> Marker<'a> {
    pub fn new(theme: &'a Theme, config: MarkupConfig) -> Self {
        Self { theme, config }
    }

    /// Render one unit as an ordered sequence of output lines.
    pub fn markup(&self, diff: &FileDiff) -> Vec<String> {
        if self.config.side_by_side {
            self.markup_side_by_side(diff)
        } else {
            self.markup_traditional(diff)
        }
    }

    fn markup_traditional(&self, diff: &FileDiff) -> Vec<String> {
        let mut out = Vec::new();
        self.push_preamble(diff, &mut out);

        for hunk in &diff.hunks {
            self.push_hunk_heading(hunk, &mut out);

            for triple in mdiff::mdiff(&hunk.old_text(), &hunk.new_text()) {
                if !triple.changed {
                    out.push(
                        self.theme
                            .colorize(Kind::CommonLine, &format!(" {}", triple.old.text)),
                    );
                } else if triple.old.num.is_none() {
                    // The '+' after the span marker doubles as the prefix
                    out.push(
                        self.theme
                            .colorize(Kind::NewLine, trim_marker_ends(&triple.new.text)),
                    );
                } else if triple.new.num.is_none() {
                    out.push(
                        self.theme
                            .colorize(Kind::OldLine, trim_marker_ends(&triple.old.text)),
                    );
                } else {
                    let (old_marked, new_marked) = words::refine(
                        &strip_markers(&triple.old.text),
                        &strip_markers(&triple.new.text),
                    );
                    out.push(self.theme.colorize(Kind::OldLine, "-") + &self.mix(&old_marked, true));
                    out.push(self.theme.colorize(Kind::NewLine, "+") + &self.mix(&new_marked, false));
                }
            }
        }

        out
    }

    fn markup_side_by_side(&self, diff: &FileDiff) -> Vec<String> {
        let num_width = self.number_width(diff);
        let width = self.column_width(num_width);

        let mut out = Vec::new();
        self.push_preamble(diff, &mut out);

        for hunk in &diff.hunks {
            self.push_hunk_heading(hunk, &mut out);

            for triple in mdiff::mdiff(&hunk.old_text(), &hunk.new_text()) {
                let left_num = triple
                    .old
                    .num
                    .map(|n| (hunk.old_addr.0 + n - 1).to_string())
                    .unwrap_or_default();
                let right_num = triple
                    .new
                    .num
                    .map(|n| (hunk.new_addr.0 + n - 1).to_string())
                    .unwrap_or_default();

                let left_plain = self.normalize(&triple.old.text);
                let right_plain = self.normalize(&triple.new.text);

                let (left, right) = if !triple.changed {
                    (
                        self.theme.colorize(Kind::CommonLine, &left_plain),
                        self.theme.colorize(Kind::CommonLine, &right_plain),
                    )
                } else if triple.old.num.is_none() {
                    (
                        String::new(),
                        self.theme.colorize(Kind::NewLine, &strip_markers(&right_plain)),
                    )
                } else if triple.new.num.is_none() {
                    (
                        self.theme.colorize(Kind::OldLine, &strip_markers(&left_plain)),
                        String::new(),
                    )
                } else {
                    let (old_marked, new_marked) = words::refine(
                        &strip_markers(&left_plain),
                        &strip_markers(&right_plain),
                    );
                    (self.mix(&old_marked, true), self.mix(&new_marked, false))
                };

                if self.config.wrap {
                    self.push_wrapped_rows(&mut out, left_num, left, right_num, right, num_width, width);
                } else {
                    let wrap_char = self.theme.colorize(Kind::WrapMarker, ">");
                    let pad = !right.is_empty();
                    let left = strtrim(&left, width, &wrap_char, pad);
                    let right = strtrim(&right, width, &wrap_char, false);
                    out.push(self.format_row(&left_num, &left, &right_num, &right, num_width));
                }
            }
        }

        out
    }

    fn push_preamble(&self, diff: &FileDiff, out: &mut Vec<String>) {
        for header in &diff.headers {
            out.push(self.theme.colorize(Kind::Header, header));
        }
        if !diff.old_path.is_empty() {
            out.push(self.theme.colorize(Kind::OldPath, &diff.old_path));
        }
        if !diff.new_path.is_empty() {
            out.push(self.theme.colorize(Kind::NewPath, &diff.new_path));
        }
    }

    fn push_hunk_heading(&self, hunk: &Hunk, out: &mut Vec<String>) {
        for header in &hunk.headers {
            out.push(self.theme.colorize(Kind::HunkHeader, header));
        }
        out.push(self.theme.colorize(Kind::HunkMeta, &hunk.meta));
    }

    /// Shave `width` visible columns off both sides per row until both are
    /// spent; line numbers appear on the first row only.
    #[allow(clippy::too_many_arguments)]
    fn push_wrapped_rows(
        &self,
        out: &mut Vec<String>,
        left_num: String,
        left: String,
        right_num: String,
        right: String,
        num_width: usize,
        width: usize,
    ) {
        let (mut left, mut right) = (left, right);
        let (mut left_num, mut right_num) = (left_num, right_num);
        loop {
            let (mut left_cur, left_rest, left_len) = strsplit(&left, width);
            let (right_cur, right_rest, _) = strsplit(&right, width);
            if left_len < width {
                left_cur.push_str(&" ".repeat(width - left_len));
            }
            out.push(self.format_row(&left_num, &left_cur, &right_num, &right_cur, num_width));

            // A character wider than the column would otherwise never fit
            let stalled = left_rest == left && right_rest == right;
            left = left_rest;
            right = right_rest;
            left_num.clear();
            right_num.clear();
            if stalled || (left.is_empty() && right.is_empty()) {
                break;
            }
        }
    }

    /// `nnn TEXT nnn TEXT\n` with the number columns right-aligned.
    fn format_row(
        &self,
        left_num: &str,
        left: &str,
        right_num: &str,
        right: &str,
        num_width: usize,
    ) -> String {
        format!(
            "{} {} {}{} {}\n",
            self.theme
                .colorize(Kind::OldLineNumber, &format!("{left_num:>num_width$}")),
            left,
            self.theme.reset(),
            self.theme
                .colorize(Kind::NewLineNumber, &format!("{right_num:>num_width$}")),
            right,
        )
    }

    /// Width of the line-number columns, sized by the last hunk's peak
    /// addresses. Note the last hunk may be absent for pseudo-units.
    fn number_width(&self, diff: &FileDiff) -> usize {
        let (max_old, max_new) = diff
            .hunks
            .last()
            .map(|h| {
                (
                    (h.old_addr.0 + h.old_addr.1).saturating_sub(1),
                    (h.new_addr.0 + h.new_addr.1).saturating_sub(1),
                )
            })
            .unwrap_or((0, 0));
        max_old.to_string().len().max(max_new.to_string().len())
    }

    /// Fixed width from config, or terminal detection when it is 0. Each
    /// row is `nnn TEXT nnn TEXT`, so a column gets half of what remains
    /// after the number columns and three separating spaces.
    fn column_width(&self, num_width: usize) -> usize {
        match self.config.width {
            0 => crossterm::terminal::size()
                .ok()
                .map(|(cols, _)| (cols as usize).saturating_sub(num_width * 2 + 3) / 2)
                .filter(|w| *w > 0)
                .unwrap_or(80),
            w => w,
        }
    }

    /// Expand tabs to the next multiple of the tab width (markers count as
    /// zero width) and drop line terminators.
    fn normalize(&self, text: &str) -> String {
        let tab = self.config.tab_width.max(1);
        let mut out = String::with_capacity(text.len());
        let mut col = 0usize;
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            match c {
                '\u{0}' => {
                    out.push(c);
                    if let Some(kind) = chars.next() {
                        out.push(kind);
                    }
                }
                '\u{1}' => out.push(c),
                '\t' => {
                    let spaces = tab - col % tab;
                    out.push_str(&" ".repeat(spaces));
                    col += spaces;
                }
                '\n' | '\r' => {}
                _ => {
                    out.push(c);
                    col += 1;
                }
            }
        }
        out
    }

    /// Turn span markers into colors over the side's base color and wrap
    /// the whole line in it.
    fn mix(&self, line: &str, old_side: bool) -> String {
        let (span_kind, change_kind) = if old_side {
            (Kind::DeletedText, Kind::ReplacedOldText)
        } else {
            (Kind::InsertedText, Kind::ReplacedNewText)
        };
        // The side's base color is the last code of its replaced-text kind
        let base = self.theme.codes(change_kind).last().copied().unwrap_or("");
        let span_code = self.theme.codes(span_kind).concat();
        let change_code = self.theme.codes(change_kind).concat();
        let end_code = format!("{}{base}", self.theme.reset());

        let mixed = line
            .replace(MARK_DELETE, &span_code)
            .replace(MARK_INSERT, &span_code)
            .replace(MARK_CHANGE, &change_code)
            .replace(MARK_END, &end_code);

        if base.is_empty() {
            mixed
        } else {
            format!("{base}{mixed}{}", self.theme.reset())
        }
    }
}

/// Split `text` into a prefix of at most `width` visible columns and the
/// remainder. ANSI escape sequences are zero width; wide characters count
/// double. If colors are active at the split point the prefix is closed
/// with a reset and the remainder re-opens them.
///
/// Returns `(first, second, visible width of first)`.
pub fn strsplit(text: &str, width: usize) -> (String, String, usize) {
    let mut first = String::new();
    let mut active = String::new();
    let mut cols = 0usize;
    let mut rest = text;

    while !rest.is_empty() {
        if rest.starts_with('\u{1b}') {
            if let Some(end) = rest.find('m') {
                let code = &rest[..=end];
                if code == RESET {
                    active.clear();
                } else {
                    active.push_str(code);
                }
                first.push_str(code);
                rest = &rest[end + 1..];
                continue;
            }
        }
        let Some(c) = rest.chars().next() else { break };
        let w = UnicodeWidthChar::width(c).unwrap_or(1);
        if cols + w > width {
            break;
        }
        cols += w;
        first.push(c);
        rest = &rest[c.len_utf8()..];
    }

    if active.is_empty() {
        (first, rest.to_string(), cols)
    } else {
        first.push_str(RESET);
        (first, format!("{active}{rest}"), cols)
    }
}

/// Trim to at most `width` visible columns, replacing the overflow with
/// `wrap_char` in the last column; pad short strings with spaces to exactly
/// `width` when `pad` is set.
pub fn strtrim(text: &str, width: usize, wrap_char: &str, pad: bool) -> String {
    let (text, _, len) = strsplit(text, width + 1);
    if len > width {
        let (mut head, _, _) = strsplit(&text, width.saturating_sub(1));
        head.push_str(wrap_char);
        return head;
    }
    if pad {
        format!("{text}{}", " ".repeat(width - len))
    } else {
        text
    }
}

fn trim_marker_ends(text: &str) -> &str {
    text.trim_matches(|c| c == '\u{0}' || c == '\u{1}')
}
