//! Term-based unified diff viewer with incremental parsing, word-level
//! highlighting, and a side-by-side layout.
//!
//! The pipeline is parse -> pair -> refine -> render: [`diff::DiffParser`]
//! turns a line stream into per-file units, [`mdiff`] pairs old and new
//! hunk lines, [`words`] marks intra-line changes, and [`render::Marker`]
//! produces colorized output lines.

use error_set::error_set;

pub mod diff;
pub mod input;
pub mod mdiff;
pub mod pager;
pub mod render;
pub mod theme;
pub mod vcs;
pub mod words;

pub use diff::{DiffParser, FileDiff, ParseError};
pub use pager::PagerError;
pub use render::{Marker, MarkupConfig};
pub use theme::Theme;
pub use vcs::{Vcs, VcsError};

error_set! {
    /// Top-level error for the diff viewer
    SideDiffError := {
        ParseError(ParseError),
        VcsError(VcsError),
        PagerError(PagerError),
        #[display("Unknown theme '{name}'")]
        UnknownTheme { name: String },
        #[display("{message}")]
        Io { message: String },
    }
}

/// Parse a line stream and push rendered output into `sink` one line at a
/// time. The sink returning `Ok(false)` stops the stream early, which is
/// how a closed pager ends a run cleanly.
pub fn markup_stream<I, F>(
    lines: I,
    theme: &Theme,
    config: MarkupConfig,
    mut sink: F,
) -> Result<(), SideDiffError>
where
    I: Iterator<Item = String>,
    F: FnMut(&str) -> Result<bool, PagerError>,
{
    let marker = Marker::new(theme, config);
    for unit in DiffParser::new(lines) {
        for line in marker.markup(&unit?) {
            if !sink(&line)? {
                return Ok(());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    fn collect(input: &str, theme: &Theme, config: MarkupConfig) -> String {
        let mut out = String::new();
        markup_stream(
            input.split_inclusive('\n').map(String::from),
            theme,
            config,
            |line| {
                out.push_str(line);
                Ok(true)
            },
        )
        .expect("stream renders");
        out
    }

    #[test]
    fn plain_traditional_round_trips_simple_input() {
        let input = "--- a/f\n+++ b/f\n@@ -1,2 +1,2 @@\n-foo\n+bar\n common\n";
        assert_eq!(
            collect(input, &Theme::plain(), MarkupConfig::default()),
            input
        );
    }

    #[test]
    fn sink_false_stops_after_the_first_line() {
        let input = "--- a\n+++ b\n@@ -1 +1 @@\n-x\n+y\n";
        let mut seen = 0;
        markup_stream(
            input.split_inclusive('\n').map(String::from),
            &Theme::plain(),
            MarkupConfig::default(),
            |_| {
                seen += 1;
                Ok(false)
            },
        )
        .expect("early stop is clean");
        assert_eq!(seen, 1);
    }

    #[test]
    fn parse_errors_surface_through_the_stream() {
        // Recognized as hunk meta, but the address tokens are non-numeric
        let input = "--- a\n+++ b\n@@ -a,a +0 @@\n";
        let err = markup_stream(
            input.split_inclusive('\n').map(String::from),
            &Theme::plain(),
            MarkupConfig::default(),
            |_| Ok(true),
        )
        .unwrap_err();
        assert!(matches!(err, SideDiffError::ParseError(_)));
    }
}
