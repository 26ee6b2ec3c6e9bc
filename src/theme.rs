//! Color themes: immutable maps from semantic output kind to ANSI escapes.
//!
//! A theme is constructed once at startup and passed into the renderer; no
//! global mutable state. The `plain` theme maps every kind to nothing, which
//! doubles as the marker-stripping identity in tests.

pub const RESET: &str = "\x1b[0m";

const UNDERLINE: &str = "\x1b[4m";
const REVERSE: &str = "\x1b[7m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const LIGHTRED: &str = "\x1b[1;31m";
const LIGHTBLUE: &str = "\x1b[1;34m";
const LIGHTMAGENTA: &str = "\x1b[1;35m";
const LIGHTCYAN: &str = "\x1b[1;36m";

/// Semantic kinds a theme colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Header,
    OldPath,
    NewPath,
    HunkHeader,
    HunkMeta,
    CommonLine,
    OldLine,
    NewLine,
    DeletedText,
    InsertedText,
    ReplacedOldText,
    ReplacedNewText,
    OldLineNumber,
    NewLineNumber,
    FileSeparator,
    WrapMarker,
}

impl Kind {
    pub const ALL: [Kind; 16] = [
        Kind::Header,
        Kind::OldPath,
        Kind::NewPath,
        Kind::HunkHeader,
        Kind::HunkMeta,
        Kind::CommonLine,
        Kind::OldLine,
        Kind::NewLine,
        Kind::DeletedText,
        Kind::InsertedText,
        Kind::ReplacedOldText,
        Kind::ReplacedNewText,
        Kind::OldLineNumber,
        Kind::NewLineNumber,
        Kind::FileSeparator,
        Kind::WrapMarker,
    ];
}

/// An immutable kind-to-escape-sequences mapping.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    name: &'static str,
    codes: fn(Kind) -> &'static [&'static str],
    reset: &'static str,
}

impl Theme {
    /// Look a theme up by its CLI name.
    pub fn by_name(name: &str) -> Option<Theme> {
        match name {
            "default" => Some(Self::default_theme()),
            "plain" => Some(Self::plain()),
            _ => None,
        }
    }

    /// The classic ANSI palette.
    pub fn default_theme() -> Theme {
        Theme {
            name: "default",
            codes: default_codes,
            reset: RESET,
        }
    }

    /// No escapes at all; output is the bare text.
    pub fn plain() -> Theme {
        Theme {
            name: "plain",
            codes: |_| &[],
            reset: "",
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn codes(&self, kind: Kind) -> &'static [&'static str] {
        (self.codes)(kind)
    }

    /// The sequence that closes any open color, or `""` for `plain`.
    pub fn reset(&self) -> &'static str {
        self.reset
    }

    /// Wrap `text` in the codes for `kind`; identity when the kind has none.
    pub fn colorize(&self, kind: Kind, text: &str) -> String {
        let codes = self.codes(kind);
        if codes.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", codes.concat(), text, self.reset)
        }
    }
}

fn default_codes(kind: Kind) -> &'static [&'static str] {
    match kind {
        Kind::Header => &[CYAN],
        Kind::OldPath | Kind::NewPath => &[YELLOW],
        Kind::HunkHeader => &[LIGHTCYAN],
        Kind::HunkMeta => &[LIGHTBLUE],
        Kind::CommonLine => &[],
        Kind::OldLine => &[LIGHTRED],
        Kind::NewLine => &[GREEN],
        // Span kinds carry the side's base color last; the renderer re-opens
        // that base after each span ends.
        Kind::DeletedText => &[REVERSE, RED],
        Kind::InsertedText => &[REVERSE, GREEN],
        Kind::ReplacedOldText => &[UNDERLINE, RED],
        Kind::ReplacedNewText => &[UNDERLINE, GREEN],
        Kind::OldLineNumber | Kind::NewLineNumber => &[YELLOW],
        Kind::FileSeparator => &[CYAN],
        Kind::WrapMarker => &[LIGHTMAGENTA],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        assert_eq!(Theme::by_name("default").map(|t| t.name()), Some("default"));
        assert_eq!(Theme::by_name("plain").map(|t| t.name()), Some("plain"));
        assert!(Theme::by_name("solarized").is_none());
    }

    #[test]
    fn colorize_wraps_text_in_codes() {
        let theme = Theme::default_theme();
        assert_eq!(
            theme.colorize(Kind::OldPath, "--- a\n"),
            "\x1b[33m--- a\n\x1b[0m"
        );
    }

    #[test]
    fn plain_theme_is_the_identity() {
        let theme = Theme::plain();
        for kind in Kind::ALL {
            assert_eq!(theme.colorize(kind, "text"), "text");
        }
        assert_eq!(theme.reset(), "");
    }

    #[test]
    fn every_kind_resolves_in_the_default_theme() {
        let theme = Theme::default_theme();
        for kind in Kind::ALL {
            // CommonLine is deliberately bare; everything else has codes
            if kind != Kind::CommonLine {
                assert!(!theme.codes(kind).is_empty(), "{kind:?} has no codes");
            }
        }
    }
}
