//! Unified-diff model and streaming parser.

pub mod classify;
pub mod file;
pub mod hunk;
pub mod parser;

pub use classify::UnifiedDiff;
pub use file::FileDiff;
pub use hunk::{Addr, Hunk};
pub use parser::DiffParser;

use error_set::error_set;

error_set! {
    /// Format errors: the input stream is not a valid unified diff.
    ///
    /// Callers should treat any of these as "not a patch" and fall back to
    /// showing the raw stream instead of a structured rendering.
    ParseError := {
        /// Hunk meta line with a missing or non-numeric address token
        #[display("invalid hunk meta: {meta}")]
        InvalidHunkMeta { meta: String },
        /// Stream ended after an old path but before the matching new path
        #[display("diff for '{old_path}' ended without a +++ line")]
        MissingNewPath { old_path: String },
        /// Stream ended right after a hunk meta, with no hunk content
        #[display("stream ended inside empty hunk: {meta}")]
        EmptyHunk { meta: String },
    }
}
