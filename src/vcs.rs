//! Version-control detection and diff/log subprocess plumbing.
//!
//! When stdin is a terminal the tool probes the working directory for a
//! known repository type and streams that tool's diff or log output
//! through the renderer.

use std::process::{Child, ChildStdout, Command, Stdio};

use error_set::error_set;

error_set! {
    /// Errors from spawning the underlying version-control tool
    VcsError := {
        #[display("Failed to run {command}: {message}")]
        SpawnFailed { command: String, message: String },
        #[display("No output pipe from {command}")]
        MissingStdout { command: String },
        #[display("{name} does not support log with diff output")]
        LogUnsupported { name: String },
    }
}

/// A supported version-control system, in probe order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vcs {
    Git,
    Mercurial,
    Perforce,
    Svn,
}

impl Vcs {
    pub const ALL: [Vcs; 4] = [Vcs::Git, Vcs::Mercurial, Vcs::Perforce, Vcs::Svn];

    pub fn name(self) -> &'static str {
        match self {
            Vcs::Git => "Git",
            Vcs::Mercurial => "Mercurial",
            Vcs::Perforce => "Perforce",
            Vcs::Svn => "Svn",
        }
    }

    fn probe_argv(self) -> &'static [&'static str] {
        match self {
            Vcs::Git => &["git", "rev-parse"],
            Vcs::Mercurial => &["hg", "summary"],
            Vcs::Perforce => &["p4", "dirs", "."],
            Vcs::Svn => &["svn", "info"],
        }
    }

    fn diff_argv(self) -> &'static [&'static str] {
        match self {
            Vcs::Git => &["git", "diff", "--no-ext-diff"],
            Vcs::Mercurial => &["hg", "diff"],
            Vcs::Perforce => &["p4", "diff"],
            Vcs::Svn => &["svn", "diff"],
        }
    }

    fn log_argv(self) -> Option<&'static [&'static str]> {
        match self {
            Vcs::Git => Some(&["git", "log", "--patch"]),
            Vcs::Mercurial => Some(&["hg", "log", "--patch"]),
            Vcs::Perforce => None,
            Vcs::Svn => Some(&["svn", "log", "--diff", "--use-merge-history"]),
        }
    }

    /// Detect the repository type of the working directory, if any.
    pub fn probe() -> Option<Vcs> {
        Vcs::ALL.into_iter().find(|vcs| {
            let argv = vcs.probe_argv();
            Command::new(argv[0])
                .args(&argv[1..])
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .map(|status| status.success())
                .unwrap_or(false)
        })
    }

    /// Spawn the tool's diff command with `extra_args` appended.
    pub fn diff_stream(self, extra_args: &[String]) -> Result<VcsStream, VcsError> {
        spawn_stream(self.diff_argv(), extra_args)
    }

    /// Spawn the tool's log-with-patch command with `extra_args` appended.
    pub fn log_stream(self, extra_args: &[String]) -> Result<VcsStream, VcsError> {
        let argv = self.log_argv().ok_or_else(|| VcsError::LogUnsupported {
            name: self.name().to_string(),
        })?;
        spawn_stream(argv, extra_args)
    }
}

/// A running diff subprocess with its stdout detached for reading.
#[derive(Debug)]
pub struct VcsStream {
    pub child: Child,
    pub stdout: ChildStdout,
}

fn spawn_stream(argv: &[&str], extra_args: &[String]) -> Result<VcsStream, VcsError> {
    let command = argv.join(" ");
    let mut child = Command::new(argv[0])
        .args(&argv[1..])
        .args(extra_args)
        .stdout(Stdio::piped())
        .spawn()
        .map_err(|err| VcsError::SpawnFailed {
            command: command.clone(),
            message: err.to_string(),
        })?;
    let stdout = child
        .stdout
        .take()
        .ok_or(VcsError::MissingStdout { command })?;
    Ok(VcsStream { child, stdout })
}
