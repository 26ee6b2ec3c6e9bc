//! Pager subprocess for interactive output.
//!
//! Defaults to `less` configured to quit when the output fits one screen
//! and to pass colors through. A closed pager (the user pressed `q`) is a
//! normal way to stop, not an error.

use std::io::{ErrorKind, Write};
use std::process::{Child, ChildStdin, Command, Stdio};

use error_set::error_set;

error_set! {
    /// Errors from driving the pager process
    PagerError := {
        #[display("Failed to run pager '{command}': {message}")]
        SpawnFailed { command: String, message: String },
        #[display("No input pipe to pager '{command}'")]
        MissingStdin { command: String },
        #[display("Failed to write to pager: {message}")]
        WriteFailed { message: String },
    }
}

pub struct Pager {
    child: Child,
    stdin: Option<ChildStdin>,
}

impl Pager {
    /// Spawn the pager, defaulting to `less`. When neither `$LESS` nor
    /// explicit options are given, `less` gets flags to pass ANSI colors,
    /// quit if the output fits one screen, and chop long lines.
    pub fn spawn(pager: Option<&str>, pager_options: Option<&str>) -> Result<Pager, PagerError> {
        let program = pager.unwrap_or("less");
        let mut command = Command::new(program);
        if let Some(options) = pager_options {
            command.args(options.split_whitespace());
        } else if pager.is_none() && std::env::var_os("LESS").is_none() {
            command.args(["-FRSX", "--shift", "1"]);
        }

        let mut child = command
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|err| PagerError::SpawnFailed {
                command: program.to_string(),
                message: err.to_string(),
            })?;
        let stdin = child.stdin.take();
        if stdin.is_none() {
            return Err(PagerError::MissingStdin {
                command: program.to_string(),
            });
        }
        Ok(Pager { child, stdin })
    }

    /// Write one chunk of output. Returns `Ok(false)` once the pager has
    /// exited; the caller should stop producing output.
    pub fn write(&mut self, text: &str) -> Result<bool, PagerError> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Ok(false);
        };
        match stdin.write_all(text.as_bytes()) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::BrokenPipe => {
                self.stdin = None;
                Ok(false)
            }
            Err(err) => Err(PagerError::WriteFailed {
                message: err.to_string(),
            }),
        }
    }

    /// Close the pipe and wait for the user to finish reading.
    pub fn wait(mut self) -> Result<(), PagerError> {
        drop(self.stdin.take());
        self.child.wait().map_err(|err| PagerError::WriteFailed {
            message: err.to_string(),
        })?;
        Ok(())
    }
}
